//! Proof-of-work uploads.
//!
//! Files are written to a local directory under fresh UUID names and served
//! back read-only under `/uploads`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Longest file extension carried over from the client's file name.
const MAX_EXTENSION_LEN: usize = 10;

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The part is neither an image nor a video.
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// The part exceeds the per-file size limit.
    #[error("File exceeds the {limit} byte limit")]
    TooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },

    /// The request carried no file parts.
    #[error("No files uploaded")]
    NoFiles,

    /// Writing to disk failed.
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether a part's content type is accepted as proof.
#[must_use]
pub fn is_accepted_content_type(content_type: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    content_type.starts_with("image/") || content_type.starts_with("video/")
}

/// Fresh storage name for an upload, keeping a sane extension from the
/// client's file name.
#[must_use]
pub fn stored_name(original: Option<&str>) -> String {
    let extension = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(str::to_ascii_lowercase);

    let id = Uuid::new_v4();
    match extension {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

/// A checked upload part held in memory until its batch is stored.
#[derive(Clone)]
pub struct PendingFile {
    original: Option<String>,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFile")
            .field("original", &self.original)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl PendingFile {
    /// Wrap a part's client file name and contents.
    #[must_use]
    pub const fn new(original: Option<String>, bytes: Vec<u8>) -> Self {
        Self { original, bytes }
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the part carried no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Local directory holding uploaded proof files.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    /// Create an upload store rooted at `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf, max_bytes: usize) -> Self {
        Self { dir, max_bytes }
    }

    /// Directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Per-file size limit in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Create the upload directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Check a part's declared content type.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnsupportedType` for anything but image or video.
    pub fn check_content_type(content_type: Option<&str>) -> Result<(), UploadError> {
        match content_type {
            Some(ct) if is_accepted_content_type(ct) => Ok(()),
            Some(ct) => Err(UploadError::UnsupportedType(ct.to_owned())),
            None => Err(UploadError::UnsupportedType("unknown".to_owned())),
        }
    }

    /// Check a running byte count against the limit.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::TooLarge` once `len` exceeds the limit.
    pub const fn check_size(&self, len: usize) -> Result<(), UploadError> {
        if len > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Write one validated file and return its stored name.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::TooLarge` or `UploadError::Io`.
    pub async fn save(&self, original: Option<&str>, bytes: &[u8]) -> Result<String, UploadError> {
        self.check_size(bytes.len())?;
        self.ensure_dir().await?;
        let name = stored_name(original);
        tokio::fs::write(self.dir.join(&name), bytes).await?;
        tracing::debug!(file = %name, size = bytes.len(), "stored upload");
        Ok(name)
    }

    /// Write a checked batch and return the stored names in order.
    ///
    /// Either every file is written or none is: a failed write removes the
    /// files already stored for the batch.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NoFiles` for an empty batch, or the first
    /// `UploadError::TooLarge` / `UploadError::Io`.
    pub async fn save_batch(&self, files: &[PendingFile]) -> Result<Vec<String>, UploadError> {
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }
        for file in files {
            self.check_size(file.len())?;
        }

        let mut names = Vec::with_capacity(files.len());
        for file in files {
            match self.save(file.original.as_deref(), &file.bytes).await {
                Ok(name) => names.push(name),
                Err(err) => {
                    self.remove_all(&names).await;
                    return Err(err);
                }
            }
        }
        Ok(names)
    }

    /// Best-effort removal of stored files.
    async fn remove_all(&self, names: &[String]) {
        for name in names {
            if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
                tracing::warn!(file = %name, error = %e, "failed to remove partial upload");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert!(is_accepted_content_type("image/jpeg"));
        assert!(is_accepted_content_type("Video/MP4"));
        assert!(!is_accepted_content_type("application/pdf"));
        assert!(!is_accepted_content_type("text/plain"));
        assert!(UploadStore::check_content_type(None).is_err());
    }

    #[test]
    fn test_stored_name_keeps_extension() {
        let name = stored_name(Some("Site Photo.JPG"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), 36 + 4);
        assert!(!name.contains('/'));

        assert_eq!(stored_name(Some("clip")).len(), 36);
        assert_eq!(stored_name(Some("../../etc/passwd")).len(), 36);
        assert_eq!(stored_name(Some("x.ph/p")).len(), 36);
        assert_eq!(stored_name(None).len(), 36);
    }

    #[test]
    fn test_size_limit() {
        let store = UploadStore::new(PathBuf::from("unused"), 4);
        assert!(store.check_size(4).is_ok());
        assert!(matches!(
            store.check_size(5),
            Err(UploadError::TooLarge { limit: 4 })
        ));
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let dir = std::env::temp_dir().join(format!("civic-desk-upload-{}", Uuid::new_v4()));
        let store = UploadStore::new(dir.clone(), 1024);

        let name = store.save(Some("proof.png"), b"\x89PNG").await.unwrap();
        let written = tokio::fs::read(dir.join(&name)).await.unwrap();
        assert_eq!(written, b"\x89PNG");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_batch_writes_nothing_when_a_file_is_too_large() {
        let dir = std::env::temp_dir().join(format!("civic-desk-upload-{}", Uuid::new_v4()));
        let store = UploadStore::new(dir.clone(), 8);

        let batch = [
            PendingFile::new(Some("ok.png".to_owned()), b"\x89PNG".to_vec()),
            PendingFile::new(Some("big.mp4".to_owned()), vec![0u8; 9]),
        ];
        let err = store.save_batch(&batch).await.unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { limit: 8 }));
        assert!(!dir.exists());

        let names = store.save_batch(&batch[..1]).await.unwrap();
        assert_eq!(names.len(), 1);
        assert!(dir.join(&names[0]).exists());

        assert!(matches!(
            store.save_batch(&[]).await,
            Err(UploadError::NoFiles)
        ));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
