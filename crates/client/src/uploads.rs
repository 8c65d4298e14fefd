//! Proof-of-work uploads.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use civic_desk_core::UploadResult;

use crate::{ApiClient, ClientError};

/// Most files the server accepts in one upload.
pub const MAX_FILES_PER_UPLOAD: usize = 10;

/// Multipart field the server reads files from.
const FILES_FIELD: &str = "files";

/// One image or video to attach as proof.
#[derive(Clone, PartialEq, Eq)]
pub struct ProofFile {
    pub file_name: String,
    /// MIME type such as `image/jpeg`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ProofFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ProofFile {
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Proof upload endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Uploads<'a> {
    client: &'a ApiClient,
}

impl<'a> Uploads<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Upload proof files and return their stored names, ready for
    /// [`StatusForm::proof_images`](crate::StatusForm::proof_images).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an empty or oversized batch
    /// without contacting the server, and `ClientError::Api` when the server
    /// rejects a file's type or size.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn proof(&self, files: Vec<ProofFile>) -> Result<UploadResult, ClientError> {
        let form = proof_form(files)?;
        let request = self
            .client
            .request(Method::POST, &["api", "upload", "proof"], &[])?
            .multipart(form);
        self.client.send(request).await?.into_data()
    }
}

fn proof_form(files: Vec<ProofFile>) -> Result<Form, ClientError> {
    if files.is_empty() {
        return Err(ClientError::Validation(
            "Please choose at least one file".to_owned(),
        ));
    }
    if files.len() > MAX_FILES_PER_UPLOAD {
        return Err(ClientError::Validation(format!(
            "At most {MAX_FILES_PER_UPLOAD} files per upload"
        )));
    }

    files.into_iter().try_fold(Form::new(), |form, file| {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        Ok(form.part(FILES_FIELD, part))
    })
}
