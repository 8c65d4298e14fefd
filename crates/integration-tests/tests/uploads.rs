//! Integration tests for proof-of-work uploads.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use civic_desk_client::{ClientError, ProofFile, StatusForm};
use civic_desk_core::{ComplaintId, ComplaintStatus};
use civic_desk_integration_tests::TestServer;
use reqwest::StatusCode;

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Number of files in the server's upload directory.
async fn stored_files(server: &TestServer) -> usize {
    let Ok(mut entries) = tokio::fs::read_dir(server.upload_dir()).await else {
        return 0;
    };
    let mut count = 0;
    while entries.next_entry().await.unwrap().is_some() {
        count += 1;
    }
    count
}

#[tokio::test]
async fn test_upload_then_attach_to_status_update() {
    let server = TestServer::start().await;
    let mike = server.worker("mike.wilson").await;

    let uploaded = mike
        .uploads()
        .proof(vec![
            ProofFile::new("before.png", "image/png", PNG_HEADER),
            ProofFile::new("after.mp4", "video/mp4", b"\0\0\0\x18ftypmp42".to_vec()),
        ])
        .await
        .unwrap();
    assert_eq!(uploaded.files.len(), 2);
    assert!(uploaded.files[0].ends_with(".png"));
    assert!(uploaded.files[1].ends_with(".mp4"));

    let stored = tokio::fs::read(server.upload_dir().join(&uploaded.files[0]))
        .await
        .unwrap();
    assert_eq!(stored, PNG_HEADER);

    let served = reqwest::get(mike.upload_url(&uploaded.files[0]).unwrap())
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.unwrap().as_ref(), PNG_HEADER);

    let form = StatusForm {
        proof_images: uploaded.files.clone(),
        ..StatusForm::with_status(ComplaintStatus::Completed)
    };
    let complaint = mike
        .complaints()
        .update_status(&ComplaintId::new("CMP004"), form)
        .await
        .unwrap();
    assert!(complaint.proof_images.ends_with(&uploaded.files));
}

#[tokio::test]
async fn test_non_media_file_is_rejected() {
    let server = TestServer::start().await;
    let mike = server.worker("mike.wilson").await;

    let err = mike
        .uploads()
        .proof(vec![ProofFile::new("notes.pdf", "application/pdf", b"%PDF-1.7".to_vec())])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert!(err.to_string().contains("application/pdf"));
}

#[tokio::test]
async fn test_rejected_batch_stores_nothing() {
    let server = TestServer::start_with(|config| config.max_upload_bytes = 1024).await;
    let mike = server.worker("mike.wilson").await;

    let err = mike
        .uploads()
        .proof(vec![
            ProofFile::new("before.png", "image/png", PNG_HEADER),
            ProofFile::new("notes.pdf", "application/pdf", b"%PDF-1.7".to_vec()),
        ])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

    let err = mike
        .uploads()
        .proof(vec![
            ProofFile::new("before.png", "image/png", PNG_HEADER),
            ProofFile::new("after.jpg", "image/jpeg", vec![0u8; 2048]),
        ])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::PAYLOAD_TOO_LARGE));

    assert_eq!(stored_files(&server).await, 0);
}

#[tokio::test]
async fn test_oversized_file_is_rejected() {
    let server = TestServer::start_with(|config| config.max_upload_bytes = 1024).await;
    let mike = server.worker("mike.wilson").await;

    let err = mike
        .uploads()
        .proof(vec![ProofFile::new("big.jpg", "image/jpeg", vec![0u8; 2048])])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::PAYLOAD_TOO_LARGE));

    assert_eq!(stored_files(&server).await, 0);
}

#[tokio::test]
async fn test_empty_batch_is_not_sent() {
    let server = TestServer::start().await;
    let mike = server.worker("mike.wilson").await;

    let err = mike.uploads().proof(Vec::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_upload_requires_session() {
    let server = TestServer::start().await;
    let err = server
        .client()
        .uploads()
        .proof(vec![ProofFile::new("a.png", "image/png", PNG_HEADER)])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
}
