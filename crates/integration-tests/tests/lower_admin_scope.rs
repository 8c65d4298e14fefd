//! Integration tests for what a Lower Admin can reach.

#![allow(clippy::unwrap_used)]

use civic_desk_client::StatusForm;
use civic_desk_core::{AdminUserId, ComplaintId, ComplaintStatus};
use civic_desk_integration_tests::TestServer;
use reqwest::StatusCode;

#[tokio::test]
async fn test_worker_lists_only_own_complaints() {
    let server = TestServer::start().await;
    let mike = server.worker("mike.wilson").await;

    let page = mike.complaints().list(&Default::default()).await.unwrap();
    assert_eq!(page.pagination.total, 2);
    assert!(page
        .complaints
        .iter()
        .all(|c| c.assigned_to == Some(AdminUserId::new("worker1"))));

    // A status filter narrows within the worker's own complaints.
    let done = mike
        .complaints()
        .list(&civic_desk_core::ComplaintListQuery {
            status: Some("Completed".to_owned()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(done.pagination.total, 0);
}

#[tokio::test]
async fn test_foreign_complaint_reads_as_missing() {
    let server = TestServer::start().await;
    let mike = server.worker("mike.wilson").await;

    let err = mike
        .complaints()
        .get(&ComplaintId::new("CMP002"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(
        err.to_string(),
        "Complaint not found or not assigned to you"
    );

    // A missing complaint reads the same as a foreign one.
    let missing = mike
        .complaints()
        .get(&ComplaintId::new("CMP999"))
        .await
        .unwrap_err();
    assert_eq!(missing.to_string(), err.to_string());

    let err = mike
        .complaints()
        .update_status(
            &ComplaintId::new("CMP003"),
            StatusForm::with_status(ComplaintStatus::InProgress),
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(
        err.to_string(),
        "Complaint not found or not assigned to you"
    );
}

#[tokio::test]
async fn test_main_admin_endpoints_are_forbidden() {
    let server = TestServer::start().await;
    let lisa = server.worker("lisa.chen").await;

    let forbidden = [
        lisa.complaints().analytics().await.map(|_| ()).unwrap_err(),
        lisa.workers().list(None).await.map(|_| ()).unwrap_err(),
        lisa.users().list(None).await.map(|_| ()).unwrap_err(),
        lisa.complaints()
            .assign(&ComplaintId::new("CMP005"), "worker4")
            .await
            .map(|_| ())
            .unwrap_err(),
        lisa.complaints()
            .transfer(&ComplaintId::new("CMP003"), "Public Works")
            .await
            .map(|_| ())
            .unwrap_err(),
    ];
    for err in forbidden {
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN), "{err}");
    }

    // A 403 keeps the session.
    assert!(lisa.is_authenticated().await);
}
