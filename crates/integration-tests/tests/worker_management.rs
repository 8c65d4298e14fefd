//! Integration tests for worker accounts and the citizen directory.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use civic_desk_client::ClientError;
use civic_desk_core::{AdminRole, AdminUserId, CitizenId, WorkerDraft, WorkerUpdate};
use civic_desk_integration_tests::TestServer;
use reqwest::StatusCode;

fn draft(username: &str, email: &str) -> WorkerDraft {
    WorkerDraft {
        username: username.to_owned(),
        password: "streetlight42".to_owned(),
        name: "Priya Nair".to_owned(),
        email: email.to_owned(),
        department: "Parks & Recreation".to_owned(),
    }
}

#[tokio::test]
async fn test_create_worker_and_log_in() {
    let server = TestServer::start().await;
    let admin = server.main_admin().await;

    let worker = admin
        .workers()
        .create(&draft("priya.nair", "priya.nair@admin.com"))
        .await
        .unwrap();
    assert_eq!(worker.id.as_str(), "worker5");
    assert_eq!(worker.role, AdminRole::LowerAdmin);
    assert_eq!(worker.assigned_complaints, 0);

    let client = server.client();
    let login = client
        .auth()
        .login("priya.nair", "streetlight42", AdminRole::LowerAdmin)
        .await
        .unwrap();
    assert_eq!(login.user.id, worker.id);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let server = TestServer::start().await;
    let admin = server.main_admin().await;

    let err = admin
        .workers()
        .create(&draft("mike.wilson", "someone.else@admin.com"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
}

#[tokio::test]
async fn test_invalid_worker_fields_are_rejected() {
    let server = TestServer::start().await;
    let admin = server.main_admin().await;

    let err = admin
        .workers()
        .create(&draft("priya.nair", "not-an-email"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

    let err = admin
        .workers()
        .update(&AdminUserId::new("worker2"), &WorkerUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_update_and_deactivate_worker() {
    let server = TestServer::start().await;
    let admin = server.main_admin().await;
    let lisa = server.worker("lisa.chen").await;
    let id = AdminUserId::new("worker2");

    let updated = admin
        .workers()
        .update(
            &id,
            &WorkerUpdate {
                name: Some("Lisa Chen-Park".to_owned()),
                ..WorkerUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Lisa Chen-Park");

    let deactivated = admin.workers().deactivate(&id).await.unwrap();
    assert!(!deactivated.is_active);

    let active = admin.workers().list(None).await.unwrap();
    assert!(active.iter().all(|w| w.id != id));

    // The existing session dies with the account.
    let err = lisa.auth().me().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert!(!lisa.is_authenticated().await);

    let err = server
        .client()
        .auth()
        .login("lisa.chen", "worker123", AdminRole::LowerAdmin)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
}

#[tokio::test]
async fn test_citizen_directory() {
    let server = TestServer::start().await;
    let admin = server.main_admin().await;

    let all = admin.users().list(None).await.unwrap();
    assert_eq!(all.len(), 5);

    let found = admin.users().search("sarah").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, CitizenId::new("USER002"));

    let by_phone = admin.users().list(Some("+1234567894")).await.unwrap();
    assert_eq!(by_phone[0].name, "James Wilson");

    let err = admin
        .users()
        .get(&CitizenId::new("USER999"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.to_string(), "User not found");
}
