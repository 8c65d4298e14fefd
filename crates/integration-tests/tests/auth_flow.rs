//! Integration tests for login, session lookup and logout.

#![allow(clippy::unwrap_used)]

use civic_desk_client::ClientError;
use civic_desk_core::AdminRole;
use civic_desk_integration_tests::{ADMIN_PASSWORD, TestServer, WORKER_PASSWORD};

#[tokio::test]
async fn test_main_admin_login_and_me() {
    let server = TestServer::start().await;
    let client = server.client();

    let login = client
        .auth()
        .login("admin", ADMIN_PASSWORD, AdminRole::MainAdmin)
        .await
        .unwrap();
    assert_eq!(login.user.role, AdminRole::MainAdmin);
    assert!(!login.token.is_empty());
    assert!(client.is_authenticated().await);

    let me = client.auth().me().await.unwrap();
    assert_eq!(me.id.as_str(), "admin");
    assert_eq!(me.name, "System Administrator");
}

#[tokio::test]
async fn test_login_requires_matching_role() {
    let server = TestServer::start().await;
    let client = server.client();

    let err = client
        .auth()
        .login("mike.wilson", WORKER_PASSWORD, AdminRole::MainAdmin)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "Invalid credentials"));
    assert!(!client.is_authenticated().await);

    let login = client
        .auth()
        .login("mike.wilson", WORKER_PASSWORD, AdminRole::LowerAdmin)
        .await
        .unwrap();
    assert_eq!(login.user.department.as_deref(), Some("Public Works"));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let server = TestServer::start().await;
    let err = server
        .client()
        .auth()
        .login("admin", "admin124", AdminRole::MainAdmin)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let server = TestServer::start().await;
    let client = server.main_admin().await;

    // Keep a second handle on the same token to prove the server forgot it.
    let token = client
        .auth()
        .login("admin", ADMIN_PASSWORD, AdminRole::MainAdmin)
        .await
        .unwrap()
        .token;
    let replay = server.client();
    replay.set_token(token).await;

    client.auth().logout().await.unwrap();
    assert!(!client.is_authenticated().await);

    let err = replay.auth().me().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
}

#[tokio::test]
async fn test_rejected_token_forces_logout() {
    let server = TestServer::start().await;
    let client = server.client();
    client.set_token("not-a-token").await;

    let err = client.complaints().analytics().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_requests_without_session_are_unauthorized() {
    let server = TestServer::start().await;
    let err = server
        .client()
        .complaints()
        .list(&Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "Authentication required"));
}

#[tokio::test]
async fn test_banner_is_public() {
    let server = TestServer::start().await;
    let body: serde_json::Value = reqwest::get(format!("{}/api", server.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Admin Dashboard API is running");
}
