// ==========================
// crates/crm-backend-lib/tests/login_flow.rs
// ==========================
//! End-to-end login, auto-provisioning and change-password flows.
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crm_backend_lib::api::create_router;
use crm_backend_lib::auth::{
    Authenticator, BuiltinAuthenticator, Directory, LdapAuthenticator, SessionManager, SESSION_TTL,
};
use crm_backend_lib::config::Settings;
use crm_backend_lib::error::AppError;
use crm_backend_lib::manager::{DefaultManager, Manager};
use crm_backend_lib::store::{MemoryAccountStore, MemoryEventStore};
use crm_backend_lib::AppState;
use crm_common::{Account, AuthToken};

fn build_app(authenticator: Arc<dyn Authenticator>) -> (Router, Arc<DefaultManager>) {
    let manager = Arc::new(DefaultManager::new(
        authenticator,
        SessionManager::new(SESSION_TTL, Duration::from_secs(3600)),
        Arc::new(MemoryAccountStore::new()),
        Arc::new(MemoryEventStore::new()),
    ));
    let state = Arc::new(AppState::new(manager.clone(), Settings::default()).unwrap());
    (create_router(state), manager)
}

async fn seed_admin(manager: &DefaultManager) {
    let mut admin = Account::new("admin", vec!["admin".to_string()]);
    admin.password = "admin-password-1".to_string();
    manager.save_account(admin).await.unwrap();
}

fn login_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .header("user-agent", "login-tests/1.0")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Option<AuthToken>) {
    let body = format!(r#"{{"username":"{username}","password":"{password}"}}"#);
    let response = app.clone().oneshot(login_request(&body)).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let token = serde_json::from_slice(&bytes).ok();
    (status, token)
}

struct MapDirectory(HashMap<String, String>);

#[async_trait]
impl Directory for MapDirectory {
    async fn simple_bind(&self, username: &str, password: &str) -> Result<bool, AppError> {
        Ok(self.0.get(username).is_some_and(|p| p == password))
    }
}

#[tokio::test]
async fn builtin_login_issues_token_bound_to_user_agent() {
    let (app, manager) = build_app(Arc::new(BuiltinAuthenticator));
    seed_admin(&manager).await;

    let (status, token) = login(&app, "admin", "admin-password-1").await;
    assert_eq!(status, StatusCode::OK);

    let token = token.expect("login response carries a token");
    assert_eq!(token.username, "admin");
    assert_eq!(token.user_agent, "login-tests/1.0");
    manager
        .verify_auth_token("admin", &token.token)
        .await
        .unwrap();
}

#[tokio::test]
async fn wrong_password_is_forbidden() {
    let (app, manager) = build_app(Arc::new(BuiltinAuthenticator));
    seed_admin(&manager).await;

    let (status, token) = login(&app, "admin", "not-the-password").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(token.is_none());
}

#[tokio::test]
async fn unknown_account_login_is_a_server_error() {
    // lookup failures keep the historical 500, distinct from the 403 above
    let (app, _manager) = build_app(Arc::new(BuiltinAuthenticator));
    let (status, _) = login(&app, "ghost", "whatever").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn malformed_login_body_is_a_server_error() {
    let (app, _manager) = build_app(Arc::new(BuiltinAuthenticator));
    let response = app.oneshot(login_request("{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn ldap_login_autocreates_exactly_one_account() {
    let directory = MapDirectory(HashMap::from([("jane".to_string(), "pw".to_string())]));
    let (app, manager) = build_app(Arc::new(LdapAuthenticator::new(
        directory,
        true,
        "readonly".to_string(),
    )));

    let (status, _) = login(&app, "jane", "pw").await;
    assert_eq!(status, StatusCode::OK);

    let account = manager.account("jane").await.unwrap();
    assert_eq!(account.roles, vec!["readonly".to_string()]);

    // second login must not create another account
    let (status, _) = login(&app, "jane", "pw").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(manager.accounts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn ldap_without_autocreate_leaves_store_untouched() {
    let directory = MapDirectory(HashMap::from([("jane".to_string(), "pw".to_string())]));
    let (app, manager) = build_app(Arc::new(LdapAuthenticator::new(
        directory,
        false,
        "readonly".to_string(),
    )));

    let (status, _) = login(&app, "jane", "pw").await;
    assert_eq!(status, StatusCode::OK);
    assert!(manager.accounts().await.unwrap().is_empty());
}

#[tokio::test]
async fn change_password_requires_authentication() {
    let (app, manager) = build_app(Arc::new(BuiltinAuthenticator));
    seed_admin(&manager).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/account/changepassword")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"password":"new-password-1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // the credential-update path was never reached
    assert!(manager.authenticate("admin", "admin-password-1").await.unwrap());
}

#[tokio::test]
async fn change_password_with_session_updates_credential() {
    let (app, manager) = build_app(Arc::new(BuiltinAuthenticator));
    seed_admin(&manager).await;

    let (_, token) = login(&app, "admin", "admin-password-1").await;
    let token = token.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/account/changepassword")
                .header("content-type", "application/json")
                .header("x-access-token", format!("admin:{}", token.token))
                .body(Body::from(r#"{"password":"new-password-1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(!manager.authenticate("admin", "admin-password-1").await.unwrap());
    assert!(manager.authenticate("admin", "new-password-1").await.unwrap());
}
