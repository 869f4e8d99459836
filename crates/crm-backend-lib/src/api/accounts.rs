// ============================
// crm-backend-lib/src/api/accounts.rs
// ============================
//! Account CRUD handlers.
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::manager::Manager;
use crate::AppState;
use crm_common::Account;

/// GET /api/accounts
pub async fn list<M: Manager + 'static>(
    State(state): State<Arc<AppState<M>>>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = state.manager.accounts().await?;
    Ok(Json(accounts))
}

/// POST /api/accounts
pub async fn create<M: Manager + 'static>(
    State(state): State<Arc<AppState<M>>>,
    Json(account): Json<Account>,
) -> Result<StatusCode, AppError> {
    let username = account.username.clone();
    state.manager.save_account(account).await?;
    state
        .manager
        .log_event("account-create", &format!("account {username} created"), &username, vec!["security".to_string()])
        .await;
    Ok(StatusCode::CREATED)
}

/// GET /api/accounts/{username}
pub async fn get_one<M: Manager + 'static>(
    State(state): State<Arc<AppState<M>>>,
    Path(username): Path<String>,
) -> Result<Json<Account>, AppError> {
    let mut account = state.manager.account(&username).await?;
    // never echo the stored hash
    account.password.clear();
    Ok(Json(account))
}

/// DELETE /api/accounts/{username}
pub async fn delete_one<M: Manager + 'static>(
    State(state): State<Arc<AppState<M>>>,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    state.manager.delete_account(&username).await?;
    state
        .manager
        .log_event("account-delete", &format!("account {username} deleted"), &username, vec!["security".to_string()])
        .await;
    Ok(StatusCode::NO_CONTENT)
}
