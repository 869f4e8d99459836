use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::manager::Manager;
use crate::middleware::AuthIdentity;
use crate::AppState;

/// Enforce that the authenticated account has sufficient access for the
/// requested route: write verbs require a role other than "readonly".
pub async fn access_required<M: Manager + 'static>(
    State(state): State<Arc<AppState<M>>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<AuthIdentity>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    let account = state
        .manager
        .account(&identity.username)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    let method = request.method();
    let is_write = method == Method::POST || method == Method::PUT || method == Method::DELETE;
    let readonly_only = account.roles.iter().all(|r| r == "readonly");

    if is_write && readonly_only {
        return Err(AppError::Forbidden(
            "insufficient access for this operation".to_string(),
        ));
    }

    Ok(next.run(request).await)
}
