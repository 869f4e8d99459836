use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::manager::Manager;
use crate::AppState;

/// Authenticated identity recovered from the access token, stored in request
/// extensions for the stages and handlers behind this one.
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub username: String,
}

/// Header carrying the issued credential as `<username>:<token>`.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Reject any request without a live auth token. Runs before every handler
/// on the `/api` surface, so a rejected request never reaches a store.
pub async fn auth_required<M: Manager + 'static>(
    State(state): State<Arc<AppState<M>>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let (username, token) = header.split_once(':').ok_or(AppError::Unauthorized)?;
    if username.is_empty() || token.is_empty() {
        return Err(AppError::Unauthorized);
    }
    // own the credential parts so the header borrow ends before the
    // extensions are touched
    let username = username.to_string();
    let token = token.to_string();

    state.manager.verify_auth_token(&username, &token).await?;

    request.extensions_mut().insert(AuthIdentity { username });

    Ok(next.run(request).await)
}
