use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::manager::Manager;
use crate::middleware::AuthIdentity;
use crate::AppState;

/// Record one audit event per request, unless the normalized path matches an
/// exclude pattern. Exclusion only suppresses the record; the request always
/// continues down the chain.
pub async fn audit<M: Manager + 'static>(
    State(state): State<Arc<AppState<M>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().to_string();
    let username = request
        .extensions()
        .get::<AuthIdentity>()
        .map(|id| id.username.clone())
        .unwrap_or_default();

    let excluded = state
        .audit_excludes
        .iter()
        .any(|pattern| pattern.is_match(&path));

    if !excluded {
        state
            .manager
            .log_event("api", &format!("{method} {path}"), &username, vec!["api".to_string()])
            .await;
    }

    tracing::debug!(%method, %path, excluded, "api request");

    next.run(request).await
}
