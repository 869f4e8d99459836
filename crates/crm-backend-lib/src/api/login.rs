// ============================
// crm-backend-lib/src/api/login.rs
// ============================
//! Login and change-password handlers.
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Extension, Json,
};
use std::sync::Arc;

use crate::auth::AutoProvision;
use crate::error::AppError;
use crate::manager::Manager;
use crate::middleware::AuthIdentity;
use crate::AppState;
use crm_common::{Account, AuthToken, Credentials};

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// Body decoding goes through serde_json directly so a malformed payload
// keeps the generic server-error status the API has always returned.
fn decode_credentials(body: &Bytes) -> Result<Credentials, AppError> {
    Ok(serde_json::from_slice(body)?)
}

/// POST /auth/login
///
/// Decode credentials, authenticate, apply the authenticator's
/// auto-provisioning policy, then issue and return an auth token.
pub async fn login<M: Manager + 'static>(
    State(state): State<Arc<AppState<M>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AuthToken>, AppError> {
    let creds = decode_credentials(&body)?;

    let login_successful = state
        .manager
        .authenticate(&creds.username, &creds.password)
        .await
        .map_err(|err| {
            tracing::error!(username = %creds.username, %err, "login error");
            err
        })?;

    if !login_successful {
        tracing::warn!(username = %creds.username, "invalid login");
        return Err(AppError::Forbidden(
            "invalid username or password".to_string(),
        ));
    }

    // first-time externally-authenticated users may get a local account
    if let AutoProvision::CreateWithRole(role) = state.manager.authenticator().auto_provision() {
        match state.manager.account(&creds.username).await {
            Ok(_) => {}
            Err(AppError::AccountDoesNotExist) => {
                tracing::debug!(username = %creds.username, %role, "autocreating directory user");
                let account = Account::new(creds.username.clone(), vec![role]);
                state.manager.save_account(account).await.map_err(|err| {
                    tracing::error!(username = %creds.username, %err, "error autocreating user");
                    err
                })?;
            }
            Err(err) => {
                tracing::error!(%err, "error checking user for autocreate");
                return Err(err);
            }
        }
    }

    let token = state
        .manager
        .new_auth_token(&creds.username, &user_agent(&headers))
        .await?;

    state
        .manager
        .log_event("login", &format!("{} logged in", creds.username), &creds.username, vec!["security".to_string()])
        .await;

    Ok(Json(token))
}

/// POST /api/account/changepassword
///
/// The username comes from the authenticated identity established by the
/// auth stage, never from the payload.
pub async fn change_password<M: Manager + 'static>(
    State(state): State<Arc<AppState<M>>>,
    identity: Option<Extension<AuthIdentity>>,
    body: Bytes,
) -> Result<(), AppError> {
    let Some(Extension(identity)) = identity else {
        return Err(AppError::Unauthorized);
    };

    let creds = decode_credentials(&body)?;
    state
        .manager
        .change_password(&identity.username, creds.password)
        .await?;

    state
        .manager
        .log_event("change-password", &format!("{} changed password", identity.username), &identity.username, vec!["security".to_string()])
        .await;

    Ok(())
}
