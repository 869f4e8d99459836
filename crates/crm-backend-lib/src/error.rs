// crates/crm-backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types with error codes and HTTP mappings.
#[derive(Error, Debug)]
pub enum AppError {
    /// Lookup or verifier failure during authentication. Kept at 500 to
    /// preserve the externally-observed status; a clean credential mismatch
    /// is reported as `Forbidden` instead.
    #[error("invalid username or password")]
    LoginFailure,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("account does not exist")]
    AccountDoesNotExist,

    #[error("account already exists")]
    AccountExists,

    #[error("role does not exist")]
    RoleDoesNotExist,

    #[error("invalid auth token")]
    InvalidAuthToken,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidAuthToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::AccountDoesNotExist | AppError::RoleDoesNotExist => StatusCode::NOT_FOUND,
            AppError::AccountExists => StatusCode::CONFLICT,
            // Decode failures and login-path lookup failures keep the
            // generic server-error status the API has always returned.
            AppError::LoginFailure
            | AppError::Json(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::LoginFailure => "AUTH_001",
            AppError::Forbidden(_) => "AUTH_002",
            AppError::Unauthorized => "AUTH_003",
            AppError::InvalidAuthToken => "AUTH_004",
            AppError::AccountDoesNotExist => "ACCT_001",
            AppError::AccountExists => "ACCT_002",
            AppError::RoleDoesNotExist => "ROLE_001",
            AppError::Json(_) => "JSON_001",
            AppError::Io(_) => "IO_001",
            AppError::Internal(_) => "INT_001",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Error messages surface directly as the response body, matching
        // the existing API contract.
        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
