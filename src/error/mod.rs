//! Unified error handling for kc-provision

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Admin token could not be obtained
    #[error("Auth error: {0}")]
    Auth(String),

    /// User lookup/create failed or returned inconsistent state
    #[error("Provision error: {0}")]
    Provision(String),

    /// The provider refused the temporary password (policy violation)
    #[error("Password rejected: {0}")]
    PasswordRejected(String),

    /// Password reset or required-action update failed
    #[error("Update error: {0}")]
    Update(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Import cancelled")]
    Cancelled,

    #[error("An import is already in progress")]
    ImportInProgress,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::Auth(msg) => {
                tracing::error!("Keycloak admin login failed: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "auth_error",
                    "Could not authenticate against the identity provider".to_string(),
                )
            }
            AppError::Provision(msg) => {
                tracing::error!("User provisioning failed: {}", msg);
                (StatusCode::BAD_GATEWAY, "provision_error", msg.clone())
            }
            AppError::PasswordRejected(msg) => {
                tracing::warn!("Temporary password rejected: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "password_rejected",
                    msg.clone(),
                )
            }
            AppError::Update(msg) => {
                tracing::error!("User update failed: {}", msg);
                (StatusCode::BAD_GATEWAY, "update_error", msg.clone())
            }
            AppError::Transport(e) => {
                tracing::error!("Transport error: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "transport_error",
                    "Identity provider is unreachable".to_string(),
                )
            }
            AppError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "cancelled",
                self.to_string(),
            ),
            AppError::ImportInProgress => (
                StatusCode::CONFLICT,
                "import_in_progress",
                self.to_string(),
            ),
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Provision("user vanished after conflict".to_string());
        assert_eq!(
            err.to_string(),
            "Provision error: user vanished after conflict"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: AppError = anyhow::anyhow!("Something went wrong").into();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Auth("401".into()), StatusCode::BAD_GATEWAY),
            (AppError::Provision("500".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::PasswordRejected("too short".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::Update("404".into()), StatusCode::BAD_GATEWAY),
            (AppError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
            (AppError::ImportInProgress, StatusCode::CONFLICT),
            (
                AppError::Config("bad".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
