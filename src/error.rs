use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::backend::BackendError;
use crate::session::SessionError;

/// Errors returned by the JSON proxy routes.
#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    InvalidCredentials,
    /// Backend rejected the request; status and message are relayed as-is.
    Backend {
        status: StatusCode,
        message: String,
    },
    InternalServerError,
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl AppError {
    /// Relays a backend rejection, using `fallback` when the backend sent no
    /// message. Transport failures become [`AppError::InternalServerError`].
    pub fn relay(err: BackendError, fallback: &str) -> Self {
        match err {
            BackendError::Status { status, message } => AppError::Backend {
                status,
                message: message.unwrap_or_else(|| fallback.to_string()),
            },
            other => {
                tracing::error!("Backend request failed: {}", other);
                AppError::InternalServerError
            }
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        tracing::error!("Failed to store session: {}", err);
        AppError::InternalServerError
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AppError::Backend { status, message } => (status, message),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_keeps_backend_status_and_message() {
        let err = AppError::relay(
            BackendError::Status {
                status: StatusCode::CONFLICT,
                message: Some("Username sudah dipakai".into()),
            },
            "Registration failed",
        );
        match err {
            AppError::Backend { status, message } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(message, "Username sudah dipakai");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn relay_uses_fallback_message() {
        let err = AppError::relay(
            BackendError::Status {
                status: StatusCode::BAD_REQUEST,
                message: None,
            },
            "Backend error",
        );
        assert!(matches!(err, AppError::Backend { message, .. } if message == "Backend error"));
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InternalServerError.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
