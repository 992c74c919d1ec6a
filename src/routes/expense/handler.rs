use axum::{
    body::Bytes,
    extract::{Json, State},
};
use serde_json::Value;

use crate::{AppState, error::AppError, session::SessionToken};

/// Forwards the request body to the backend with the session's bearer token.
/// The session is checked before the body is parsed; without one nothing is sent.
#[axum::debug_handler]
pub async fn create_expense(
    State(state): State<AppState>,
    token: SessionToken,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let Some(token) = token.as_deref() else {
        return Err(AppError::Unauthorized);
    };

    let body: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!("Proxy error: invalid request body: {}", e);
        AppError::InternalServerError
    })?;

    match state.backend.create_expense(token, &body).await {
        Ok(created) => Ok(Json(created)),
        Err(e) => {
            tracing::warn!("Proxy error: {}", e);
            Err(AppError::relay(e, "Backend error"))
        }
    }
}
