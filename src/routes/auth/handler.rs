use axum::extract::{Json, State};
use axum_extra::extract::CookieJar;
use serde_json::Value;

use crate::{
    AppState,
    backend::{BackendError, Credentials, LoginPayload},
    error::AppError,
    session,
};

use super::model::{LoginResponse, MessageResponse};

/// Logs in against the backend. Any backend rejection is reported as
/// [`AppError::InvalidCredentials`] without leaking the backend's reason.
pub async fn authenticate(
    state: &AppState,
    credentials: &Credentials,
) -> Result<LoginPayload, AppError> {
    match state.backend.login(credentials).await {
        Ok(payload) => Ok(payload),
        Err(BackendError::Status { status, .. }) => {
            tracing::info!(
                "Login rejected for {}: backend answered {}",
                credentials.username,
                status
            );
            Err(AppError::InvalidCredentials)
        }
        Err(e) => {
            tracing::error!("Login error: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<Credentials>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let payload = authenticate(&state, &req).await?;
    let jar = session::start_session(jar, &state.config, &payload.token)?;

    let token = state.config.expose_login_token.then_some(payload.token);
    Ok((
        jar,
        Json(LoginResponse {
            user: payload.user,
            token,
        }),
    ))
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Json<Value>, AppError> {
    match state.backend.register(&req).await {
        Ok(data) => {
            tracing::info!("Registered account {}", req.username);
            Ok(Json(data))
        }
        Err(e) => {
            tracing::warn!("Register error for {}: {}", req.username, e);
            Err(AppError::relay(e, "Registration failed"))
        }
    }
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        session::end_session(jar, &state.config),
        Json(MessageResponse::new("Logged out")),
    )
}
