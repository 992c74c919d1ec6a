use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use time::Duration;

use crate::{AppState, config::Config};

/// Lifetime of the session cookie, matching the backend token expiry.
pub const SESSION_MAX_AGE_SECS: i64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session token contains characters not allowed in a cookie")]
    InvalidToken,
}

/// Session token read from the request cookies, if any.
#[derive(Debug, Clone)]
pub struct SessionToken(pub Option<String>);

impl SessionToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequestParts<AppState> for SessionToken {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(SessionToken(read_token(&jar, &state.config.cookie_name)))
    }
}

pub fn read_token(jar: &CookieJar, cookie_name: &str) -> Option<String> {
    jar.get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Builds the HTTP-only session cookie carrying `token`.
pub fn session_cookie(config: &Config, token: &str) -> Result<Cookie<'static>, SessionError> {
    if token.is_empty() || !token.chars().all(is_cookie_value_char) {
        return Err(SessionError::InvalidToken);
    }

    Ok(Cookie::build((config.cookie_name.clone(), token.to_string()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::seconds(SESSION_MAX_AGE_SECS))
        .secure(config.production)
        .build())
}

/// Stores the session cookie in the jar.
pub fn start_session(jar: CookieJar, config: &Config, token: &str) -> Result<CookieJar, SessionError> {
    Ok(jar.add(session_cookie(config, token)?))
}

/// Expires the session cookie. The removal is always emitted, even when the
/// request carried no session.
pub fn end_session(jar: CookieJar, config: &Config) -> CookieJar {
    let mut removal = Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build();
    removal.make_removal();
    jar.add(removal)
}

fn is_cookie_value_char(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, ';' | ',' | '"' | '\\')
}
