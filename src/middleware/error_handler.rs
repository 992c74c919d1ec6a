use axum::{
    body::{Body, to_bytes},
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::error;

/// Largest error body captured for the log line.
const MAX_LOGGED_BODY: usize = 4096;

/// Logs every 5xx response together with the request that produced it.
/// JSON error bodies are included in the log line; HTML pages are not.
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if !is_json {
        error!(
            "Server error on {} {} - Status: {}",
            method,
            path,
            response.status()
        );
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_LOGGED_BODY).await {
        Ok(b) => b,
        Err(e) => {
            error!(
                "Server error on {} {} - Status: {}, body unreadable: {}",
                method, path, parts.status, e
            );
            return Response::from_parts(parts, Body::empty());
        }
    };

    error!(
        "Server error on {} {} - Status: {}, Body: {}",
        method,
        path,
        parts.status,
        String::from_utf8_lossy(&bytes)
    );

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
