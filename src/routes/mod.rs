use axum::{
    Router,
    routing::{get, post},
};

use crate::{AppState, middleware::log_errors};

pub mod auth;
pub mod expense;
pub mod pages;

/// JSON proxy routes mirroring the backend endpoints.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/pengeluaran", post(expense::create_expense))
}

/// Server-rendered pages and their form posts.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::dashboard))
        .route("/login", get(pages::login_page).post(pages::login_submit))
        .route("/register", get(pages::register_page).post(pages::register_submit))
        .route("/logout", post(pages::logout_submit))
        .route("/expenses", post(pages::expense_submit))
        .route("/manifest.webmanifest", get(pages::manifest))
}

/// Builds the full application with state and the error logging layer applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api_routes())
        .merge(page_routes())
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
