use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState,
    backend::BackendError,
    error::AppError,
    forms::{self, ExpenseForm, FieldErrors, LoginForm, RegisterForm},
    models::{Transaction, User},
    routes::auth::authenticate,
    session::{self, SessionToken},
    stats::summarize,
    views::{DashboardView, LoginView, RegisterView},
};

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub registered: Option<String>,
}

fn general(message: &str) -> FieldErrors {
    FieldErrors::from([("general".to_string(), message.to_string())])
}

/// Loads the current user and their expenses, newest first. `None` means the
/// visitor must log in again.
async fn load_dashboard(state: &AppState, token: Option<&str>) -> Option<(User, Vec<Transaction>)> {
    let user = match state.backend.current_user(token).await {
        Ok(Some(user)) => user,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Could not load current user: {}", e);
            return None;
        }
    };

    let mut transactions = match state.backend.user_expenses(token, &user.id).await {
        Ok(Some(list)) => list,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Could not load expenses for user {}: {}", user.id, e);
            return None;
        }
    };
    transactions.sort_by(|a, b| b.day().cmp(&a.day()));

    Some((user, transactions))
}

/// Turns a rendered template into a response, or a bare 500 when rendering fails.
fn page(status: StatusCode, rendered: tera::Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Sends the visitor to the login form, dropping the session cookie so that
/// `/login` does not bounce them straight back.
fn back_to_login(state: &AppState, jar: CookieJar) -> Response {
    (session::end_session(jar, &state.config), Redirect::to("/login")).into_response()
}

fn render_dashboard(
    state: &AppState,
    status: StatusCode,
    user: &User,
    transactions: &[Transaction],
    form: &ExpenseForm,
    errors: &FieldErrors,
) -> Response {
    let summary = summarize(transactions);
    let rendered = state.views.dashboard_page(&DashboardView {
        user,
        transactions,
        summary: &summary,
        today: Local::now().date_naive(),
        form,
        errors,
    });
    page(status, rendered)
}

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
    token: SessionToken,
) -> Response {
    match load_dashboard(&state, token.as_deref()).await {
        Some((user, transactions)) => render_dashboard(
            &state,
            StatusCode::OK,
            &user,
            &transactions,
            &ExpenseForm::default(),
            &FieldErrors::new(),
        ),
        None => back_to_login(&state, jar),
    }
}

#[axum::debug_handler]
pub async fn login_page(
    State(state): State<AppState>,
    token: SessionToken,
    Query(query): Query<LoginQuery>,
) -> Response {
    if token.as_deref().is_some() {
        return Redirect::to("/").into_response();
    }

    let rendered = state.views.login_page(&LoginView {
        username: "",
        errors: &FieldErrors::new(),
        registered: query.registered.is_some(),
    });
    page(StatusCode::OK, rendered)
}

#[axum::debug_handler]
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let render = |status: StatusCode, errors: FieldErrors| {
        let rendered = state.views.login_page(&LoginView {
            username: &form.username,
            errors: &errors,
            registered: false,
        });
        page(status, rendered)
    };

    if let Err(errors) = forms::check(&form) {
        return render(StatusCode::UNPROCESSABLE_ENTITY, errors);
    }

    let payload = match authenticate(&state, &form.credentials()).await {
        Ok(payload) => payload,
        Err(AppError::InvalidCredentials) => {
            return render(
                StatusCode::UNAUTHORIZED,
                general("Username atau password salah. Coba lagi ya!"),
            );
        }
        Err(_) => {
            return render(
                StatusCode::INTERNAL_SERVER_ERROR,
                general("Server lagi bermasalah. Coba nanti lagi ya!"),
            );
        }
    };

    match session::start_session(jar, &state.config, &payload.token) {
        Ok(jar) => (jar, Redirect::to("/")).into_response(),
        Err(e) => {
            tracing::error!("Failed to store session: {}", e);
            render(
                StatusCode::INTERNAL_SERVER_ERROR,
                general("Server lagi bermasalah. Coba nanti lagi ya!"),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn register_page(State(state): State<AppState>) -> Response {
    let rendered = state.views.register_page(&RegisterView {
        username: "",
        errors: &FieldErrors::new(),
    });
    page(StatusCode::OK, rendered)
}

#[axum::debug_handler]
pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let render = |status: StatusCode, errors: FieldErrors| {
        let rendered = state.views.register_page(&RegisterView {
            username: &form.username,
            errors: &errors,
        });
        page(status, rendered)
    };

    if let Err(errors) = forms::check(&form) {
        return render(StatusCode::UNPROCESSABLE_ENTITY, errors);
    }

    match state.backend.register(&form.credentials()).await {
        Ok(_) => {
            tracing::info!("Registered account {}", form.username);
            Redirect::to("/login?registered=1").into_response()
        }
        Err(BackendError::Status { status, message }) => render(
            status,
            general(message.as_deref().unwrap_or("Registrasi gagal")),
        ),
        Err(e) => {
            tracing::error!("Register error: {}", e);
            render(
                StatusCode::INTERNAL_SERVER_ERROR,
                general("Server lagi bermasalah. Coba nanti lagi ya!"),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn logout_submit(State(state): State<AppState>, jar: CookieJar) -> Response {
    (session::end_session(jar, &state.config), Redirect::to("/login")).into_response()
}

#[axum::debug_handler]
pub async fn expense_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    token: SessionToken,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let Some(token) = token.as_deref() else {
        return Redirect::to("/login").into_response();
    };

    let (status, errors) = match form.to_new_expense() {
        Err(errors) => (StatusCode::UNPROCESSABLE_ENTITY, errors),
        Ok(expense) => match state.backend.create_expense(token, &expense).await {
            Ok(_) => return Redirect::to("/").into_response(),
            Err(BackendError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                return back_to_login(&state, jar);
            }
            Err(e) => {
                tracing::warn!("Failed to save expense: {}", e);
                let status = match e {
                    BackendError::Status { status, .. } => status,
                    BackendError::Request(_) => StatusCode::BAD_GATEWAY,
                    BackendError::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, general("Gagal menyimpan data"))
            }
        },
    };

    match load_dashboard(&state, Some(token)).await {
        Some((user, transactions)) => {
            render_dashboard(&state, status, &user, &transactions, &form, &errors)
        }
        None => back_to_login(&state, jar),
    }
}

pub async fn manifest() -> Json<Value> {
    Json(json!({
        "name": "FinTrack App",
        "short_name": "FinTrack",
        "description": "Financial tracking made easy",
        "start_url": "/",
        "id": "/",
        "display": "standalone",
        "background_color": "#ffffff",
        "theme_color": "#000000",
        "icons": [
            { "src": "/icons/icon-192x192.png", "sizes": "192x192", "type": "image/png" },
            { "src": "/icons/icon-512x512.png", "sizes": "512x512", "type": "image/png" }
        ],
        "screenshots": [
            { "src": "/screenshots/mobile-screenshot.png", "sizes": "1080x1920", "type": "image/png" },
            {
                "src": "/screenshots/desktop-screenshot.png",
                "sizes": "1920x1080",
                "type": "image/png",
                "form_factor": "wide"
            }
        ]
    }))
}
