#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use fintrack::{AppState, backend::BackendClient, config::Config, routes};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const VALID_TOKEN: &str = "tok-admin";
pub const EXPIRED_TOKEN: &str = "tok-expired";
/// Session whose expense list holds rows with missing or null fields.
pub const MESSY_TOKEN: &str = "tok-messy";

/// In-process stand-in for the FinTrack backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub hits: Arc<AtomicUsize>,
    pub last_expense: Arc<Mutex<Option<Value>>>,
    pub last_auth: Arc<Mutex<Option<String>>>,
}

impl FakeBackend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_expense(&self) -> Option<Value> {
        self.last_expense.lock().unwrap().clone()
    }

    pub fn last_auth(&self) -> Option<String> {
        self.last_auth.lock().unwrap().clone()
    }

    fn record(&self, headers: &HeaderMap) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        *self.last_auth.lock().unwrap() = auth;
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn login(
    State(fake): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(&headers);
    if body["username"] == "admin" && body["password"] == "password123" {
        Json(json!({
            "token": VALID_TOKEN,
            "user": { "id": 1, "username": "admin" }
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Password salah" })),
        )
            .into_response()
    }
}

async fn register(
    State(fake): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(&headers);
    match body["username"].as_str() {
        Some("taken") => (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Username sudah dipakai" })),
        )
            .into_response(),
        Some("broken") => (StatusCode::BAD_REQUEST, "not json").into_response(),
        Some(username) => (
            StatusCode::CREATED,
            Json(json!({ "message": "User created", "user": { "id": 2, "username": username } })),
        )
            .into_response(),
        None => (StatusCode::BAD_REQUEST, Json(json!({}))).into_response(),
    }
}

async fn me(State(fake): State<FakeBackend>, headers: HeaderMap) -> Response {
    fake.record(&headers);
    match bearer(&headers) {
        Some(VALID_TOKEN) => Json(json!({
            "user": { "id": 1, "username": "admin", "name": "Rizky Hasan" }
        }))
        .into_response(),
        Some(MESSY_TOKEN) => Json(json!({ "id": "u-7", "username": "sari" })).into_response(),
        Some("tok-broken") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "database down" })),
        )
            .into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn user_expenses(
    State(fake): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    fake.record(&headers);
    if bearer(&headers) == Some(MESSY_TOKEN) && id == "u-7" {
        return Json(json!([
            { "id": 1, "deskripsi": "Sate", "tanggal": "2026-02-11", "jumlah": 30000, "kategori": "makanan" },
            { "id": 2, "deskripsi": "Parkir", "tanggal": "2026-02-10", "jumlah": 5000, "kategori": null },
            { "id": 3, "deskripsi": "Donasi", "tanggal": null, "jumlah": "15000" }
        ]))
        .into_response();
    }
    if bearer(&headers) != Some(VALID_TOKEN) || id != "1" {
        return StatusCode::FORBIDDEN.into_response();
    }
    Json(json!({
        "data": [
            { "id": 1, "deskripsi": "Makan Siang", "tanggal": "2026-02-11", "jumlah": "25000", "kategori": "makanan" },
            { "id": 2, "deskripsi": "Isi Bensin", "tanggal": "2026-02-10", "jumlah": 50000, "kategori": "transportasi" },
            { "id": 3, "deskripsi": "Netflix", "tanggal": "2026-02-08T00:00:00.000Z", "jumlah": 180000, "kategori": "hiburan" },
            { "id": 4, "deskripsi": "Belanja", "tanggal": "2026-02-07", "jumlah": "120000.00", "kategori": "belanja" }
        ]
    }))
    .into_response()
}

async fn create_expense(
    State(fake): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(&headers);
    match bearer(&headers) {
        Some(VALID_TOKEN) => {
            *fake.last_expense.lock().unwrap() = Some(body.clone());
            if body.get("jumlah").is_none() {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": "jumlah wajib diisi" })),
                )
                    .into_response();
            }
            let mut created = body;
            created["id"] = json!(99);
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Some(EXPIRED_TOKEN) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Token expired" })),
        )
            .into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// Starts the fake backend on an ephemeral port.
pub async fn spawn_backend() -> anyhow::Result<(FakeBackend, SocketAddr)> {
    let fake = FakeBackend::default();
    let router = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
        .route("/api/pengeluaran", post(create_expense))
        .route("/api/pengeluaran/user/{id}", get(user_expenses))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok((fake, addr))
}

pub fn test_config(addr: SocketAddr) -> Config {
    Config {
        backend_api_url: format!("http://{}", addr),
        ..Config::default()
    }
}

pub fn test_app(config: Config) -> anyhow::Result<Router> {
    let http = reqwest::Client::builder().no_proxy().build()?;
    let backend = BackendClient::with_client(http, &config.backend_api_url);
    Ok(routes::app(AppState::with_backend(config, backend)?))
}

pub async fn send(app: &Router, request: Request<Body>) -> anyhow::Result<Response> {
    Ok(app.clone().oneshot(request).await?)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn session_cookie(token: &str) -> String {
    format!("fintrack_session={}", token)
}

pub fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

pub async fn body_json(response: Response) -> anyhow::Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

pub async fn body_text(response: Response) -> anyhow::Result<String> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(String::from_utf8(bytes.to_vec())?)
}
