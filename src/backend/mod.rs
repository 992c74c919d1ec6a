//! HTTP client for the FinTrack backend API.
//!
//! Every call goes through one shared [`reqwest::Client`]. Authenticated reads use
//! [`BackendClient::fetch_with_auth`], which turns a missing token or a 401/403 into
//! `Ok(None)` so that pages can redirect to the login screen.

use reqwest::{IntoUrl, Method, StatusCode, Url, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::models::{RecordId, Transaction, User};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend responded with {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("cannot build backend URL for {0:?}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body returned by the backend on a successful login.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub token: String,
    #[serde(default)]
    pub user: Value,
}

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: None,
        }
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
        }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MeResponse {
    Wrapped { user: User },
    Bare(User),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TransactionList {
    Wrapped { data: Vec<Transaction> },
    Bare(Vec<Transaction>),
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Joins path segments onto the base URL. Each segment is percent-encoded,
    /// so `/`, `?` and `#` inside a segment stay part of it.
    fn segments_url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        if segments.iter().any(|s| matches!(*s, "" | "." | "..")) {
            return Err(BackendError::InvalidUrl(segments.join("/")));
        }

        let invalid = || BackendError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends an authenticated request and decodes the JSON response.
    ///
    /// Returns `Ok(None)` without touching the network when `token` is absent,
    /// and `Ok(None)` when the backend answers 401 or 403. Other non-success
    /// statuses become [`BackendError::Status`].
    pub async fn fetch_with_auth<T: DeserializeOwned>(
        &self,
        token: Option<&str>,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, BackendError> {
        let Some(token) = token else {
            tracing::debug!("No session token, skipping request to {}", endpoint);
            return Ok(None);
        };

        self.send_with_auth(token, self.url(endpoint), endpoint, options).await
    }

    async fn send_with_auth<T: DeserializeOwned>(
        &self,
        token: &str,
        url: impl IntoUrl,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, BackendError> {
        let mut request = self
            .http
            .request(options.method, url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CACHE_CONTROL, "no-store");
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Fetch error for {}: {}", endpoint, e);
            BackendError::from(e)
        })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::debug!(
                    "Backend rejected session for {} with {}",
                    endpoint,
                    response.status()
                );
                Ok(None)
            }
            status if !status.is_success() => {
                let err = status_error(response).await;
                tracing::error!("Fetch error for {}: {}", endpoint, err);
                Err(err)
            }
            _ => {
                let body = response.json::<T>().await.map_err(|e| {
                    tracing::error!("Failed to decode response from {}: {}", endpoint, e);
                    BackendError::from(e)
                })?;
                Ok(Some(body))
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginPayload, BackendError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(credentials)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json().await?)
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<Value, BackendError> {
        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(credentials)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Forwards a new expense. Backend rejections, 401 included, surface as
    /// [`BackendError::Status`] so the caller can relay them.
    pub async fn create_expense<B: Serialize + ?Sized>(
        &self,
        token: &str,
        body: &B,
    ) -> Result<Value, BackendError> {
        let response = self
            .http
            .post(self.url("/api/pengeluaran"))
            .bearer_auth(token)
            .header(header::CACHE_CONTROL, "no-store")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json().await?)
    }

    pub async fn current_user(&self, token: Option<&str>) -> Result<Option<User>, BackendError> {
        let me = self
            .fetch_with_auth::<MeResponse>(token, "/api/auth/me", RequestOptions::get())
            .await?;

        Ok(me.map(|me| match me {
            MeResponse::Wrapped { user } | MeResponse::Bare(user) => user,
        }))
    }

    pub async fn user_expenses(
        &self,
        token: Option<&str>,
        user_id: &RecordId,
    ) -> Result<Option<Vec<Transaction>>, BackendError> {
        let Some(token) = token else {
            return Ok(None);
        };

        let id = user_id.to_string();
        let url = self.segments_url(&["api", "pengeluaran", "user", &id])?;
        let list = self
            .send_with_auth::<TransactionList>(
                token,
                url,
                "/api/pengeluaran/user",
                RequestOptions::get(),
            )
            .await?;

        Ok(list.map(|list| match list {
            TransactionList::Wrapped { data } | TransactionList::Bare(data) => data,
        }))
    }
}

/// Builds a [`BackendError::Status`], keeping the backend's `message` when the
/// body carries one.
async fn status_error(response: reqwest::Response) -> BackendError {
    let status = response.status();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_owned));

    BackendError::Status { status, message }
}
