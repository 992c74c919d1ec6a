use backend::BackendClient;
use config::Config;
use views::Views;

pub mod backend;
pub mod config;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod session;
pub mod stats;
pub mod views;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: BackendClient,
    pub views: Views,
}

impl AppState {
    pub fn new(config: Config) -> tera::Result<Self> {
        let backend = BackendClient::new(&config.backend_api_url);
        Self::with_backend(config, backend)
    }

    /// Builds the state around an existing backend client and compiles the page templates.
    pub fn with_backend(config: Config, backend: BackendClient) -> tera::Result<Self> {
        Ok(Self {
            config,
            backend,
            views: Views::new()?,
        })
    }
}
