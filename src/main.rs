use std::net::{IpAddr, SocketAddr};

use fintrack::{AppState, config::Config, routes};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Proxying to backend at {} (secure cookies: {})",
        config.backend_api_url,
        config.production
    );
    if config.expose_login_token {
        tracing::warn!("EXPOSE_LOGIN_TOKEN is enabled; login responses include the raw session token");
    }

    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to compile page templates: {:?}", e);
            std::process::exit(1);
        }
    };
    let router = routes::app(state.clone());

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
