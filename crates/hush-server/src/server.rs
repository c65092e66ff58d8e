use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    handlers::{create_secret, health, read_secret},
    store::SecretStore,
    AppState,
};

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated allowed origins ($HUSH_CORS_ORIGINS). Unset allows any.
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

impl ServerConfig {
    /// Build a config from `HUSH_*` variables resolved through `var`.
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: var("HUSH_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: var("HUSH_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cors_origins: var("HUSH_CORS_ORIGINS"),
        }
    }
}

/// Build the HTTP router over an existing store.
pub fn router(store: SecretStore, cors_origins: Option<&str>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/health", get(health))
        .route("/secret", post(create_secret))
        .route("/secret/{hash}", get(read_secret))
        .with_state(state)
        .layer(build_cors(cors_origins))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(cfg: ServerConfig) -> Result<()> {
    // Secrets live in memory only; they are gone when the process exits.
    let store = SecretStore::new();
    let app = router(store, cfg.cors_origins.as_deref());

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .context("invalid host/port")?;

    info!(%addr, "hush server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind listener")?;

    axum::serve(listener, app).await.context("server error")
}

fn build_cors(origins: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::OPTIONS])
        .allow_headers(Any);

    match origins {
        Some(o) => {
            let origins: Vec<_> = o.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            cors.allow_origin(origins)
        }
        None => cors.allow_origin(Any),
    }
}
