use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod models;
mod services;

use config::AppConfig;
use services::{radarr::RadarrClient, sonarr::SonarrClient, tmdb::TmdbClient, trakt::TraktClient};

pub struct AppState {
    pub config: AppConfig,
    pub tmdb: TmdbClient,
    pub trakt: TraktClient,
    pub radarr: RadarrClient,
    pub sonarr: SonarrClient,
}

impl AppState {
    /// Build every upstream client on one shared HTTP client
    fn new(config: AppConfig) -> Self {
        let client = services::http_client(config.request_timeout);
        Self {
            tmdb: TmdbClient::new(config.tmdb_api_key.clone(), client.clone()),
            trakt: TraktClient::new(config.trakt_client_id.clone(), client.clone()),
            radarr: RadarrClient::new(&config.radarr, client.clone()),
            sonarr: SonarrClient::new(&config.sonarr, client),
            config,
        }
    }
}

fn app(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    let index = ServeFile::new(static_dir.join("index.html"));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api::routes())
        .nest_service("/static", ServeDir::new(&static_dir))
        .route_service("/", index)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendarr=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::load();
    config.log_config();

    if !config.static_dir.exists() {
        tracing::warn!(
            "Static directory {} not found, only the API will be served",
            config.static_dir.display()
        );
    }

    let bind_ip: std::net::IpAddr = config.bind_address.parse()?;
    let addr = SocketAddr::new(bind_ip, config.port);

    let state = Arc::new(AppState::new(config));
    let app = app(state);

    tracing::info!("Starting server on {}", addr);

    // Create shutdown signal listener
    let shutdown_signal = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
            _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
        }
    };

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state(static_dir: std::path::PathBuf) -> Arc<AppState> {
        let mut config = AppConfig::build(ConfigFile::default(), &|_: &str| None);
        config.static_dir = static_dir;
        Arc::new(AppState::new(config))
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(test_state("static".into()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_serves_static_frontend() {
        let dir = std::env::temp_dir().join(format!("trendarr-static-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<html>trendarr</html>").unwrap();
        std::fs::write(dir.join("app.js"), "console.log('hi')").unwrap();

        let index = app(test_state(dir.clone()))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(index.status(), StatusCode::OK);

        let script = app(test_state(dir.clone()))
            .oneshot(Request::get("/static/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(script.status(), StatusCode::OK);

        let missing = app(test_state(dir.clone()))
            .oneshot(Request::get("/static/nope.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        std::fs::remove_dir_all(&dir).ok();
    }
}
