use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::services::arr::ConnectionStatus;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(get_status))
        .route("/plex/config", get(get_plex_config))
}

#[derive(Debug, Serialize)]
pub struct ManagerStatus {
    pub success: bool,
    pub radarr: ConnectionStatus,
    pub sonarr: ConnectionStatus,
}

#[derive(Debug, Serialize)]
pub struct PlexConfig {
    pub success: bool,
    pub url: String,
}

/// Check both managers; a failed check is reported, never raised
async fn get_status(State(state): State<Arc<AppState>>) -> Json<ManagerStatus> {
    let (radarr, sonarr) = tokio::join!(
        state.radarr.test_connection(),
        state.sonarr.test_connection()
    );

    Json(ManagerStatus {
        success: true,
        radarr,
        sonarr,
    })
}

async fn get_plex_config(State(state): State<Arc<AppState>>) -> Json<PlexConfig> {
    Json(PlexConfig {
        success: true,
        url: state.config.plex_url.clone(),
    })
}
