use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::{ok, required_id, ApiResult};
use crate::services::arr::{QualityProfile, RootFolder};
use crate::services::radarr::MovieLibraryStatus;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/library", get(get_library))
        .route("/library/status", get(get_library_status))
        .route("/profiles", get(get_profiles))
        .route("/rootfolders", get(get_root_folders))
        .route("/add", post(add_movie))
}

#[derive(Debug, Deserialize)]
pub struct AddMovieBody {
    pub tmdb_id: Option<i64>,
    pub quality_profile_id: Option<i64>,
    pub root_folder: Option<String>,
}

/// TMDB ids of every movie Radarr knows about
async fn get_library(State(state): State<Arc<AppState>>) -> ApiResult<BTreeSet<i64>> {
    Ok(ok(state.radarr.library_tmdb_ids().await?))
}

async fn get_library_status(State(state): State<Arc<AppState>>) -> ApiResult<MovieLibraryStatus> {
    Ok(ok(state.radarr.library_status().await?))
}

async fn get_profiles(State(state): State<Arc<AppState>>) -> ApiResult<Vec<QualityProfile>> {
    Ok(ok(state.radarr.quality_profiles().await?))
}

async fn get_root_folders(State(state): State<Arc<AppState>>) -> ApiResult<Vec<RootFolder>> {
    Ok(ok(state.radarr.root_folders().await?))
}

async fn add_movie(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AddMovieBody>, JsonRejection>,
) -> ApiResult<serde_json::Value> {
    let Json(body) = body?;
    let tmdb_id = required_id(body.tmdb_id, "tmdb_id")?;
    let quality_profile_id = required_id(body.quality_profile_id, "quality_profile_id")?;

    let created = state
        .radarr
        .add_movie(tmdb_id, quality_profile_id, body.root_folder.as_deref())
        .await?;
    Ok(ok(created))
}
