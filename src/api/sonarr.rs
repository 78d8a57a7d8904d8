use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::{ok, required_id, ApiError, ApiResult};
use crate::services::arr::{QualityProfile, RootFolder};
use crate::services::library::external_id;
use crate::services::sonarr::{SeriesLibraryStatus, SeriesRef};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/library", get(get_library))
        .route("/library/status", get(get_library_status))
        .route("/profiles", get(get_profiles))
        .route("/rootfolders", get(get_root_folders))
        .route("/add", post(add_series))
}

#[derive(Debug, Deserialize)]
pub struct AddSeriesBody {
    pub tvdb_id: Option<i64>,
    pub tmdb_id: Option<i64>,
    pub quality_profile_id: Option<i64>,
    pub root_folder: Option<String>,
}

impl AddSeriesBody {
    /// TVDB is Sonarr's native id, so it wins when both are given
    fn series_ref(&self) -> Result<SeriesRef, ApiError> {
        match (external_id(self.tvdb_id), external_id(self.tmdb_id)) {
            (Some(tvdb), _) => Ok(SeriesRef::Tvdb(tvdb)),
            (None, Some(tmdb)) => Ok(SeriesRef::Tmdb(tmdb)),
            (None, None) => Err(ApiError::Validation(
                "tvdb_id or tmdb_id required".to_string(),
            )),
        }
    }
}

/// TVDB ids of every series Sonarr knows about
async fn get_library(State(state): State<Arc<AppState>>) -> ApiResult<BTreeSet<i64>> {
    Ok(ok(state.sonarr.library_tvdb_ids().await?))
}

async fn get_library_status(
    State(state): State<Arc<AppState>>,
) -> ApiResult<SeriesLibraryStatus> {
    Ok(ok(state.sonarr.library_status().await?))
}

async fn get_profiles(State(state): State<Arc<AppState>>) -> ApiResult<Vec<QualityProfile>> {
    Ok(ok(state.sonarr.quality_profiles().await?))
}

async fn get_root_folders(State(state): State<Arc<AppState>>) -> ApiResult<Vec<RootFolder>> {
    Ok(ok(state.sonarr.root_folders().await?))
}

async fn add_series(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AddSeriesBody>, JsonRejection>,
) -> ApiResult<serde_json::Value> {
    let Json(body) = body?;
    let series = body.series_ref()?;
    let quality_profile_id = required_id(body.quality_profile_id, "quality_profile_id")?;

    let created = state
        .sonarr
        .add_series(series, quality_profile_id, body.root_folder.as_deref())
        .await?;
    Ok(ok(created))
}
