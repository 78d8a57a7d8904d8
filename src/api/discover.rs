// Discovery endpoints: merged trending lists and TMDB title search

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ok, ApiError, ApiResult};
use crate::models::MediaSummary;
use crate::services::merge::{merge, DEFAULT_LIMIT};
use crate::AppState;

/// Number of items requested from Trakt per list
const TRAKT_LIMIT: u32 = DEFAULT_LIMIT as u32;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(get_movies))
        .route("/shows", get(get_shows))
        .route("/search/movies", get(search_movies))
        .route("/search/shows", get(search_shows))
}

/// Which Trakt list is merged with the TMDB trending pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    #[default]
    Trending,
    Popular,
    New,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DiscoverQuery {
    pub feed: Feed,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub query: String,
}

async fn get_movies(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DiscoverQuery>, QueryRejection>,
) -> ApiResult<Vec<MediaSummary>> {
    let Query(query) = query?;

    let community = async {
        match query.feed {
            Feed::Trending => state.trakt.trending_movies(TRAKT_LIMIT).await,
            Feed::Popular => state.trakt.popular_movies(TRAKT_LIMIT).await,
            Feed::New => state.trakt.new_movies(TRAKT_LIMIT).await,
        }
    };

    let (page1, page2, community) = tokio::try_join!(
        state.tmdb.trending_movies(1),
        state.tmdb.trending_movies(2),
        community
    )?;

    tracing::debug!(
        "Merging {} TMDB and {} Trakt movies ({:?})",
        page1.len() + page2.len(),
        community.len(),
        query.feed
    );

    Ok(ok(merge(concat(page1, page2), community, DEFAULT_LIMIT)))
}

async fn get_shows(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DiscoverQuery>, QueryRejection>,
) -> ApiResult<Vec<MediaSummary>> {
    let Query(query) = query?;

    let community = async {
        match query.feed {
            Feed::Trending => state.trakt.trending_shows(TRAKT_LIMIT).await,
            Feed::Popular => state.trakt.popular_shows(TRAKT_LIMIT).await,
            Feed::New => state.trakt.new_shows(TRAKT_LIMIT).await,
        }
    };

    let (page1, page2, community) = tokio::try_join!(
        state.tmdb.trending_shows(1),
        state.tmdb.trending_shows(2),
        community
    )?;

    tracing::debug!(
        "Merging {} TMDB and {} Trakt shows ({:?})",
        page1.len() + page2.len(),
        community.len(),
        query.feed
    );

    Ok(ok(merge(concat(page1, page2), community, DEFAULT_LIMIT)))
}

fn concat(mut first: Vec<MediaSummary>, second: Vec<MediaSummary>) -> Vec<MediaSummary> {
    first.extend(second);
    first
}

fn search_term(query: Result<Query<SearchQuery>, QueryRejection>) -> Result<String, ApiError> {
    let Query(SearchQuery { query }) = query?;
    if query.trim().is_empty() {
        return Err(ApiError::Validation("Query parameter required".to_string()));
    }
    Ok(query)
}

async fn search_movies(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Vec<MediaSummary>> {
    let term = search_term(query)?;
    Ok(ok(state.tmdb.search_movies(&term, 1).await?))
}

async fn search_shows(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Vec<MediaSummary>> {
    let term = search_term(query)?;
    Ok(ok(state.tmdb.search_shows(&term, 1).await?))
}
