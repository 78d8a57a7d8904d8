// Trakt community client - trending, popular and newly released titles
// API Documentation: https://trakt.docs.apiary.io/
//
// Trakt returns the same movie/show record in three envelopes: wrapped with a
// watcher count (trending), bare (popular) and wrapped with an air date
// (calendars). Each envelope gets its own formatter.

use std::collections::HashSet;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::ids::{MediaIds, TraktIds};
use super::{check_status, ServiceError, ServiceResult};
use crate::models::{round_rating, title_or_unknown, MediaSummary, MediaType};

const SERVICE: &str = "Trakt";
const TRAKT_API_BASE: &str = "https://api.trakt.tv";
const TRAKT_API_VERSION: &str = "2";
const CALENDAR_DAYS: u32 = 30;

/// Trakt API client
pub struct TraktClient {
    client: Client,
    client_id: String,
    base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TraktMovie {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub ids: TraktIds,
    pub overview: Option<String>,
    pub rating: Option<f64>,
    pub released: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TraktShow {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub ids: TraktIds,
    pub overview: Option<String>,
    pub rating: Option<f64>,
    pub first_aired: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrendingMovie {
    pub watchers: Option<i64>,
    pub movie: TraktMovie,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrendingShow {
    pub watchers: Option<i64>,
    pub show: TraktShow,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalendarMovie {
    pub released: Option<String>,
    pub movie: TraktMovie,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalendarShow {
    pub first_aired: Option<String>,
    pub show: TraktShow,
}

impl TraktClient {
    pub fn new(client_id: String, client: Client) -> Self {
        Self {
            client,
            client_id,
            base_url: TRAKT_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, limit: u32) -> ServiceResult<T> {
        let url = format!(
            "{}{}?limit={}&extended=full",
            self.base_url, endpoint, limit
        );

        tracing::debug!("Trakt request: {} (limit {})", endpoint, limit);

        let response = self
            .client
            .get(&url)
            .header("Content-Type", "application/json")
            .header("trakt-api-version", TRAKT_API_VERSION)
            .header("trakt-api-key", &self.client_id)
            .send()
            .await
            .map_err(|source| ServiceError::Http {
                service: SERVICE,
                source,
            })?;

        check_status(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|source| ServiceError::Decode {
                service: SERVICE,
                source,
            })
    }

    pub async fn trending_movies(&self, limit: u32) -> ServiceResult<Vec<MediaSummary>> {
        let data: Vec<TrendingMovie> = self.get("/movies/trending", limit).await?;
        Ok(data.into_iter().map(format_trending_movie).collect())
    }

    pub async fn popular_movies(&self, limit: u32) -> ServiceResult<Vec<MediaSummary>> {
        let data: Vec<TraktMovie> = self.get("/movies/popular", limit).await?;
        Ok(data.into_iter().map(format_movie).collect())
    }

    /// Movies released over the next month
    pub async fn new_movies(&self, limit: u32) -> ServiceResult<Vec<MediaSummary>> {
        let endpoint = format!("/calendars/all/movies/{}/{}", today(), CALENDAR_DAYS);
        let data: Vec<CalendarMovie> = self.get(&endpoint, limit).await?;
        Ok(data.into_iter().map(format_calendar_movie).collect())
    }

    pub async fn trending_shows(&self, limit: u32) -> ServiceResult<Vec<MediaSummary>> {
        let data: Vec<TrendingShow> = self.get("/shows/trending", limit).await?;
        Ok(data.into_iter().map(format_trending_show).collect())
    }

    pub async fn popular_shows(&self, limit: u32) -> ServiceResult<Vec<MediaSummary>> {
        let data: Vec<TraktShow> = self.get("/shows/popular", limit).await?;
        Ok(data.into_iter().map(format_show).collect())
    }

    /// Series premieres over the next month
    pub async fn new_shows(&self, limit: u32) -> ServiceResult<Vec<MediaSummary>> {
        let endpoint = format!("/calendars/all/shows/new/{}/{}", today(), CALENDAR_DAYS);
        let data: Vec<CalendarShow> = self.get(&endpoint, limit).await?;
        Ok(format_calendar_shows(data))
    }
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn year_string(year: Option<i32>) -> Option<String> {
    year.map(|y| y.to_string())
}

pub fn format_movie(movie: TraktMovie) -> MediaSummary {
    MediaSummary {
        ids: MediaIds::from_trakt_movie(&movie.ids),
        title: title_or_unknown(movie.title),
        year: year_string(movie.year),
        overview: movie.overview.unwrap_or_default(),
        poster: None,
        rating: round_rating(movie.rating),
        release_date: movie.released,
        first_air_date: None,
        media_type: MediaType::Movie,
        watchers: None,
    }
}

pub fn format_show(show: TraktShow) -> MediaSummary {
    MediaSummary {
        ids: MediaIds::from_trakt_show(&show.ids),
        title: title_or_unknown(show.title),
        year: year_string(show.year),
        overview: show.overview.unwrap_or_default(),
        poster: None,
        rating: round_rating(show.rating),
        release_date: None,
        first_air_date: show.first_aired,
        media_type: MediaType::Tv,
        watchers: None,
    }
}

pub fn format_trending_movie(item: TrendingMovie) -> MediaSummary {
    MediaSummary {
        watchers: Some(item.watchers.unwrap_or(0)),
        ..format_movie(item.movie)
    }
}

pub fn format_trending_show(item: TrendingShow) -> MediaSummary {
    MediaSummary {
        watchers: Some(item.watchers.unwrap_or(0)),
        ..format_show(item.show)
    }
}

/// Calendar entries carry the release date on the wrapper, not the movie
pub fn format_calendar_movie(item: CalendarMovie) -> MediaSummary {
    MediaSummary {
        release_date: item.released,
        ..format_movie(item.movie)
    }
}

pub fn format_calendar_show(item: CalendarShow) -> MediaSummary {
    MediaSummary {
        first_air_date: item.first_aired,
        ..format_show(item.show)
    }
}

/// The premieres calendar lists one entry per episode, so keep the first per show.
/// Shows without a TMDB id cannot be matched and are all kept.
pub fn format_calendar_shows(items: Vec<CalendarShow>) -> Vec<MediaSummary> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| item.show.ids.tmdb.map_or(true, |id| seen.insert(id)))
        .map(format_calendar_show)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use axum::{http::HeaderMap, routing::get, Json, Router};
    use std::time::Duration;

    #[test]
    fn test_format_trending_movie() {
        let item: TrendingMovie = serde_json::from_str(
            r#"{
                "watchers": 21,
                "movie": {
                    "title": "Oppenheimer",
                    "year": 2023,
                    "ids": {"trakt": 548217, "slug": "oppenheimer-2023",
                            "imdb": "tt15398776", "tmdb": 872585},
                    "overview": "The story of J. Robert Oppenheimer.",
                    "rating": 8.04512,
                    "released": "2023-07-21"
                }
            }"#,
        )
        .unwrap();

        let summary = format_trending_movie(item);
        assert_eq!(summary.catalog_id(), Some(872585));
        assert_eq!(summary.ids.trakt, Some(548217));
        assert_eq!(summary.ids.imdb.as_deref(), Some("tt15398776"));
        assert_eq!(summary.year.as_deref(), Some("2023"));
        assert_eq!(summary.rating, 8.0);
        assert_eq!(summary.release_date.as_deref(), Some("2023-07-21"));
        assert_eq!(summary.watchers, Some(21));
        assert_eq!(summary.poster, None);
    }

    #[test]
    fn test_format_trending_show_without_watchers() {
        let item: TrendingShow = serde_json::from_str(
            r#"{"show": {"title": "Severance",
                         "ids": {"trakt": 1, "tmdb": 95396, "tvdb": 371980}}}"#,
        )
        .unwrap();

        let summary = format_trending_show(item);
        assert_eq!(summary.ids.tvdb, Some(371980));
        assert_eq!(summary.watchers, Some(0));
        assert_eq!(summary.year, None);
        assert_eq!(summary.media_type, MediaType::Tv);
    }

    #[test]
    fn test_format_popular_has_no_watchers() {
        let movie: TraktMovie =
            serde_json::from_str(r#"{"title": null, "ids": {"trakt": 3}}"#).unwrap();

        let summary = format_movie(movie);
        assert_eq!(summary.title, "Unknown");
        assert_eq!(summary.catalog_id(), None);
        assert_eq!(summary.watchers, None);
        assert_eq!(summary.rating, 0.0);
    }

    #[test]
    fn test_calendar_movie_uses_wrapper_date() {
        let item: CalendarMovie = serde_json::from_str(
            r#"{"released": "2024-05-01",
                "movie": {"title": "X", "released": "2023-01-01", "ids": {"tmdb": 9}}}"#,
        )
        .unwrap();

        let summary = format_calendar_movie(item);
        assert_eq!(summary.release_date.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn test_calendar_shows_dedup_by_tmdb() {
        let items: Vec<CalendarShow> = serde_json::from_str(
            r#"[
                {"first_aired": "2024-05-01T01:00:00.000Z",
                 "show": {"title": "A", "ids": {"tmdb": 1}}},
                {"first_aired": "2024-05-02T01:00:00.000Z",
                 "show": {"title": "A", "ids": {"tmdb": 1}}},
                {"first_aired": "2024-05-03T01:00:00.000Z",
                 "show": {"title": "B", "ids": {"tmdb": 2}}}
            ]"#,
        )
        .unwrap();

        let shows = format_calendar_shows(items);
        assert_eq!(shows.len(), 2);
        assert_eq!(shows[0].first_air_date.as_deref(), Some("2024-05-01T01:00:00.000Z"));
        assert_eq!(shows[1].title, "B");
    }

    #[tokio::test]
    async fn test_trending_sends_api_headers() {
        let router = Router::new().route(
            "/movies/trending",
            get(|headers: HeaderMap| async move {
                let key = headers
                    .get("trakt-api-key")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let version = headers
                    .get("trakt-api-version")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let title = format!("{key}/{version}");
                Json(serde_json::json!([
                    { "watchers": 3, "movie": { "title": title, "ids": { "tmdb": 1 } } }
                ]))
            }),
        );
        let base = test_support::spawn(router).await;

        let client = TraktClient::new(
            "client-id".to_string(),
            crate::services::http_client(Duration::from_secs(5)),
        )
        .with_base_url(base);

        let movies = client.trending_movies(50).await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "client-id/2");
        assert_eq!(movies[0].watchers, Some(3));
    }
}
