// TMDB discovery client
// API Documentation: https://developer.themoviedb.org/reference/intro/getting-started

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::ids::MediaIds;
use super::{check_status, ServiceError, ServiceResult};
use crate::models::{round_rating, title_or_unknown, year_from_date, MediaSummary, MediaType};

const SERVICE: &str = "TMDB";
const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";
const TMDB_POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// TMDB API client
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Paged list response (trending, search)
#[derive(Debug, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbMovie {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbShow {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
}

impl TmdbClient {
    pub fn new(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: TMDB_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &str) -> ServiceResult<T> {
        let url = format!(
            "{}{}?api_key={}{}",
            self.base_url,
            endpoint,
            urlencoding::encode(&self.api_key),
            query
        );

        tracing::debug!("TMDB request: {}{}", endpoint, query);

        let response = self
            .client
            .get(&url)
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

    /// Trending movies for the week
    pub async fn trending_movies(&self, page: u32) -> ServiceResult<Vec<MediaSummary>> {
        let data: TmdbPage<TmdbMovie> = self
            .get("/trending/movie/week", &format!("&page={}", page))
            .await?;
        Ok(data.results.into_iter().map(format_movie).collect())
    }

    /// Trending TV shows for the week
    pub async fn trending_shows(&self, page: u32) -> ServiceResult<Vec<MediaSummary>> {
        let data: TmdbPage<TmdbShow> = self
            .get("/trending/tv/week", &format!("&page={}", page))
            .await?;
        Ok(data.results.into_iter().map(format_show).collect())
    }

    /// Search for movies by title
    pub async fn search_movies(&self, query: &str, page: u32) -> ServiceResult<Vec<MediaSummary>> {
        let data: TmdbPage<TmdbMovie> = self
            .get(
                "/search/movie",
                &format!("&query={}&page={}", urlencoding::encode(query), page),
            )
            .await?;
        Ok(data.results.into_iter().map(format_movie).collect())
    }

    /// Search for TV shows by title
    pub async fn search_shows(&self, query: &str, page: u32) -> ServiceResult<Vec<MediaSummary>> {
        let data: TmdbPage<TmdbShow> = self
            .get(
                "/search/tv",
                &format!("&query={}&page={}", urlencoding::encode(query), page),
            )
            .await?;
        Ok(data.results.into_iter().map(format_show).collect())
    }
}

fn poster_url(poster_path: Option<String>) -> Option<String> {
    poster_path
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", TMDB_POSTER_BASE, p))
}

pub fn format_movie(movie: TmdbMovie) -> MediaSummary {
    MediaSummary {
        ids: MediaIds::catalog(movie.id),
        title: title_or_unknown(movie.title),
        year: year_from_date(movie.release_date.as_deref()),
        overview: movie.overview.unwrap_or_default(),
        poster: poster_url(movie.poster_path),
        rating: round_rating(movie.vote_average),
        release_date: movie.release_date,
        first_air_date: None,
        media_type: MediaType::Movie,
        watchers: None,
    }
}

pub fn format_show(show: TmdbShow) -> MediaSummary {
    MediaSummary {
        ids: MediaIds::catalog(show.id),
        title: title_or_unknown(show.name),
        year: year_from_date(show.first_air_date.as_deref()),
        overview: show.overview.unwrap_or_default(),
        poster: poster_url(show.poster_path),
        rating: round_rating(show.vote_average),
        release_date: None,
        first_air_date: show.first_air_date,
        media_type: MediaType::Tv,
        watchers: None,
    }
}
