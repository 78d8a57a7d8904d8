// Radarr gateway - movie library, download queue and add-movie flow
// API Documentation: https://radarr.video/docs/api/

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::arr::{ArrClient, ConnectionStatus, QualityProfile, RootFolder};
use super::library::{external_id, reconcile, ManagedItem, PresenceMap, QueueItem};
use super::{ServiceError, ServiceResult};
use crate::config::ManagerConfig;

const SERVICE: &str = "Radarr";

pub struct RadarrClient {
    arr: ArrClient,
    root_folder: String,
}

/// A movie in the Radarr library
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadarrMovie {
    pub id: i64,
    pub tmdb_id: Option<i64>,
    pub title: Option<String>,
    pub has_file: bool,
}

impl ManagedItem for RadarrMovie {
    fn internal_id(&self) -> i64 {
        self.id
    }

    fn has_files(&self) -> bool {
        self.has_file
    }
}

/// Movie record returned by /movie/lookup/tmdb
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MovieLookup {
    pub tmdb_id: Option<i64>,
    pub title: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddMovieRequest {
    tmdb_id: i64,
    title: Option<String>,
    year: Option<i32>,
    quality_profile_id: i64,
    root_folder_path: String,
    monitored: bool,
    add_options: AddMovieOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddMovieOptions {
    search_for_movie: bool,
}

/// Reconciled movie library, keyed by TMDB id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieLibraryStatus {
    pub base_url: String,
    #[serde(flatten)]
    pub movies: PresenceMap,
}

impl RadarrClient {
    pub fn new(config: &ManagerConfig, client: Client) -> Self {
        Self {
            arr: ArrClient::new(SERVICE, &config.url, config.api_key.clone(), client),
            root_folder: config.root_folder.clone(),
        }
    }

    pub async fn list_library(&self) -> ServiceResult<Vec<RadarrMovie>> {
        self.arr.get("/movie").await
    }

    pub async fn list_queue(&self) -> ServiceResult<Vec<QueueItem>> {
        let records = self.arr.queue().await?;
        Ok(records
            .into_iter()
            .filter_map(|r| {
                r.movie_id.map(|parent_id| QueueItem {
                    parent_id,
                    size: r.size,
                    size_left: r.sizeleft,
                })
            })
            .collect())
    }

    pub async fn quality_profiles(&self) -> ServiceResult<Vec<QualityProfile>> {
        self.arr.quality_profiles().await
    }

    pub async fn root_folders(&self) -> ServiceResult<Vec<RootFolder>> {
        self.arr.root_folders().await
    }

    /// TMDB ids of every movie in the library
    pub async fn library_tmdb_ids(&self) -> ServiceResult<BTreeSet<i64>> {
        let movies = self.list_library().await?;
        Ok(movies.into_iter().filter_map(|m| external_id(m.tmdb_id)).collect())
    }

    pub async fn library_status(&self) -> ServiceResult<MovieLibraryStatus> {
        let (movies, queue) = tokio::try_join!(self.list_library(), self.list_queue())?;
        Ok(movie_status(self.arr.base_url(), &movies, &queue))
    }

    pub async fn lookup_movie(&self, tmdb_id: i64) -> ServiceResult<Option<MovieLookup>> {
        let movie: Option<MovieLookup> = self
            .arr
            .get_optional(&format!("/movie/lookup/tmdb?tmdbId={}", tmdb_id))
            .await?;
        Ok(movie.filter(|m| m.tmdb_id == Some(tmdb_id)))
    }

    /// Add a movie and start searching for it. The lookup must succeed first;
    /// nothing is written to Radarr otherwise.
    pub async fn add_movie(
        &self,
        tmdb_id: i64,
        quality_profile_id: i64,
        root_folder: Option<&str>,
    ) -> ServiceResult<serde_json::Value> {
        let movie = self.lookup_movie(tmdb_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Movie with TMDB ID {} not found", tmdb_id))
        })?;

        let request = AddMovieRequest {
            tmdb_id,
            title: movie.title,
            year: movie.year,
            quality_profile_id,
            root_folder_path: root_folder
                .filter(|r| !r.is_empty())
                .unwrap_or(self.root_folder.as_str())
                .to_string(),
            monitored: true,
            add_options: AddMovieOptions {
                search_for_movie: true,
            },
        };

        tracing::info!(
            "Adding movie {} (TMDB {}) to Radarr",
            request.title.as_deref().unwrap_or("Unknown"),
            tmdb_id
        );

        self.arr.post("/movie", &request).await
    }

    pub async fn test_connection(&self) -> ConnectionStatus {
        self.arr.test_connection().await
    }
}

/// Bucket every library movie by TMDB id. Movies without one are skipped.
pub fn movie_status(
    base_url: &str,
    movies: &[RadarrMovie],
    queue: &[QueueItem],
) -> MovieLibraryStatus {
    let mut status = MovieLibraryStatus {
        base_url: base_url.to_string(),
        movies: PresenceMap::default(),
    };

    for (movie, presence) in reconcile(movies, queue) {
        let Some(tmdb_id) = external_id(movie.tmdb_id) else {
            continue;
        };
        let url = format!("{}/movie/{}", base_url, movie.id);
        status.movies.insert(tmdb_id, presence, Some(url));
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::library::Presence;
    use crate::services::test_support;
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn movie(id: i64, tmdb_id: Option<i64>, has_file: bool) -> RadarrMovie {
        RadarrMovie {
            id,
            tmdb_id,
            title: None,
            has_file,
        }
    }

    #[test]
    fn test_movie_status_buckets() {
        let movies = vec![
            movie(1, Some(100), true),
            movie(2, Some(200), true),
            movie(3, Some(300), false),
            movie(4, None, false),
            movie(5, Some(0), true),
        ];
        let queue = vec![QueueItem {
            parent_id: 2,
            size: 1000.0,
            size_left: 100.0,
        }];

        let status = movie_status("http://radarr:7878", &movies, &queue);
        assert_eq!(status.movies.len(), 3);
        assert_eq!(status.movies.presence_of(100), Some(Presence::Downloaded));
        assert_eq!(status.movies.presence_of(200), Some(Presence::Downloading(90)));
        assert_eq!(status.movies.presence_of(300), Some(Presence::Missing));
        assert_eq!(
            status.movies.downloaded[&100].url.as_deref(),
            Some("http://radarr:7878/movie/1")
        );
        assert_eq!(
            status.movies.downloading[&200].url.as_deref(),
            Some("http://radarr:7878/movie/2")
        );
    }

    #[test]
    fn test_movie_status_serialization() {
        let movies = vec![movie(10, Some(555), false)];
        let queue = vec![QueueItem {
            parent_id: 10,
            size: 200.0,
            size_left: 50.0,
        }];

        let json = serde_json::to_value(movie_status("http://r", &movies, &queue)).unwrap();
        assert_eq!(json["base_url"], "http://r");
        assert_eq!(json["downloading"]["555"]["progress"], 75);
        assert!(json["downloaded"].as_object().unwrap().is_empty());
        assert!(json["missing"].as_object().unwrap().is_empty());
    }

    #[derive(Default)]
    struct FakeRadarr {
        posted: Mutex<Vec<serde_json::Value>>,
    }

    fn fake_radarr(state: Arc<FakeRadarr>) -> Router {
        Router::new()
            .route(
                "/api/v3/movie",
                get(|| async {
                    Json(serde_json::json!([
                        { "id": 1, "tmdbId": 603, "title": "The Matrix", "hasFile": true },
                        { "id": 2, "tmdbId": 604, "title": "The Matrix Reloaded",
                          "hasFile": false },
                        { "id": 3, "title": "Unmatched", "hasFile": false }
                    ]))
                })
                .post(
                    |State(state): State<Arc<FakeRadarr>>,
                     Json(body): Json<serde_json::Value>| async move {
                        state.posted.lock().unwrap().push(body.clone());
                        let created = serde_json::json!({ "id": 99, "tmdbId": body["tmdbId"] });
                        (StatusCode::CREATED, Json(created))
                    },
                ),
            )
            .route(
                "/api/v3/queue",
                get(|| async {
                    Json(serde_json::json!({
                        "records": [
                            { "movieId": 2, "size": 400.0, "sizeleft": 100.0 },
                            { "movieId": 42, "size": 400.0, "sizeleft": 0.0 }
                        ]
                    }))
                }),
            )
            .route(
                "/api/v3/movie/lookup/tmdb",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    match params.get("tmdbId").map(String::as_str) {
                        Some("27205") => Ok(Json(serde_json::json!({
                            "tmdbId": 27205, "title": "Inception", "year": 2010
                        }))),
                        _ => Err(StatusCode::NOT_FOUND),
                    }
                }),
            )
            .with_state(state)
    }

    fn client(base: &str) -> RadarrClient {
        let config = ManagerConfig {
            url: base.to_string(),
            api_key: "key".to_string(),
            root_folder: "/movies".to_string(),
        };
        RadarrClient::new(&config, crate::services::http_client(Duration::from_secs(5)))
    }

    #[tokio::test]
    async fn test_library_status_against_fake() {
        let base = test_support::spawn(fake_radarr(Arc::default())).await;
        let radarr = client(&base);

        let ids = radarr.library_tmdb_ids().await.unwrap();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![603, 604]);

        let status = radarr.library_status().await.unwrap();
        assert_eq!(status.movies.presence_of(603), Some(Presence::Downloaded));
        assert_eq!(status.movies.presence_of(604), Some(Presence::Downloading(75)));
    }

    #[tokio::test]
    async fn test_add_movie_posts_after_lookup() {
        let state = Arc::new(FakeRadarr::default());
        let base = test_support::spawn(fake_radarr(state.clone())).await;

        let created = client(&base).add_movie(27205, 4, None).await.unwrap();
        assert_eq!(created["id"], 99);

        let posted = state.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0]["tmdbId"], 27205);
        assert_eq!(posted[0]["title"], "Inception");
        assert_eq!(posted[0]["qualityProfileId"], 4);
        assert_eq!(posted[0]["rootFolderPath"], "/movies");
        assert_eq!(posted[0]["monitored"], true);
        assert_eq!(posted[0]["addOptions"]["searchForMovie"], true);
    }

    #[tokio::test]
    async fn test_add_movie_not_found_makes_no_write() {
        let state = Arc::new(FakeRadarr::default());
        let base = test_support::spawn(fake_radarr(state.clone())).await;

        let err = client(&base).add_movie(1, 4, Some("/other")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(state.posted.lock().unwrap().is_empty());
    }
}
