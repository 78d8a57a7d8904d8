// Sonarr gateway - series library, download queue and add-series flow
// API Documentation: https://sonarr.tv/docs/api/
//
// Sonarr series carry two external ids (TVDB and TMDB) and either may be
// missing, so the reconciled library is reported once per id scheme.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::arr::{ArrClient, ConnectionStatus, QualityProfile, RootFolder};
use super::library::{external_id, reconcile, ManagedItem, PresenceMap, QueueItem};
use super::{ServiceError, ServiceResult};
use crate::config::ManagerConfig;

const SERVICE: &str = "Sonarr";

pub struct SonarrClient {
    arr: ArrClient,
    root_folder: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesStatistics {
    pub episode_file_count: i64,
}

/// A series in the Sonarr library
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SonarrSeries {
    pub id: i64,
    pub tvdb_id: Option<i64>,
    pub tmdb_id: Option<i64>,
    pub title: Option<String>,
    pub title_slug: Option<String>,
    pub statistics: SeriesStatistics,
}

impl ManagedItem for SonarrSeries {
    fn internal_id(&self) -> i64 {
        self.id
    }

    fn has_files(&self) -> bool {
        self.statistics.episode_file_count > 0
    }
}

/// Series record returned by /series/lookup
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesLookup {
    pub tvdb_id: Option<i64>,
    pub tmdb_id: Option<i64>,
    pub title: Option<String>,
    pub year: Option<i32>,
}

/// Which external id a series is looked up by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesRef {
    Tvdb(i64),
    Tmdb(i64),
}

impl SeriesRef {
    fn lookup_term(&self) -> String {
        match self {
            SeriesRef::Tvdb(id) => format!("tvdb:{}", id),
            SeriesRef::Tmdb(id) => format!("tmdb:{}", id),
        }
    }

    /// A record that reports the requested id must report the same value
    fn matches(&self, series: &SeriesLookup) -> bool {
        let (wanted, reported) = match self {
            SeriesRef::Tvdb(id) => (*id, external_id(series.tvdb_id)),
            SeriesRef::Tmdb(id) => (*id, external_id(series.tmdb_id)),
        };
        reported.map_or(true, |reported| reported == wanted)
    }
}

impl std::fmt::Display for SeriesRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesRef::Tvdb(id) => write!(f, "TVDB ID {}", id),
            SeriesRef::Tmdb(id) => write!(f, "TMDB ID {}", id),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddSeriesRequest {
    tvdb_id: i64,
    title: Option<String>,
    year: Option<i32>,
    quality_profile_id: i64,
    root_folder_path: String,
    monitored: bool,
    season_folder: bool,
    add_options: AddSeriesOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddSeriesOptions {
    search_for_missing_episodes: bool,
}

/// Reconciled series library, one presence map per external id scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesLibraryStatus {
    pub base_url: String,
    pub tvdb: PresenceMap,
    pub tmdb: PresenceMap,
}

impl SonarrClient {
    pub fn new(config: &ManagerConfig, client: Client) -> Self {
        Self {
            arr: ArrClient::new(SERVICE, &config.url, config.api_key.clone(), client),
            root_folder: config.root_folder.clone(),
        }
    }

    pub async fn list_library(&self) -> ServiceResult<Vec<SonarrSeries>> {
        self.arr.get("/series").await
    }

    pub async fn list_queue(&self) -> ServiceResult<Vec<QueueItem>> {
        let records = self.arr.queue().await?;
        Ok(records
            .into_iter()
            .filter_map(|r| {
                r.series_id.map(|parent_id| QueueItem {
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

    /// TVDB ids of every series in the library
    pub async fn library_tvdb_ids(&self) -> ServiceResult<BTreeSet<i64>> {
        let series = self.list_library().await?;
        Ok(series.into_iter().filter_map(|s| external_id(s.tvdb_id)).collect())
    }

    pub async fn library_status(&self) -> ServiceResult<SeriesLibraryStatus> {
        let (series, queue) = tokio::try_join!(self.list_library(), self.list_queue())?;
        Ok(series_status(self.arr.base_url(), &series, &queue))
    }

    pub async fn lookup_series(&self, series: SeriesRef) -> ServiceResult<Option<SeriesLookup>> {
        let results: Vec<SeriesLookup> = self
            .arr
            .get(&format!(
                "/series/lookup?term={}",
                urlencoding::encode(&series.lookup_term())
            ))
            .await?;

        let found = results.into_iter().next();
        if let Some(ref record) = found {
            if !series.matches(record) {
                tracing::warn!(
                    "Sonarr lookup for {} returned a different series ({:?})",
                    series,
                    record.title
                );
                return Ok(None);
            }
        }
        Ok(found)
    }

    /// Add a series and search for missing episodes. The lookup must succeed
    /// first; nothing is written to Sonarr otherwise.
    pub async fn add_series(
        &self,
        series: SeriesRef,
        quality_profile_id: i64,
        root_folder: Option<&str>,
    ) -> ServiceResult<serde_json::Value> {
        let found = self
            .lookup_series(series)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Series with {} not found", series)))?;

        let tvdb_id = external_id(found.tvdb_id).ok_or_else(|| {
            ServiceError::NotFound(format!("Series with {} has no TVDB ID", series))
        })?;

        let request = AddSeriesRequest {
            tvdb_id,
            title: found.title,
            year: found.year,
            quality_profile_id,
            root_folder_path: root_folder
                .filter(|r| !r.is_empty())
                .unwrap_or(self.root_folder.as_str())
                .to_string(),
            monitored: true,
            season_folder: true,
            add_options: AddSeriesOptions {
                search_for_missing_episodes: true,
            },
        };

        tracing::info!(
            "Adding series {} (TVDB {}) to Sonarr",
            request.title.as_deref().unwrap_or("Unknown"),
            tvdb_id
        );

        self.arr.post("/series", &request).await
    }

    pub async fn test_connection(&self) -> ConnectionStatus {
        self.arr.test_connection().await
    }
}

/// Bucket every series under each external id it has
pub fn series_status(
    base_url: &str,
    series: &[SonarrSeries],
    queue: &[QueueItem],
) -> SeriesLibraryStatus {
    let mut status = SeriesLibraryStatus {
        base_url: base_url.to_string(),
        tvdb: PresenceMap::default(),
        tmdb: PresenceMap::default(),
    };

    for (show, presence) in reconcile(series, queue) {
        let url = show
            .title_slug
            .as_deref()
            .filter(|slug| !slug.is_empty())
            .map(|slug| format!("{}/series/{}", base_url, slug));

        if let Some(tvdb_id) = external_id(show.tvdb_id) {
            status.tvdb.insert(tvdb_id, presence, url.clone());
        }
        if let Some(tmdb_id) = external_id(show.tmdb_id) {
            status.tmdb.insert(tmdb_id, presence, url);
        }
    }

    status
}
