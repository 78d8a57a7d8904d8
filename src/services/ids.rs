// Cross-reference identifiers between TMDB, Trakt, TVDB and IMDb

use serde::{Deserialize, Serialize};

/// The `ids` object Trakt attaches to every movie and show
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TraktIds {
    pub trakt: Option<i64>,
    pub slug: Option<String>,
    pub tmdb: Option<i64>,
    pub tvdb: Option<i64>,
    pub imdb: Option<String>,
}

/// Canonical identifier record carried by every media summary.
///
/// `tmdb` is the only id both discovery services share, so it is the merge key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaIds {
    #[serde(rename = "tmdb_id")]
    pub tmdb: Option<i64>,
    #[serde(rename = "trakt_id", skip_serializing_if = "Option::is_none")]
    pub trakt: Option<i64>,
    #[serde(rename = "tvdb_id", skip_serializing_if = "Option::is_none")]
    pub tvdb: Option<i64>,
    #[serde(rename = "imdb_id", skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
}

impl MediaIds {
    /// Ids for a record that came straight from TMDB. A missing or
    /// non-positive id leaves the record without a catalog id.
    pub fn catalog(tmdb_id: Option<i64>) -> Self {
        Self {
            tmdb: tmdb_id.filter(|&id| id > 0),
            ..Default::default()
        }
    }

    /// Ids for a Trakt movie (Trakt's tvdb id is meaningless for movies)
    pub fn from_trakt_movie(ids: &TraktIds) -> Self {
        Self {
            tmdb: ids.tmdb,
            trakt: ids.trakt,
            tvdb: None,
            imdb: ids.imdb.clone().filter(|i| !i.is_empty()),
        }
    }

    pub fn from_trakt_show(ids: &TraktIds) -> Self {
        Self {
            tvdb: ids.tvdb,
            ..Self::from_trakt_movie(ids)
        }
    }
}
