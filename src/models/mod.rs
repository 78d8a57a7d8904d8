use serde::{Deserialize, Serialize};

use crate::services::ids::MediaIds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

/// A movie or show as the frontend sees it, regardless of which discovery
/// service it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaSummary {
    #[serde(flatten)]
    pub ids: MediaIds,
    pub title: String,
    pub year: Option<String>,
    pub overview: String,
    pub poster: Option<String>,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    pub media_type: MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watchers: Option<i64>,
}

impl MediaSummary {
    /// Key used when merging lists from different sources
    pub fn catalog_id(&self) -> Option<i64> {
        self.ids.tmdb
    }
}

/// Title fallback shared by all formatters
pub fn title_or_unknown(title: Option<String>) -> String {
    title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Round a rating to one decimal place, treating a missing rating as 0
pub fn round_rating(rating: Option<f64>) -> f64 {
    (rating.unwrap_or(0.0) * 10.0).round() / 10.0
}

/// Year from an ISO date ("2024-03-01" -> "2024"), absent for missing or empty dates
pub fn year_from_date(date: Option<&str>) -> Option<String> {
    date.filter(|d| !d.is_empty())
        .map(|d| d.chars().take(4).collect())
}
