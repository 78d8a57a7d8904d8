// Shared plumbing for the *arr acquisition managers (Radarr, Sonarr)
// Both expose the same v3 API conventions: X-Api-Key auth, /queue, /qualityprofile, /rootfolder

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{check_status, ServiceError, ServiceResult};

/// Large enough that one page covers any realistic download queue
const QUEUE_PAGE_SIZE: u32 = 1000;

pub struct ArrClient {
    client: Client,
    service: &'static str,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFolder {
    pub id: i64,
    pub path: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QueuePage {
    pub records: Vec<QueueRecord>,
}

/// A queue record; Radarr sets `movieId`, Sonarr sets `seriesId`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueueRecord {
    pub movie_id: Option<i64>,
    pub series_id: Option<i64>,
    pub size: f64,
    pub sizeleft: f64,
}

/// Result of probing a manager's /system/status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArrClient {
    pub fn new(service: &'static str, base_url: &str, api_key: String, client: Client) -> Self {
        Self {
            client,
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}/api/v3{}", self.base_url, endpoint);
        tracing::debug!("{} request: {} {}", self.service, method, endpoint);
        self.client
            .request(method, url)
            .header("X-Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> ServiceResult<Response> {
        request.send().await.map_err(|source| ServiceError::Http {
            service: self.service,
            source,
        })
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> ServiceResult<T> {
        response.json().await.map_err(|source| ServiceError::Decode {
            service: self.service,
            source,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ServiceResult<T> {
        let response = self.send(self.request(reqwest::Method::GET, endpoint)).await?;
        let response = check_status(self.service, response).await?;
        self.decode(response).await
    }

    /// GET that maps a 404 to `None` instead of an error
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> ServiceResult<Option<T>> {
        let response = self.send(self.request(reqwest::Method::GET, endpoint)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(self.service, response).await?;
        self.decode(response).await.map(Some)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ServiceResult<T> {
        let request = self.request(reqwest::Method::POST, endpoint).json(body);
        let response = check_status(self.service, self.send(request).await?).await?;
        self.decode(response).await
    }

    pub async fn quality_profiles(&self) -> ServiceResult<Vec<QualityProfile>> {
        self.get("/qualityprofile").await
    }

    pub async fn root_folders(&self) -> ServiceResult<Vec<RootFolder>> {
        self.get("/rootfolder").await
    }

    pub async fn queue(&self) -> ServiceResult<Vec<QueueRecord>> {
        let page: QueuePage = self
            .get(&format!("/queue?pageSize={}", QUEUE_PAGE_SIZE))
            .await?;
        Ok(page.records)
    }

    pub async fn test_connection(&self) -> ConnectionStatus {
        match self.get::<serde_json::Value>("/system/status").await {
            Ok(_) => ConnectionStatus {
                success: true,
                error: None,
            },
            Err(e) => {
                tracing::warn!("{} connection test failed: {}", self.service, e);
                ConnectionStatus {
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use axum::{http::HeaderMap, http::StatusCode, routing::get, Json, Router};
    use std::time::Duration;

    fn client(base: &str) -> ArrClient {
        ArrClient::new(
            "Radarr",
            base,
            "key".to_string(),
            crate::services::http_client(Duration::from_secs(5)),
        )
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let c = client("http://localhost:7878/");
        assert_eq!(c.base_url(), "http://localhost:7878");
    }

    #[test]
    fn test_queue_record_fields() {
        let page: QueuePage = serde_json::from_str(
            r#"{"page": 1,
                "records": [{"movieId": 4, "size": 1000.0, "sizeleft": 250, "title": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].movie_id, Some(4));
        assert_eq!(page.records[0].series_id, None);
        assert_eq!(page.records[0].sizeleft, 250.0);
    }

    #[tokio::test]
    async fn test_connection_status() {
        let router = Router::new().route(
            "/api/v3/system/status",
            get(|headers: HeaderMap| async move {
                if headers.get("X-Api-Key").and_then(|v| v.to_str().ok()) == Some("key") {
                    Ok(Json(serde_json::json!({ "version": "5.0" })))
                } else {
                    Err(StatusCode::UNAUTHORIZED)
                }
            }),
        );
        let base = test_support::spawn(router).await;

        assert_eq!(
            client(&base).test_connection().await,
            ConnectionStatus {
                success: true,
                error: None
            }
        );

        let wrong_key = ArrClient::new(
            "Radarr",
            &base,
            "nope".to_string(),
            crate::services::http_client(Duration::from_secs(5)),
        );
        let status = wrong_key.test_connection().await;
        assert!(!status.success);
        assert!(status.error.unwrap_or_default().contains("401"));
    }

    #[tokio::test]
    async fn test_unreachable_manager_reports_error() {
        // Nothing listens on port 9 (discard) in the test environment
        let status = client("http://127.0.0.1:9").test_connection().await;
        assert!(!status.success);
        assert!(status.error.is_some());
    }

    #[tokio::test]
    async fn test_get_optional_maps_404() {
        let router = Router::new().route(
            "/api/v3/movie/lookup/tmdb",
            get(|| async { StatusCode::NOT_FOUND }),
        );
        let base = test_support::spawn(router).await;

        let found: Option<serde_json::Value> = client(&base)
            .get_optional("/movie/lookup/tmdb?tmdbId=1")
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
