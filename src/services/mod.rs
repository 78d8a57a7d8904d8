// Services module - upstream clients and the merge/reconciliation logic

use reqwest::{Client, Response};
use std::time::Duration;
use thiserror::Error;

// Discovery sources
pub mod ids;
pub mod merge;
pub mod tmdb;
pub mod trakt;

// Acquisition managers
pub mod arr;
pub mod library;
pub mod radarr;
pub mod sonarr;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{service} response could not be parsed: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{0}")]
    NotFound(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// HTTP client shared by every upstream service, with the request timeout applied
pub fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Turn a non-2xx response into `ServiceError::Status`, keeping the upstream body
pub(crate) async fn check_status(
    service: &'static str,
    response: Response,
) -> ServiceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!("{} request failed: {} - {}", service, status, body);
    Err(ServiceError::Status {
        service,
        status,
        body,
    })
}
