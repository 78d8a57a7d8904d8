use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::services::ServiceError;
use crate::AppState;

mod discover;
mod radarr;
mod sonarr;
mod system;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(discover::routes())
        .nest("/radarr", radarr::routes())
        .nest("/sonarr", sonarr::routes())
        .merge(system::routes())
}

/// Success envelope: `{"success": true, "data": ...}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!("rejected request: {self}");
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Ids and profile numbers must be present and positive
pub(crate) fn required_id(value: Option<i64>, field: &str) -> Result<i64, ApiError> {
    value
        .filter(|&v| v > 0)
        .ok_or_else(|| ApiError::Validation(format!("{} required", field)))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_id() {
        assert_eq!(required_id(Some(5), "tmdb_id").unwrap(), 5);
        assert!(matches!(
            required_id(Some(0), "tmdb_id"),
            Err(ApiError::Validation(msg)) if msg == "tmdb_id required"
        ));
        assert!(required_id(None, "quality_profile_id").is_err());
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let response = ApiError::Validation("Query parameter required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Query parameter required");

        let response =
            ApiError::Service(ServiceError::NotFound("Series not found".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
