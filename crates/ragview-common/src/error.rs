use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagviewError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("GraphML parse error: {0}")]
    GraphMl(String),

    #[error("Query engine error: {0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RagviewError>;

/// Error type returned by JSON API handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
}

impl From<RagviewError> for ApiError {
    fn from(e: RagviewError) -> Self {
        let status = match &e {
            RagviewError::NotFound(_) => StatusCode::NOT_FOUND,
            RagviewError::Config(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(%status, error = %e, "API request failed");
        Self { status, message: e.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let api: ApiError = RagviewError::NotFound("graph".into()).into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.message, "Not found: graph");
    }

    #[test]
    fn test_config_error_maps_to_400() {
        let api: ApiError = RagviewError::Config("community_level".into()).into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_graphml_error_maps_to_500() {
        let api: ApiError = RagviewError::GraphMl("bad tag".into()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
