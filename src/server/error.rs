//! HTTP error mapping.
//!
//! Every error leaves the service as `{"error": "<message>"}` with a
//! status code that tells the caller whether retrying can help.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::types::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Model not loaded")]
    ModelUnavailable,

    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    #[error("{}", .0.body_text())]
    MalformedBody(#[from] JsonRejection),

    #[error("Model reload failed: {0}")]
    ReloadFailed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ModelUnavailable | ApiError::ReloadFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MalformedBody(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::ModelUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::ReloadFailed("x".into()).status(), StatusCode::SERVICE_UNAVAILABLE);
        let invalid = ApiError::from(ValidationError::NotPositive { field: "liters", value: -1.0 });
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(invalid.to_string().contains("liters"));
    }

    #[test]
    fn test_into_response_status() {
        let resp = ApiError::ModelUnavailable.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
