use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::DetectError;

impl DetectError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DetectError::ConfigurationMissing => StatusCode::INTERNAL_SERVER_ERROR,
            DetectError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            DetectError::UpstreamPayloadInvalid(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DetectError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(target: "http", status = status.as_u16(), error = %self, "detect request failed");
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
