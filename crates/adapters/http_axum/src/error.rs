//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use minionhub_domain::error::MinionHubError;

/// JSON error body returned by API endpoints.
///
/// `response_code` carries the stable numeric code when the failure has one.
#[derive(Serialize)]
struct ErrorBody {
    response_code: Option<u16>,
    message: String,
}

/// Maps [`MinionHubError`] to an HTTP response with appropriate status code.
pub struct ApiError(MinionHubError);

impl From<MinionHubError> for ApiError {
    fn from(err: MinionHubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            MinionHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            MinionHubError::TypeMismatch(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            MinionHubError::Admission(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            MinionHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            MinionHubError::Driver(err) => {
                tracing::warn!(error = %err, "device driver error");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            MinionHubError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            MinionHubError::Discovery(err) => {
                tracing::error!(error = %err, "network discovery error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = ErrorBody {
            response_code: self.0.code().map(|code| code.as_u16()),
            message,
        };
        (status, Json(body)).into_response()
    }
}
