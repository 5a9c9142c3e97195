//! Mapping of pipeline outcomes onto HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use deployer::{DeployError, ErrorKind, ResultStatus};
use serde::{Deserialize, Serialize};

/// JSON body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: ResultStatus,
    /// Stable error classification, e.g. `"validation_error"`.
    pub kind: String,
    pub message: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

/// A [`DeployError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub DeployError);

impl From<DeployError> for ApiError {
    fn from(error: DeployError) -> Self {
        Self(error)
    }
}

// Undecodable bodies are reported the same way as bodies with bad fields.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DeployError::validation(format!(
            "request body is not valid JSON: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match kind {
            ErrorKind::Validation | ErrorKind::Auth => {
                tracing::info!(kind = %kind, error = %self.0, "request rejected");
            }
            ErrorKind::Config | ErrorKind::GitHubApi => {
                tracing::error!(kind = %kind, error = %self.0, "request failed");
            }
        }

        let body = ErrorBody {
            status: ResultStatus::Error,
            kind: kind.as_str().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
