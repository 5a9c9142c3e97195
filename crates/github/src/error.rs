//! GitHub adapter error types.

use deployer::HostingError;
use thiserror::Error;

use crate::types::ApiErrorBody;

/// Errors raised while constructing a [`crate::GitHubClient`].
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),
}

/// Maps a transport-level `reqwest` failure to a [`HostingError`].
pub(crate) fn transport_error(error: reqwest::Error) -> HostingError {
    let message = if error.is_timeout() {
        format!("request timed out: {error}")
    } else if error.is_connect() {
        format!("could not connect: {error}")
    } else {
        error.to_string()
    };
    HostingError::Transport { message }
}

/// Extracts GitHub's `message` field from an error body, falling back to the
/// raw body when it is not the usual JSON shape.
pub fn short_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.trim().to_string(),
    }
}
