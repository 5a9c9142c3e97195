//! Top-level error taxonomy for the deployment pipeline.
//!
//! [`DeployError`] covers every condition that stops a request. Port-level
//! failures (e.g. [`crate::hosting::HostingError`]) are defined beside the
//! port and converted into a [`DeployError`] at the pipeline boundary.
//!
//! Each variant maps to exactly one HTTP status code and one stable `kind`
//! string; the HTTP layer never inspects messages to decide how to respond.

use thiserror::Error;

use crate::hosting::HostingError;

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Stable, machine-readable classification of a [`DeployError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// The supplied secret did not match.
    Auth,
    /// Required configuration (token or secret) is missing.
    Config,
    /// GitHub returned a non-2xx status, or the call failed in transit.
    GitHubApi,
}

impl ErrorKind {
    /// Returns the `kind` string reported in error response bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Auth => "auth_error",
            ErrorKind::Config => "config_error",
            ErrorKind::GitHubApi => "github_api_error",
        }
    }

    /// Returns the HTTP status code a failure of this kind is reported with.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Auth => 401,
            ErrorKind::Config | ErrorKind::GitHubApi => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that stop a build or revision request.
///
/// No variant triggers a retry or a rollback. If a later step fails after the
/// repository was created, the repository stays on GitHub.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The request body is malformed or a field breaks its rules.
    #[error("Validation failed: {message}")]
    Validation {
        /// Description of the offending field.
        message: String,
    },

    /// The supplied secret does not match the configured value.
    #[error("Invalid email or secret")]
    Auth,

    /// A required configuration value is absent.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the missing value.
        message: String,
    },

    /// A GitHub API call failed.
    ///
    /// `status` is `None` when no response was received (connect failure,
    /// timeout). `body` carries the upstream response body for diagnosis.
    #[error("GitHub API error during {operation}: {}", describe_upstream(.status, .body))]
    GitHubApi {
        /// The pipeline step that made the failing call.
        operation: &'static str,
        /// Upstream HTTP status, if a response arrived.
        status: Option<u16>,
        /// Upstream body or transport error text.
        body: String,
    },
}

impl DeployError {
    /// Creates a [`DeployError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        DeployError::Validation {
            message: message.into(),
        }
    }

    /// Creates a [`DeployError::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        DeployError::Config {
            message: message.into(),
        }
    }

    /// Converts a port failure into the pipeline taxonomy, tagging it with the
    /// step that produced it.
    pub fn from_hosting(operation: &'static str, error: HostingError) -> Self {
        match error {
            HostingError::MissingToken => {
                DeployError::config("GitHub token is not configured")
            }
            HostingError::Api { status, body } => DeployError::GitHubApi {
                operation,
                status: Some(status),
                body,
            },
            HostingError::OwnerMismatch { requested, actual } => DeployError::GitHubApi {
                operation,
                status: None,
                body: format!(
                    "repository was created under '{actual}', not '{requested}'; \
                     github_username must be the login of the configured token's account"
                ),
            },
            HostingError::Transport { message } => DeployError::GitHubApi {
                operation,
                status: None,
                body: message,
            },
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeployError::Validation { .. } => ErrorKind::Validation,
            DeployError::Auth => ErrorKind::Auth,
            DeployError::Config { .. } => ErrorKind::Config,
            DeployError::GitHubApi { .. } => ErrorKind::GitHubApi,
        }
    }

    /// Returns the HTTP status code this error is reported with.
    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }
}

fn describe_upstream(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("status {code}: {body}"),
        None => format!("no response: {body}"),
    }
}
