//! Request, result, and metadata types exchanged over the HTTP surface.
//!
//! Request types deserialise leniently: every field defaults to an empty
//! string so that a missing field is reported by [`crate::validation`] as a
//! validation failure rather than rejected by the JSON decoder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /build`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildRequest {
    /// Contact address of the caller.
    pub email: String,
    /// Shared secret compared against the configured value.
    pub secret: String,
    /// Name of the project; becomes the repository name.
    pub project_name: String,
    /// Content committed as the repository's entry file.
    pub code: String,
    /// GitHub account that will own the repository.
    pub github_username: String,
}

/// Body of `POST /revise`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviseRequest {
    /// Contact address of the caller.
    pub email: String,
    /// Shared secret compared against the configured value.
    pub secret: String,
    /// Project id returned by an earlier build.
    pub project_id: String,
    /// Description of the requested changes.
    pub changes: String,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome tag carried by every response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Success,
    Error,
}

/// Body returned from a successful `POST /build`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    pub status: ResultStatus,
    pub message: String,
    /// `"owner/project"` identifier for later revision requests.
    pub project_id: String,
    pub repository_url: String,
    /// Expected Pages URL. The site may still be building when this is returned.
    pub pages_url: String,
    pub deployed_at: Timestamp,
}

/// Body returned from a successful `POST /revise`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseResult {
    pub status: ResultStatus,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Service metadata
// ---------------------------------------------------------------------------

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub status: String,
    /// Capabilities this build of the service performs.
    pub features: Vec<String>,
    /// Mutating endpoints exposed by the service.
    pub endpoints: Vec<String>,
}

impl ServiceInfo {
    /// Human-readable service name.
    pub const NAME: &'static str = "Code Deployer";

    /// Builds the metadata document for the given version string.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            name: Self::NAME.to_string(),
            version: version.into(),
            status: "active".to_string(),
            features: vec![
                "repository_creation".to_string(),
                "code_push".to_string(),
                "github_pages".to_string(),
            ],
            endpoints: vec!["/build".to_string(), "/revise".to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp, serialised as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
