//! Port trait for the code host the pipeline deploys to.
//!
//! The domain crate defines *what* it needs from a host; the `github` crate
//! supplies *how*. Each method is one outbound call so that each pipeline step
//! can be mocked and tested on its own.

use async_trait::async_trait;
use thiserror::Error;

use crate::identifiers::{BranchName, CommitSha, ContentPath, RepositoryRef};

/// Failures reported by a [`RepositoryHost`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostingError {
    /// No bearer token is configured, so no call was attempted.
    #[error("no API token configured")]
    MissingToken,

    /// The host answered with a non-2xx status.
    #[error("host returned status {status}: {body}")]
    Api {
        /// HTTP status code returned by the host.
        status: u16,
        /// Response body as returned by the host.
        body: String,
    },

    /// The host created the repository under a different account than the one
    /// requested. The repository exists under `actual`.
    #[error("repository was created under '{actual}' instead of '{requested}'")]
    OwnerMismatch {
        /// Account named in the request.
        requested: String,
        /// Account the host actually created the repository under.
        actual: String,
    },

    /// The call did not produce a response (connect failure, timeout, TLS).
    #[error("request failed: {message}")]
    Transport {
        /// Transport-level error description.
        message: String,
    },
}

/// A single file to commit to a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
    /// Path of the file relative to the repository root.
    pub path: ContentPath,
    /// Raw (not yet encoded) file contents.
    pub content: String,
    /// Branch to commit to.
    pub branch: BranchName,
    /// Commit message.
    pub message: String,
}

/// Where GitHub Pages serves the site from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesSource {
    pub branch: BranchName,
    /// Directory within the branch; `"/"` for the repository root.
    pub path: String,
}

/// Operations the deployment pipeline performs against a code host.
///
/// Implementations make exactly one attempt per call and never retry.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Creates an empty public repository named `repository.name`.
    ///
    /// Fails with [`HostingError::OwnerMismatch`] when the host reports that
    /// the repository landed under an account other than `repository.owner`.
    async fn create_repository(
        &self,
        repository: &RepositoryRef,
        description: &str,
    ) -> Result<(), HostingError>;

    /// Creates or updates a single file. Returns the resulting commit SHA when
    /// the host reports one.
    async fn push_file(
        &self,
        repository: &RepositoryRef,
        file: &FileCommit,
    ) -> Result<Option<CommitSha>, HostingError>;

    /// Turns on static-site hosting for the repository.
    async fn enable_pages(
        &self,
        repository: &RepositoryRef,
        source: &PagesSource,
    ) -> Result<(), HostingError>;
}
