//! Request and response bodies for the GitHub REST endpoints this crate calls.
//!
//! Only the fields the adapter sends or reads are modelled.

use serde::{Deserialize, Serialize};

/// Body of `POST /user/repos`.
#[derive(Debug, Serialize)]
pub struct CreateRepositoryRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub private: bool,
    pub auto_init: bool,
}

/// Subset of the repository returned by `POST /user/repos`.
#[derive(Debug, Deserialize)]
pub struct CreatedRepository {
    pub owner: Option<RepositoryOwner>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub struct PutContentsRequest<'a> {
    pub message: &'a str,
    /// Base64-encoded file contents.
    pub content: String,
    pub branch: &'a str,
}

/// Subset of the contents API response.
#[derive(Debug, Deserialize)]
pub struct PutContentsResponse {
    pub commit: Option<CommitSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
}

/// Body of `POST /repos/{owner}/{repo}/pages`.
#[derive(Debug, Serialize)]
pub struct EnablePagesRequest<'a> {
    pub source: PagesSourceBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct PagesSourceBody<'a> {
    pub branch: &'a str,
    pub path: &'a str,
}

/// Error body GitHub returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
