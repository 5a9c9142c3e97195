//! Code deployer GitHub infrastructure adapter.
//!
//! Implements the [`deployer::RepositoryHost`] port over the GitHub REST API
//! using `reqwest`:
//!
//! | Step | Endpoint |
//! |------|----------|
//! | Create repository | `POST /user/repos` |
//! | Push entry file | `PUT /repos/{owner}/{repo}/contents/{path}` |
//! | Enable Pages | `POST /repos/{owner}/{repo}/pages` |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. Authentication
//! headers, payload encoding, timeouts, and status handling live here; the
//! [`deployer`] crate sees only [`deployer::HostingError`].
//!
//! Every call is a single attempt. Non-2xx responses and transport failures
//! are returned to the caller as-is.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::GitHubClient;
pub use config::GitHubConfig;
pub use error::GitHubError;
