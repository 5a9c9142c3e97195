//! Core domain for the code deployer.
//!
//! This crate contains the request and result types, the validation and
//! credential rules, the [`RepositoryHost`] port trait, and the
//! [`DeploymentService`] that sequences a build. Infrastructure crates
//! implement the port; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* a deployment needs; the `github` crate defines *how* to
//! supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ProjectName`, `RepositoryRef`, etc.) |
//! | [`types`] | Request, result, and service metadata types |
//! | [`errors`] | The [`DeployError`] taxonomy and its HTTP status mapping |
//! | [`validation`] | Pure request validation |
//! | [`auth`] | Shared-secret credential checking |
//! | [`hosting`] | The [`RepositoryHost`] port trait |
//! | [`deploy`] | The build/revise pipeline |

pub mod auth;
pub mod deploy;
pub mod errors;
pub mod hosting;
pub mod identifiers;
pub mod types;
pub mod validation;

/// Short service name used in logs, health checks, and repository descriptions.
pub const SERVICE_SLUG: &str = "code-deployer";

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use auth::CredentialChecker;
pub use deploy::{BuildStage, DeploymentService, DeploymentSettings};
pub use errors::{DeployError, ErrorKind};
pub use hosting::{FileCommit, HostingError, PagesSource, RepositoryHost};
pub use identifiers::{
    BranchName, CommitSha, ContentPath, GitHubUsername, ProjectId, ProjectName, RepositoryRef,
    RequestId,
};
pub use types::{
    BuildRequest, BuildResult, ResultStatus, ReviseRequest, ReviseResult, ServiceInfo, Timestamp,
};
pub use validation::{validate_build, validate_revise, ValidBuild, ValidRevise};
