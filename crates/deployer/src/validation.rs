//! Request validation.
//!
//! Pure functions: each turns a raw request into a typed, checked value or a
//! [`DeployError::Validation`]. Field presence is checked first, in field
//! order, so the error names the first offending field.
//!
//! The secret is only checked for presence here. Whether it is correct is the
//! credential checker's job ([`crate::auth`]), which runs after validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::DeployError;
use crate::identifiers::{GitHubUsername, ProjectId, ProjectName, RepositoryRef};
use crate::types::{BuildRequest, ReviseRequest};

/// Longest project name accepted.
pub const MAX_PROJECT_NAME_LEN: usize = 100;

/// Longest GitHub login GitHub itself allows.
pub const MAX_GITHUB_USERNAME_LEN: usize = 39;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is a valid regex")
});

static PROJECT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("project name pattern is a valid regex"));

static GITHUB_USERNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9]|-[A-Za-z0-9])*$")
        .expect("username pattern is a valid regex")
});

// ---------------------------------------------------------------------------
// Validated requests
// ---------------------------------------------------------------------------

/// A build request whose fields have all passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBuild {
    pub email: String,
    pub secret: String,
    pub repository: RepositoryRef,
    pub code: String,
}

/// A revise request whose fields have all passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRevise {
    pub email: String,
    pub secret: String,
    pub project_id: ProjectId,
    pub changes: String,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Validates a `POST /build` body.
pub fn validate_build(request: &BuildRequest) -> Result<ValidBuild, DeployError> {
    require("email", &request.email)?;
    require("secret", &request.secret)?;
    require("project_name", &request.project_name)?;
    require("code", &request.code)?;
    require("github_username", &request.github_username)?;

    check_email(&request.email)?;
    let name = check_project_name(&request.project_name)?;
    let owner = check_github_username(&request.github_username)?;

    Ok(ValidBuild {
        email: request.email.clone(),
        secret: request.secret.clone(),
        repository: RepositoryRef::new(owner, name),
        code: request.code.clone(),
    })
}

/// Validates a `POST /revise` body.
///
/// `project_id` is only checked for presence; no store exists to look it up in.
pub fn validate_revise(request: &ReviseRequest) -> Result<ValidRevise, DeployError> {
    require("email", &request.email)?;
    require("secret", &request.secret)?;
    require("project_id", &request.project_id)?;
    require("changes", &request.changes)?;

    check_email(&request.email)?;

    let project_id = ProjectId::new(request.project_id.trim())
        .ok_or_else(|| DeployError::validation("project_id must not be empty"))?;

    Ok(ValidRevise {
        email: request.email.clone(),
        secret: request.secret.clone(),
        project_id,
        changes: request.changes.clone(),
    })
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

fn require(field: &str, value: &str) -> Result<(), DeployError> {
    if value.trim().is_empty() {
        return Err(DeployError::validation(format!(
            "{field} is required and must not be empty"
        )));
    }
    Ok(())
}

/// Returns `true` if `email` is syntactically a valid address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

fn check_email(email: &str) -> Result<(), DeployError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(DeployError::validation(format!(
            "email '{email}' is not a valid email address"
        )))
    }
}

fn check_project_name(name: &str) -> Result<ProjectName, DeployError> {
    if name.len() > MAX_PROJECT_NAME_LEN {
        return Err(DeployError::validation(format!(
            "project_name must be at most {MAX_PROJECT_NAME_LEN} characters"
        )));
    }
    if !PROJECT_NAME.is_match(name) {
        return Err(DeployError::validation(
            "Project name must contain only alphanumeric characters, hyphens, and underscores",
        ));
    }
    ProjectName::new(name).ok_or_else(|| DeployError::validation("project_name must not be empty"))
}

fn check_github_username(login: &str) -> Result<GitHubUsername, DeployError> {
    if login.len() > MAX_GITHUB_USERNAME_LEN || !GITHUB_USERNAME.is_match(login) {
        return Err(DeployError::validation(format!(
            "github_username '{login}' is not a valid GitHub login"
        )));
    }
    GitHubUsername::new(login)
        .ok_or_else(|| DeployError::validation("github_username must not be empty"))
}
