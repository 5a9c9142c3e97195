//! The deployment pipeline.
//!
//! A build request moves through a fixed sequence of stages:
//!
//! ```text
//! received -> validated -> authenticated -> repo_created -> code_pushed -> pages_enabled -> responded
//! ```
//!
//! Each stage is a fallible step; the first failure ends the request and is
//! returned to the caller unchanged. Nothing already done on the host is
//! undone.
//!
//! Revision is accepted but not performed: it validates and authenticates,
//! then answers with a fixed acknowledgement.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::auth::CredentialChecker;
use crate::errors::DeployError;
use crate::hosting::{FileCommit, PagesSource, RepositoryHost};
use crate::identifiers::{BranchName, ContentPath, RepositoryRef};
use crate::types::{BuildRequest, BuildResult, ResultStatus, ReviseRequest, ReviseResult, Timestamp};
use crate::validation::{validate_build, validate_revise};

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Stages a build request passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildStage {
    Received,
    Validated,
    Authenticated,
    RepoCreated,
    CodePushed,
    PagesEnabled,
    Responded,
}

impl BuildStage {
    /// Returns the stage name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildStage::Received => "received",
            BuildStage::Validated => "validated",
            BuildStage::Authenticated => "authenticated",
            BuildStage::RepoCreated => "repo_created",
            BuildStage::CodePushed => "code_pushed",
            BuildStage::PagesEnabled => "pages_enabled",
            BuildStage::Responded => "responded",
        }
    }
}

impl std::fmt::Display for BuildStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Where deployed code lands inside each new repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSettings {
    /// Branch the entry file is committed to and Pages is served from.
    pub branch: BranchName,
    /// Path of the single file the request's code is written to.
    pub entry_file: ContentPath,
}

impl DeploymentSettings {
    pub const DEFAULT_BRANCH: &'static str = "main";
    pub const DEFAULT_ENTRY_FILE: &'static str = "index.html";

    /// Builds settings from configuration strings, rejecting empty values.
    pub fn new(branch: &str, entry_file: &str) -> Result<Self, DeployError> {
        let branch = BranchName::new(branch)
            .ok_or_else(|| DeployError::config("deployment branch must not be empty"))?;
        let entry_file = ContentPath::new(entry_file.trim_start_matches('/'))
            .ok_or_else(|| DeployError::config("entry file path must not be empty"))?;
        Ok(Self { branch, entry_file })
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Runs build and revise requests against a [`RepositoryHost`].
///
/// Holds no per-request state; one instance is shared across all requests.
#[derive(Clone)]
pub struct DeploymentService {
    host: Arc<dyn RepositoryHost>,
    credentials: CredentialChecker,
    settings: DeploymentSettings,
}

impl DeploymentService {
    /// Creates a new service.
    pub fn new(
        host: Arc<dyn RepositoryHost>,
        credentials: CredentialChecker,
        settings: DeploymentSettings,
    ) -> Self {
        Self {
            host,
            credentials,
            settings,
        }
    }

    /// Returns the deployment settings in use.
    pub fn settings(&self) -> &DeploymentSettings {
        &self.settings
    }

    /// Validates, authenticates, and deploys a build request.
    #[instrument(skip_all, fields(project = %request.project_name, owner = %request.github_username))]
    pub async fn build(&self, request: &BuildRequest) -> Result<BuildResult, DeployError> {
        debug!(stage = %BuildStage::Received, "build request received");

        let build = validate_build(request)?;
        debug!(stage = %BuildStage::Validated, "build request validated");

        self.credentials.check(&build.secret)?;
        debug!(stage = %BuildStage::Authenticated, "caller authenticated");

        let repository = &build.repository;
        self.create_repository(repository).await?;
        self.push_code(repository, &build.code).await?;
        self.enable_pages(repository).await?;

        let result = BuildResult {
            status: ResultStatus::Success,
            message: format!(
                "Build completed successfully for project '{}'",
                repository.name
            ),
            project_id: repository.project_id().to_string(),
            repository_url: repository.html_url(),
            pages_url: repository.pages_url(),
            deployed_at: Timestamp::now(),
        };

        info!(
            stage = %BuildStage::Responded,
            repository = %repository,
            pages_url = %result.pages_url,
            "deployment complete"
        );
        Ok(result)
    }

    /// Validates and authenticates a revise request, then acknowledges it.
    ///
    /// No host call is made. Revisions are not yet implemented, and the
    /// project id is never looked up.
    #[instrument(skip_all, fields(project_id = %request.project_id))]
    pub async fn revise(&self, request: &ReviseRequest) -> Result<ReviseResult, DeployError> {
        let revise = validate_revise(request)?;
        self.credentials.check(&revise.secret)?;

        warn!(
            project_id = %revise.project_id,
            changes_len = revise.changes.len(),
            "revision accepted but not applied: revisions are not implemented"
        );

        Ok(ReviseResult {
            status: ResultStatus::Success,
            message: format!(
                "Revision request accepted for project '{}'",
                revise.project_id
            ),
        })
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    async fn create_repository(&self, repository: &RepositoryRef) -> Result<(), DeployError> {
        let description = format!("{} (deployed by {})", repository.name, crate::SERVICE_SLUG);
        self.host
            .create_repository(repository, &description)
            .await
            .map_err(|e| DeployError::from_hosting("create_repository", e))?;
        info!(stage = %BuildStage::RepoCreated, repository = %repository, "repository created");
        Ok(())
    }

    async fn push_code(&self, repository: &RepositoryRef, code: &str) -> Result<(), DeployError> {
        let file = FileCommit {
            path: self.settings.entry_file.clone(),
            content: code.to_string(),
            branch: self.settings.branch.clone(),
            message: format!("Deploy {}", self.settings.entry_file),
        };
        let commit = self
            .host
            .push_file(repository, &file)
            .await
            .map_err(|e| DeployError::from_hosting("push_file", e))?;
        info!(
            stage = %BuildStage::CodePushed,
            path = %file.path,
            commit = commit.as_ref().map(|c| c.as_str()).unwrap_or("unknown"),
            "code pushed"
        );
        Ok(())
    }

    async fn enable_pages(&self, repository: &RepositoryRef) -> Result<(), DeployError> {
        let source = PagesSource {
            branch: self.settings.branch.clone(),
            path: "/".to_string(),
        };
        self.host
            .enable_pages(repository, &source)
            .await
            .map_err(|e| DeployError::from_hosting("enable_pages", e))?;
        info!(stage = %BuildStage::PagesEnabled, "pages enabled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::hosting::HostingError;
    use crate::identifiers::CommitSha;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SECRET: &str = "expected-secret";

    /// Records every call and fails the configured step, if any.
    #[derive(Default)]
    struct RecordingHost {
        calls: Mutex<Vec<String>>,
        fail_create: Option<HostingError>,
        fail_push: Option<HostingError>,
        fail_pages: Option<HostingError>,
        pushed: Mutex<Option<FileCommit>>,
    }

    impl RecordingHost {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RepositoryHost for RecordingHost {
        async fn create_repository(
            &self,
            repository: &RepositoryRef,
            _description: &str,
        ) -> Result<(), HostingError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("create_repository {repository}"));
            match &self.fail_create {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        async fn push_file(
            &self,
            repository: &RepositoryRef,
            file: &FileCommit,
        ) -> Result<Option<CommitSha>, HostingError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("push_file {repository} {}", file.path));
            *self.pushed.lock().unwrap() = Some(file.clone());
            match &self.fail_push {
                Some(e) => Err(e.clone()),
                None => Ok(CommitSha::new("abc123")),
            }
        }

        async fn enable_pages(
            &self,
            repository: &RepositoryRef,
            source: &PagesSource,
        ) -> Result<(), HostingError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("enable_pages {repository} {}", source.branch));
            match &self.fail_pages {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    fn service(host: Arc<RecordingHost>) -> DeploymentService {
        DeploymentService::new(
            host,
            CredentialChecker::new(Some(SECRET.to_string())),
            DeploymentSettings::new(
                DeploymentSettings::DEFAULT_BRANCH,
                DeploymentSettings::DEFAULT_ENTRY_FILE,
            )
            .unwrap(),
        )
    }

    fn build_request() -> BuildRequest {
        BuildRequest {
            email: "dev@example.com".to_string(),
            secret: SECRET.to_string(),
            project_name: "hello-pages".to_string(),
            code: "<h1>Hello</h1>".to_string(),
            github_username: "octocat".to_string(),
        }
    }

    #[tokio::test]
    async fn test_build_runs_all_steps_in_order() {
        let host = Arc::new(RecordingHost::default());
        let result = service(host.clone()).build(&build_request()).await.unwrap();

        assert_eq!(result.status, ResultStatus::Success);
        assert_eq!(result.repository_url, "https://github.com/octocat/hello-pages");
        assert_eq!(result.pages_url, "https://octocat.github.io/hello-pages/");
        assert_eq!(result.project_id, "octocat/hello-pages");
        assert_eq!(
            host.calls(),
            vec![
                "create_repository octocat/hello-pages",
                "push_file octocat/hello-pages index.html",
                "enable_pages octocat/hello-pages main",
            ]
        );
    }

    #[tokio::test]
    async fn test_build_pushes_request_code_to_entry_file() {
        let host = Arc::new(RecordingHost::default());
        let settings = DeploymentSettings::new("gh-pages", "/site/index.html").unwrap();
        let svc = DeploymentService::new(
            host.clone(),
            CredentialChecker::new(Some(SECRET.to_string())),
            settings,
        );
        svc.build(&build_request()).await.unwrap();

        let pushed = host.pushed.lock().unwrap().clone().unwrap();
        assert_eq!(pushed.content, "<h1>Hello</h1>");
        assert_eq!(pushed.path.as_str(), "site/index.html");
        assert_eq!(pushed.branch.as_str(), "gh-pages");
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_host_calls() {
        let host = Arc::new(RecordingHost::default());
        let mut req = build_request();
        req.email = "not-an-email".to_string();

        let err = service(host.clone()).build(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_secret_makes_no_host_calls() {
        let host = Arc::new(RecordingHost::default());
        let mut req = build_request();
        req.secret = "wrong-secret".to_string();

        let err = service(host.clone()).build(&req).await.unwrap_err();
        assert_eq!(err.http_status(), 401);
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_repository_failure_stops_before_push_and_pages() {
        let host = Arc::new(RecordingHost {
            fail_create: Some(HostingError::Api {
                status: 422,
                body: r#"{"message":"name already exists on this account"}"#.to_string(),
            }),
            ..Default::default()
        });

        let err = service(host.clone()).build(&build_request()).await.unwrap_err();
        assert_eq!(err.http_status(), 500);
        assert!(matches!(
            err,
            DeployError::GitHubApi {
                operation: "create_repository",
                status: Some(422),
                ..
            }
        ));
        assert_eq!(host.calls(), vec!["create_repository octocat/hello-pages"]);
    }

    #[tokio::test]
    async fn test_push_failure_leaves_repository_and_skips_pages() {
        let host = Arc::new(RecordingHost {
            fail_push: Some(HostingError::Transport {
                message: "operation timed out".to_string(),
            }),
            ..Default::default()
        });

        let err = service(host.clone()).build(&build_request()).await.unwrap_err();
        assert!(matches!(
            err,
            DeployError::GitHubApi {
                operation: "push_file",
                status: None,
                ..
            }
        ));
        assert_eq!(host.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_pages_failure_is_reported() {
        let host = Arc::new(RecordingHost {
            fail_pages: Some(HostingError::Api {
                status: 409,
                body: "conflict".to_string(),
            }),
            ..Default::default()
        });

        let err = service(host.clone()).build(&build_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GitHubApi);
        assert_eq!(host.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_token_is_config_error() {
        let host = Arc::new(RecordingHost {
            fail_create: Some(HostingError::MissingToken),
            ..Default::default()
        });

        let err = service(host).build(&build_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.http_status(), 500);
    }

    #[tokio::test]
    async fn test_revise_acknowledges_without_host_calls() {
        let host = Arc::new(RecordingHost::default());
        let req = ReviseRequest {
            email: "dev@example.com".to_string(),
            secret: SECRET.to_string(),
            project_id: "never-built".to_string(),
            changes: "Make the heading blue".to_string(),
        };

        let result = service(host.clone()).revise(&req).await.unwrap();
        assert_eq!(result.status, ResultStatus::Success);
        assert!(result.message.contains("never-built"));
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_revise_rejects_wrong_secret() {
        let host = Arc::new(RecordingHost::default());
        let req = ReviseRequest {
            email: "dev@example.com".to_string(),
            secret: "nope".to_string(),
            project_id: "octocat/hello-pages".to_string(),
            changes: "anything".to_string(),
        };

        let err = service(host).revise(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
    }

    #[test]
    fn test_settings_reject_empty_values() {
        assert!(DeploymentSettings::new("", "index.html").is_err());
        assert!(DeploymentSettings::new("main", "/").is_err());
    }

    #[test]
    fn test_stages_are_ordered() {
        assert!(BuildStage::Received < BuildStage::Validated);
        assert!(BuildStage::CodePushed < BuildStage::PagesEnabled);
        assert_eq!(BuildStage::RepoCreated.to_string(), "repo_created");
    }
}
