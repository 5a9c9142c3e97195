//! GitHub REST client implementing [`RepositoryHost`].

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use deployer::{CommitSha, FileCommit, HostingError, PagesSource, RepositoryHost, RepositoryRef};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::GitHubConfig;
use crate::error::{short_error_message, transport_error, GitHubError};
use crate::types::{
    CreateRepositoryRequest, CreatedRepository, EnablePagesRequest, PagesSourceBody, PutContentsRequest,
    PutContentsResponse,
};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Thin client over the three GitHub endpoints a deployment needs.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Builds a client. Fails only if the HTTP stack cannot be initialised or
    /// the base URL does not parse.
    pub fn new(config: GitHubConfig) -> Result<Self, GitHubError> {
        reqwest::Url::parse(&config.api_base_url)
            .map_err(|_| GitHubError::InvalidBaseUrl(config.api_base_url.clone()))?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Returns `true` if a bearer token is configured.
    pub fn has_token(&self) -> bool {
        self.config.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, HostingError> {
        let token = self
            .config
            .token
            .as_deref()
            .ok_or(HostingError::MissingToken)?;

        Ok(self
            .client
            .request(method, self.url(path))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION))
    }

    /// Sends one JSON request and returns the response if its status is 2xx.
    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, HostingError> {
        let response = self
            .request(method.clone(), path)?
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(%method, path, error = %e, "GitHub request failed in transit");
                transport_error(e)
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(%method, path, status = status.as_u16(), "GitHub request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            %method,
            path,
            status = status.as_u16(),
            message = %short_error_message(&body),
            "GitHub request rejected"
        );
        Err(HostingError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

fn contents_path(repository: &RepositoryRef, file: &FileCommit) -> String {
    format!(
        "/repos/{}/{}/contents/{}",
        repository.owner,
        repository.name,
        file.path.as_str().trim_start_matches('/')
    )
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    #[instrument(skip_all, fields(repository = %repository))]
    async fn create_repository(
        &self,
        repository: &RepositoryRef,
        description: &str,
    ) -> Result<(), HostingError> {
        let body = CreateRepositoryRequest {
            name: repository.name.as_str(),
            description,
            private: false,
            auto_init: false,
        };
        let response = self.send_json(Method::POST, "/user/repos", &body).await?;

        // The repository always lands under the token's account.
        let owner = match response.json::<CreatedRepository>().await {
            Ok(created) => created.owner.map(|o| o.login),
            Err(e) => {
                debug!(error = %e, "repository response did not include an owner");
                None
            }
        };
        if let Some(actual) = owner {
            if !actual.eq_ignore_ascii_case(repository.owner.as_str()) {
                warn!(
                    requested = %repository.owner,
                    actual = %actual,
                    "repository created under a different account"
                );
                return Err(HostingError::OwnerMismatch {
                    requested: repository.owner.to_string(),
                    actual,
                });
            }
        }
        Ok(())
    }

    #[instrument(skip_all, fields(repository = %repository, path = %file.path))]
    async fn push_file(
        &self,
        repository: &RepositoryRef,
        file: &FileCommit,
    ) -> Result<Option<CommitSha>, HostingError> {
        let body = PutContentsRequest {
            message: &file.message,
            content: BASE64.encode(file.content.as_bytes()),
            branch: file.branch.as_str(),
        };
        let response = self
            .send_json(Method::PUT, &contents_path(repository, file), &body)
            .await?;

        // A 2xx without the expected body still means the file was written.
        let sha = match response.json::<PutContentsResponse>().await {
            Ok(parsed) => parsed.commit.and_then(|c| CommitSha::new(c.sha)),
            Err(e) => {
                debug!(error = %e, "contents response did not include a commit");
                None
            }
        };
        Ok(sha)
    }

    #[instrument(skip_all, fields(repository = %repository, branch = %source.branch))]
    async fn enable_pages(
        &self,
        repository: &RepositoryRef,
        source: &PagesSource,
    ) -> Result<(), HostingError> {
        let body = EnablePagesRequest {
            source: PagesSourceBody {
                branch: source.branch.as_str(),
                path: &source.path,
            },
        };
        let path = format!("/repos/{}/{}/pages", repository.owner, repository.name);
        self.send_json(Method::POST, &path, &body).await?;
        Ok(())
    }
}
