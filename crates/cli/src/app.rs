//! Composition of the concrete infrastructure into the HTTP application state.

use std::sync::Arc;

use anyhow::Context;
use deployer::{CredentialChecker, DeploymentService, ServiceInfo};
use github::GitHubClient;
use listener::AppState;

use crate::config::CliConfig;

/// Wires the GitHub client, credential checker, and deployment settings into
/// the state served by the listener.
///
/// A missing token or secret is not fatal here: the service starts, and every
/// affected request is answered with a configuration error.
pub fn build_state(config: &CliConfig) -> anyhow::Result<AppState> {
    let github = GitHubClient::new(config.github_config()?).context("failed to create GitHub client")?;
    if !github.has_token() {
        tracing::warn!("no GitHub token configured; build requests will fail with a configuration error");
    }

    let credentials = CredentialChecker::new(config.auth.secret.clone());
    if !credentials.is_configured() {
        tracing::warn!("no shared secret configured; all requests will fail with a configuration error");
    }

    let settings = config.deployment_settings()?;
    tracing::info!(
        branch = %settings.branch,
        entry_file = %settings.entry_file,
        api = %config.github.api_base_url,
        "deployment settings loaded"
    );

    let service = DeploymentService::new(Arc::new(github), credentials, settings);
    Ok(AppState::new(service, ServiceInfo::new(env!("CARGO_PKG_VERSION"))))
}
