//! Configuration loading.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags (`--bind`, `--log-format`)
//! 2. Environment variables prefixed with `DEPLOYER_`, using `__` between
//!    section and key (e.g. `DEPLOYER_GITHUB__TOKEN`, `DEPLOYER_AUTH__SECRET`)
//! 3. Config file (`--config <path>`, or `./deployer.toml` if present)
//! 4. Built-in defaults
//!
//! `GITHUB_TOKEN` and `DEPLOYER_SECRET` are honoured as fallbacks when the
//! token or secret is not set any other way.
//!
//! Example config file:
//! ```toml
//! [server]
//! bind = "0.0.0.0:8000"
//!
//! [github]
//! token = "ghp_..."            # or DEPLOYER_GITHUB__TOKEN / GITHUB_TOKEN
//! api_base_url = "https://api.github.com"
//! timeout_secs = 30
//! branch = "main"
//! entry_file = "index.html"
//!
//! [auth]
//! secret = "..."               # or DEPLOYER_AUTH__SECRET / DEPLOYER_SECRET
//!
//! [telemetry]
//! log_format = "json"          # or "pretty"
//! otlp_endpoint = "http://localhost:4317"
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use deployer::{DeployError, DeploymentSettings};
use github::GitHubConfig;
use serde::Deserialize;
use thiserror::Error;

/// Config file read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "deployer.toml";

/// Errors raised while loading or interpreting configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid bind address '{value}': {source}")]
    BindAddress {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("github.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("invalid deployment settings: {0}")]
    Deployment(#[from] DeployError),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub server: ServerConfig,
    pub github: GitHubSection,
    pub auth: AuthSection,
    pub telemetry: TelemetryConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

/// GitHub API configuration.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GitHubSection {
    /// Personal access token used as the bearer credential.
    pub token: Option<String>,
    pub api_base_url: String,
    /// Timeout applied to each outbound GitHub call.
    pub timeout_secs: u64,
    /// Branch the entry file is committed to and Pages serves.
    pub branch: String,
    /// Path of the file the submitted code is written to.
    pub entry_file: String,
    pub user_agent: Option<String>,
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            token: None,
            api_base_url: github::config::DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: github::config::DEFAULT_TIMEOUT.as_secs(),
            branch: DeploymentSettings::DEFAULT_BRANCH.to_string(),
            entry_file: DeploymentSettings::DEFAULT_ENTRY_FILE.to_string(),
            user_agent: None,
        }
    }
}

impl fmt::Debug for GitHubSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubSection")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("branch", &self.branch)
            .field("entry_file", &self.entry_file)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Shared-secret configuration.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Secret every request must present.
    pub secret: Option<String>,
}

impl fmt::Debug for AuthSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSection")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Logging and trace export configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_format: LogFormat,
    /// OTLP gRPC endpoint. Trace export is disabled when unset.
    pub otlp_endpoint: Option<String>,
    /// `service.name` resource attribute reported with exported spans.
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            otlp_endpoint: None,
            service_name: deployer::SERVICE_SLUG.to_string(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from the optional file and the environment.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let mut builder = ConfigBuilder::builder();

        match path {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
            }
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    tracing::debug!("Loading config from ./{}", DEFAULT_CONFIG_FILE);
                    builder = builder
                        .add_source(File::from(local).format(FileFormat::Toml).required(false));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("DEPLOYER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: CliConfig = builder.build()?.try_deserialize()?;
        config.apply_fallbacks(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parses configuration from a TOML string, without consulting the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigLoadError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Fills the token and secret from conventional variables when unset.
    pub fn apply_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if is_blank(&self.github.token) {
            self.github.token = lookup("GITHUB_TOKEN");
        }
        if is_blank(&self.auth.secret) {
            self.auth.secret = lookup("DEPLOYER_SECRET");
        }
    }

    /// Parses the configured bind address.
    pub fn server_addr(&self) -> Result<SocketAddr, ConfigLoadError> {
        self.server
            .bind
            .parse()
            .map_err(|source| ConfigLoadError::BindAddress {
                value: self.server.bind.clone(),
                source,
            })
    }

    /// Builds the GitHub client configuration.
    pub fn github_config(&self) -> Result<GitHubConfig, ConfigLoadError> {
        if self.github.timeout_secs == 0 {
            return Err(ConfigLoadError::ZeroTimeout);
        }
        let mut config = GitHubConfig::default()
            .with_token(self.github.token.clone())
            .with_api_base_url(self.github.api_base_url.clone())
            .with_timeout(Duration::from_secs(self.github.timeout_secs));
        if let Some(agent) = &self.github.user_agent {
            config = config.with_user_agent(agent.clone());
        }
        Ok(config)
    }

    /// Builds the deployment settings.
    pub fn deployment_settings(&self) -> Result<DeploymentSettings, ConfigLoadError> {
        Ok(DeploymentSettings::new(
            &self.github.branch,
            &self.github.entry_file,
        )?)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
