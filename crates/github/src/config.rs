//! GitHub client configuration.

use std::fmt;
use std::time::Duration;

/// Public GitHub REST API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Per-call timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `User-Agent` sent when none is configured. GitHub rejects requests without one.
pub const DEFAULT_USER_AGENT: &str = concat!("code-deployer/", env!("CARGO_PKG_VERSION"));

/// Settings for [`crate::GitHubClient`].
///
/// The token is injected here once at startup. It is never read from the
/// process environment at call time.
#[derive(Clone)]
pub struct GitHubConfig {
    /// Personal access token. `None` makes every call fail with
    /// [`deployer::HostingError::MissingToken`].
    pub token: Option<String>,
    /// API root without a trailing slash.
    pub api_base_url: String,
    /// Timeout applied to each outbound call.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl GitHubConfig {
    /// Sets the bearer token, ignoring empty values.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Sets the API root, trimming any trailing slash.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_normalises_values() {
        let config = GitHubConfig::default()
            .with_token(Some("  ".to_string()))
            .with_api_base_url("http://127.0.0.1:9999/");
        assert!(config.token.is_none());
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = GitHubConfig::default().with_token(Some("ghp_secret".to_string()));
        let printed = format!("{config:?}");
        assert!(!printed.contains("ghp_secret"));
        assert!(printed.contains("<redacted>"));
    }
}
