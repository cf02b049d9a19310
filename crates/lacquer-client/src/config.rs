//! Shared HTTP client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default timeout for upstream requests: 5 seconds.
///
/// Service-to-service calls sit on the request path of the caller, so
/// the budget is deliberately short.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration shared by all upstream HTTP clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct HttpClientConfig {
    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "upstream-timeout", env = "UPSTREAM_TIMEOUT", default_value = "5")
    )]
    #[serde(default = "default_timeout_secs")]
    pub upstream_timeout: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "upstream-user-agent", env = "UPSTREAM_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            upstream_timeout: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl HttpClientConfig {
    /// Create a new configuration with the specified timeout.
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            upstream_timeout: timeout_secs,
            user_agent: None,
        }
    }

    /// Returns the effective timeout, using the default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.upstream_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.upstream_timeout)
        }
    }

    /// Returns the effective user agent, using the default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("lacquer/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.upstream_timeout = timeout_secs;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.upstream_timeout, 5);
        assert!(config.user_agent.is_none());
        assert_eq!(config.effective_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn effective_timeout_uses_default_when_zero() {
        let config = HttpClientConfig::new(0);
        assert_eq!(
            config.effective_timeout(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn builder_pattern() {
        let config = HttpClientConfig::default()
            .with_timeout(10)
            .with_user_agent("custom-agent/1.0");

        assert_eq!(config.upstream_timeout, 10);
        assert_eq!(config.user_agent, Some("custom-agent/1.0".to_string()));
    }

    #[test]
    fn effective_user_agent_uses_default_when_none() {
        let config = HttpClientConfig::default();
        assert!(config.effective_user_agent().contains("lacquer"));
    }
}
