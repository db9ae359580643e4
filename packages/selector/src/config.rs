//! Configuration constants and runtime settings for the selector.

use std::time::Duration;

use crate::error::{Result, SelectorError};

/// GitHub GraphQL endpoint.
pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Maximum number of network calls per candidate, shared by the rate-limit
/// and transient-failure policies.
pub const MAX_ATTEMPTS: u32 = 5;

/// Base delay for exponential backoff (seconds).
pub const BASE_WAIT_SECS: u64 = 60;

/// Name of the progress ledger inside the output directory.
pub const HISTORY_FILE_NAME: &str = ".history";

/// Candidate table read by the packaged entry point.
pub const DEFAULT_INPUT_FILE: &str = "enterprise_projects.txt";

/// Primary language the packaged entry point selects for.
pub const DEFAULT_LANGUAGE: &str = "Java";

/// Maximum age in years of the last commit for the packaged entry point.
pub const DEFAULT_AGE_LIMIT_YEARS: u32 = 3;

/// Days per year used for the age threshold. Leap years are ignored.
pub const DAYS_PER_YEAR: i64 = 365;

/// Runtime settings for talking to the remote API.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub base_wait: Duration,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            api_url: GITHUB_GRAPHQL_URL.into(),
            timeout_secs: HTTP_TIMEOUT_SECS,
            max_attempts: MAX_ATTEMPTS,
            base_wait: Duration::from_secs(BASE_WAIT_SECS),
        }
    }
}

impl SelectorConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let api_url =
            std::env::var("GITHUB_GRAPHQL_URL").unwrap_or_else(|_| GITHUB_GRAPHQL_URL.into());

        let timeout_secs = std::env::var("SELECTOR_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(HTTP_TIMEOUT_SECS);

        let max_attempts = std::env::var("SELECTOR_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(MAX_ATTEMPTS);

        let base_wait_secs = std::env::var("SELECTOR_BASE_WAIT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(BASE_WAIT_SECS);

        let config = Self {
            api_url,
            timeout_secs,
            max_attempts,
            base_wait: Duration::from_secs(base_wait_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a config builder, mostly for tests pointing at a mock server.
    pub fn builder() -> SelectorConfigBuilder {
        SelectorConfigBuilder {
            config: Self::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(SelectorError::Config(
                "SELECTOR_MAX_ATTEMPTS must be at least 1".into(),
            ));
        }
        if self.api_url.is_empty() {
            return Err(SelectorError::Config("GITHUB_GRAPHQL_URL is empty".into()));
        }
        Ok(())
    }
}

/// Builder for constructing `SelectorConfig`.
pub struct SelectorConfigBuilder {
    config: SelectorConfig,
}

impl SelectorConfigBuilder {
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.config.api_url = api_url.into();
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    pub fn base_wait(mut self, base_wait: Duration) -> Self {
        self.config.base_wait = base_wait;
        self
    }

    pub fn build(self) -> Result<SelectorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
