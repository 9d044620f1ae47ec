//! Application configuration.

use std::fmt;
use std::path::PathBuf;

/// Environment variable holding the primary-provider API key.
pub const FMP_API_KEY_ENV: &str = "QUOTEDESK_FMP_API_KEY";

/// Configuration for the application backend.
///
/// The API key is optional: without one the gateway has no primary provider
/// and every request goes straight to the secondary.
#[derive(Clone)]
pub struct AppConfig {
    /// Contact string sent as `User-Agent` to SEC hosts, required by the
    /// regulator's fair-access policy (e.g. `"quotedesk/0.1 (ops@example.com)"`).
    pub user_agent: String,
    /// Financial Modeling Prep API key, if configured.
    pub fmp_api_key: Option<String>,
    /// Directory for persisted state (alerts, EDGAR snapshots, documents).
    pub data_dir: PathBuf,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("user_agent", &self.user_agent)
            .field("fmp_api_key", &self.fmp_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

impl AppConfig {
    /// Creates a configuration with no API key.
    #[must_use]
    pub fn new(user_agent: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            user_agent: user_agent.into(),
            fmp_api_key: None,
            data_dir: data_dir.into(),
        }
    }

    /// Creates a configuration, reading the API key from the
    /// [`FMP_API_KEY_ENV`] environment variable. A missing or empty
    /// variable is not an error.
    #[must_use]
    pub fn from_env(user_agent: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        let fmp_api_key = std::env::var(FMP_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self {
            fmp_api_key,
            ..Self::new(user_agent, data_dir)
        }
    }

    /// Sets the API key explicitly.
    #[must_use]
    pub fn with_fmp_api_key(mut self, key: impl Into<String>) -> Self {
        self.fmp_api_key = Some(key.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_not_fatal() {
        let config = AppConfig::new("quotedesk/0.1 (test@example.com)", "/tmp/qd");
        assert!(config.fmp_api_key.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config =
            AppConfig::new("quotedesk/0.1 (test@example.com)", "/tmp/qd").with_fmp_api_key("s3cret");
        let debug_str = format!("{config:?}");
        assert!(!debug_str.contains("s3cret"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
