//! Configuration structures
//!
//! Loaded by `datastack_infra::config` from the environment or a JSON/TOML
//! file; validated before use.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::errors::{DataStackError, Result};
use crate::types::Credentials;

/// SDK configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub credentials: Credentials,
    #[serde(default)]
    pub http: HttpConfig,
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS, user_agent: None }
    }
}

impl Config {
    /// Check that the host is an http(s) URL and that some way to log in is
    /// present.
    ///
    /// # Errors
    /// Returns `DataStackError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let host = self.credentials.host.trim();
        if host.is_empty() {
            return Err(DataStackError::Config("host is required".into()));
        }
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(DataStackError::Config(format!(
                "host must start with http:// or https://, got '{host}'"
            )));
        }

        let has_token = self.credentials.token.as_deref().is_some_and(|t| !t.is_empty());
        if !self.credentials.can_relogin() && !has_token {
            return Err(DataStackError::Config(
                "either username and password or a token is required".into(),
            ));
        }

        if self.http.timeout_seconds == 0 {
            return Err(DataStackError::Config("http.timeout_seconds must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_config_is_valid() {
        let config = Config {
            credentials: Credentials::with_password("https://ds.example.com", "jane", "secret"),
            http: HttpConfig::default(),
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.http.timeout_seconds, 30);
    }

    #[test]
    fn test_token_config_is_valid() {
        let config = Config {
            credentials: Credentials::with_token("http://localhost:8080", "JWT abc"),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_missing_login_material() {
        let config = Config {
            credentials: Credentials {
                host: "https://ds.example.com".into(),
                ..Credentials::default()
            },
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(DataStackError::Config(_))));
    }

    #[test]
    fn test_rejects_non_http_host() {
        let config = Config {
            credentials: Credentials::with_token("ftp://ds.example.com", "abc"),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config =
            Config { credentials: Credentials::with_token("", "abc"), ..Config::default() };
        assert!(config.validate().is_err());
    }
}
