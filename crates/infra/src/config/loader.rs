//! Configuration loader
//!
//! Loads SDK configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `DATASTACK_HOST`: Platform base URL (required)
//! - `DATASTACK_USERNAME` / `DATASTACK_PASSWORD`: User or bot credentials
//! - `DATASTACK_TOKEN`: Existing token, used when no password is given
//! - `DATASTACK_TRACE`: Enable info-level tracing (true/false)
//! - `DATASTACK_TIMEOUT_SECS`: HTTP timeout in seconds
//! - `DATASTACK_USER_AGENT`: Override the HTTP user agent
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./datastack.json` or `./datastack.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories

use std::path::{Path, PathBuf};

use datastack_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use datastack_domain::{Config, Credentials, DataStackError, HttpConfig, Result};

const FILE_NAMES: [&str; 4] = ["datastack.json", "datastack.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If `DATASTACK_HOST`
/// is missing or the result does not validate, falls back to a config file.
///
/// # Errors
/// Returns `DataStackError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Validation fails
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `DATASTACK_*` environment variables
///
/// # Errors
/// Returns `DataStackError::Config` if the host is missing, a number does
/// not parse, or the result fails validation.
pub fn load_from_env() -> Result<Config> {
    let host = env_var("DATASTACK_HOST")?;
    let timeout_seconds = match env_opt("DATASTACK_TIMEOUT_SECS") {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| DataStackError::Config(format!("Invalid timeout: {}", e)))?,
        None => DEFAULT_HTTP_TIMEOUT_SECS,
    };

    let config = Config {
        credentials: Credentials {
            host,
            username: env_opt("DATASTACK_USERNAME"),
            password: env_opt("DATASTACK_PASSWORD"),
            token: env_opt("DATASTACK_TOKEN"),
            trace: env_bool("DATASTACK_TRACE", false),
        },
        http: HttpConfig { timeout_seconds, user_agent: env_opt("DATASTACK_USER_AGENT") },
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is chosen by
/// file extension.
///
/// # Errors
/// Returns `DataStackError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Validation fails
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DataStackError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DataStackError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DataStackError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DataStackError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DataStackError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(DataStackError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// First existing config file under the working directory or its parents.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_from(&cwd)
}

fn probe_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(3)
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        DataStackError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Set and non-empty variable.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tempfile::TempDir;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 7] = [
        "DATASTACK_HOST",
        "DATASTACK_USERNAME",
        "DATASTACK_PASSWORD",
        "DATASTACK_TOKEN",
        "DATASTACK_TRACE",
        "DATASTACK_TIMEOUT_SECS",
        "DATASTACK_USER_AGENT",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("DS_TEST_BOOL_YES", "YES");
        std::env::set_var("DS_TEST_BOOL_OFF", "off");
        assert!(env_bool("DS_TEST_BOOL_YES", false));
        assert!(!env_bool("DS_TEST_BOOL_OFF", true));

        std::env::remove_var("DS_TEST_BOOL_MISSING");
        assert!(env_bool("DS_TEST_BOOL_MISSING", true));

        std::env::remove_var("DS_TEST_BOOL_YES");
        std::env::remove_var("DS_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_with_password() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("DATASTACK_HOST", "https://ds.example.com");
        std::env::set_var("DATASTACK_USERNAME", "jane");
        std::env::set_var("DATASTACK_PASSWORD", "secret");
        std::env::set_var("DATASTACK_TRACE", "true");
        std::env::set_var("DATASTACK_TIMEOUT_SECS", "5");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.credentials.host, "https://ds.example.com");
        assert_eq!(config.credentials.username.as_deref(), Some("jane"));
        assert!(config.credentials.trace);
        assert_eq!(config.http.timeout_seconds, 5);
        assert!(config.http.user_agent.is_none());
    }

    #[test]
    fn test_load_from_env_missing_host() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, DataStackError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_requires_a_login_method() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("DATASTACK_HOST", "https://ds.example.com");
        std::env::set_var("DATASTACK_USERNAME", "jane");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(DataStackError::Config(_))));
    }

    #[test]
    fn test_load_from_env_invalid_timeout() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("DATASTACK_HOST", "https://ds.example.com");
        std::env::set_var("DATASTACK_TOKEN", "abc");
        std::env::set_var("DATASTACK_TIMEOUT_SECS", "soon");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(DataStackError::Config(_))));
    }

    #[test]
    fn test_load_from_file_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("datastack.toml");
        std::fs::write(
            &path,
            r#"
[credentials]
host = "https://ds.example.com"
token = "JWT abc"

[http]
timeout_seconds = 10
user_agent = "reporting-job"
"#,
        )
        .unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.credentials.token.as_deref(), Some("JWT abc"));
        assert_eq!(config.http.timeout_seconds, 10);
        assert_eq!(config.http.user_agent.as_deref(), Some("reporting-job"));
    }

    #[test]
    fn test_load_from_file_json_defaults_http() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"credentials": {
                "host": "http://localhost:8080", "username": "bot-1", "password": "key"
            }}"#,
        )
        .unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.http.timeout_seconds, 30);
        assert!(!config.credentials.trace);
    }

    #[test]
    fn test_load_from_file_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("datastack.yaml");
        std::fs::write(&path, "credentials: {}").unwrap();

        assert!(matches!(load_from_file(Some(path)), Err(DataStackError::Config(_))));
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/datastack.json")));
        assert!(matches!(result, Err(DataStackError::Config(_))));
    }

    #[test]
    fn test_probe_prefers_datastack_names_and_walks_up() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("a").join("config.toml"), "").unwrap();
        assert_eq!(probe_from(&nested), Some(root.path().join("a").join("config.toml")));

        std::fs::write(nested.join("datastack.json"), "{}").unwrap();
        std::fs::write(nested.join("config.json"), "{}").unwrap();
        assert_eq!(probe_from(&nested), Some(nested.join("datastack.json")));
    }
}
