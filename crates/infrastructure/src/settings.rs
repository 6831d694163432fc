//! Runtime settings.
//!
//! Settings are layered, later sources winning:
//! 1. Built-in defaults (local node on port 8545)
//! 2. An optional TOML/JSON/YAML file
//! 3. `TIMEWARP_*` environment variables (`TIMEWARP_RPC_URL`,
//!    `TIMEWARP_REQUEST_TIMEOUT_MS`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, Map};
use serde::Deserialize;
use url::Url;

/// Default JSON-RPC endpoint of a local development node.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Prefix of environment variables read by [`SettingsLoader`].
pub const ENV_PREFIX: &str = "TIMEWARP";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or a value could not be converted.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A value was read but is not acceptable.
    #[error("invalid setting {key}: {reason}")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Connection settings for the development chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// JSON-RPC endpoint of the node.
    pub rpc_url: Url,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Settings {
    /// Loads settings from defaults, an optional file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value is invalid.
    pub fn load(file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut loader = SettingsLoader::new();
        if let Some(path) = file {
            loader = loader.file(path);
        }
        loader.load()
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn validate(self) -> Result<Self, SettingsError> {
        if !matches!(self.rpc_url.scheme(), "http" | "https") {
            return Err(SettingsError::Invalid {
                key: "rpc_url",
                reason: format!("unsupported scheme '{}'", self.rpc_url.scheme()),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(SettingsError::Invalid {
                key: "request_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(self)
    }
}

/// Builder for [`Settings`] with injectable sources.
#[derive(Debug, Default)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    env: Option<Map<String, String>>,
}

impl SettingsLoader {
    /// Creates a loader reading defaults and the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required settings file; its format follows the extension.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Reads environment variables from `vars` instead of the process.
    #[must_use]
    pub fn env_source(mut self, vars: Map<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Builds the layered settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a value is invalid.
    pub fn load(self) -> Result<Settings, SettingsError> {
        let mut builder = Config::builder()
            .set_default("rpc_url", DEFAULT_RPC_URL)?
            .set_default("request_timeout_ms", DEFAULT_REQUEST_TIMEOUT_MS)?;

        if let Some(path) = &self.file {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(self.env),
            )
            .build()?
            .try_deserialize()?;

        let settings = settings.validate()?;
        tracing::debug!(rpc_url = %settings.rpc_url, timeout_ms = settings.request_timeout_ms, "settings loaded");
        Ok(settings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn no_env() -> Map<String, String> {
        Map::new()
    }

    #[test]
    fn test_defaults() {
        let settings = SettingsLoader::new().env_source(no_env()).load().unwrap();
        assert_eq!(settings.rpc_url, Url::parse(DEFAULT_RPC_URL).unwrap());
        assert_eq!(settings.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "rpc_url = \"http://10.0.0.5:8545\"").unwrap();
        writeln!(file, "request_timeout_ms = 1500").unwrap();

        let settings = SettingsLoader::new()
            .file(file.path())
            .env_source(no_env())
            .load()
            .unwrap();

        assert_eq!(settings.rpc_url.as_str(), "http://10.0.0.5:8545/");
        assert_eq!(settings.request_timeout_ms, 1500);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "rpc_url = \"http://10.0.0.5:8545\"").unwrap();

        let env = Map::from([
            ("TIMEWARP_RPC_URL".to_string(), "http://anvil:8545".to_string()),
            ("TIMEWARP_REQUEST_TIMEOUT_MS".to_string(), "250".to_string()),
        ]);
        let settings = SettingsLoader::new()
            .file(file.path())
            .env_source(env)
            .load()
            .unwrap();

        assert_eq!(settings.rpc_url.as_str(), "http://anvil:8545/");
        assert_eq!(settings.request_timeout_ms, 250);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SettingsLoader::new()
            .file(dir.path().join("absent.toml"))
            .env_source(no_env())
            .load();
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let env = Map::from([("TIMEWARP_RPC_URL".to_string(), "ws://127.0.0.1:8546".to_string())]);
        let err = SettingsLoader::new().env_source(env).load().unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { key: "rpc_url", .. }));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let env = Map::from([("TIMEWARP_REQUEST_TIMEOUT_MS".to_string(), "0".to_string())]);
        let err = SettingsLoader::new().env_source(env).load().unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                key: "request_timeout_ms",
                ..
            }
        ));
    }
}
