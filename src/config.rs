//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::guard::AccessPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default)]
    pub erp: ErpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Portal backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where the session file lives
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: String,
}

fn default_session_path() -> String {
    dirs::data_local_dir()
        .map(|p| {
            p.join("supplier-portal")
                .join("session.json")
                .to_string_lossy()
                .to_string()
        })
        .unwrap_or_else(|| "./session.json".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

/// Route guard settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub admin_policy: AccessPolicy,
}

/// ERP import settings
#[derive(Debug, Clone, Deserialize)]
pub struct ErpConfig {
    #[serde(default = "default_erp_api_key")]
    pub api_key: String,

    #[serde(default = "default_simulate_count")]
    pub simulate_count: usize,
}

fn default_erp_api_key() -> String {
    "secret-erp-key".to_string()
}

fn default_simulate_count() -> usize {
    10
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            api_key: default_erp_api_key(),
            simulate_count: default_simulate_count(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<(Self, LoadReport), ConfigError> {
        let mut config = Self::load(path)?;
        let warnings = config.apply_env_overrides();
        Ok((
            config,
            LoadReport {
                source: Some(path.to_path_buf()),
                warnings,
            },
        ))
    }

    /// Load from default locations or environment
    pub fn load_default() -> (Self, LoadReport) {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("supplier-portal").join("config.toml")),
            Some(PathBuf::from("/etc/supplier-portal/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// First of `paths` that loads, else defaults; env overrides apply to both
    pub fn load_first(paths: &[PathBuf]) -> (Self, LoadReport) {
        let mut skipped = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok((config, mut report)) => {
                    skipped.append(&mut report.warnings);
                    report.warnings = skipped;
                    return (config, report);
                }
                Err(e) => skipped.push(e.to_string()),
            }
        }

        let mut config = Config::default();
        skipped.extend(config.apply_env_overrides());
        (
            config,
            LoadReport {
                source: None,
                warnings: skipped,
            },
        )
    }

    /// Apply environment variable overrides; returns the ones ignored
    fn apply_env_overrides(&mut self) -> Vec<String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let mut ignored = Vec::new();
        if let Some(url) = lookup("PORTAL_API_URL") {
            self.api.base_url = url;
        }
        if let Some(path) = lookup("PORTAL_SESSION_PATH") {
            self.session.path = path;
        }
        if let Some(policy) = lookup("PORTAL_ADMIN_POLICY") {
            match policy.parse() {
                Ok(p) => self.guard.admin_policy = p,
                Err(e) => ignored.push(format!("Ignoring PORTAL_ADMIN_POLICY: {}", e)),
            }
        }
        if let Some(key) = lookup("PORTAL_ERP_API_KEY") {
            self.erp.api_key = key;
        }
        if let Some(level) = lookup("PORTAL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("PORTAL_LOG_FORMAT") {
            self.logging.format = format;
        }
        ignored
    }
}

/// How the config was resolved
///
/// Loading runs before the subscriber is installed, so messages are kept
/// here and emitted by [`LoadReport::log`] afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// File the config came from; `None` means defaults plus environment
    pub source: Option<PathBuf>,
    /// Skipped files and ignored overrides
    pub warnings: Vec<String>,
}

impl LoadReport {
    pub fn log(&self) {
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::debug!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Supplier Portal Configuration
#
# Environment variables override these settings:
# - PORTAL_API_URL
# - PORTAL_SESSION_PATH
# - PORTAL_ADMIN_POLICY
# - PORTAL_ERP_API_KEY
# - PORTAL_LOG_LEVEL
# - PORTAL_LOG_FORMAT

[api]
# Portal backend base URL (all routes are relative to it)
base_url = "http://localhost:8080/api"

# Request timeout in seconds
request_timeout_secs = 30

[session]
# Session file (token, supplier id, theme, quoted requests)
# path = "~/.local/share/supplier-portal/session.json"

[guard]
# Who may open /admin: role (admin role claim), token (any login), open
admin_policy = "role"

[erp]
# Static key sent as X-API-KEY to /erp/import
api_key = "secret-erp-key"

# Items generated by `admin erp-simulate`
simulate_count = 10

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.guard.admin_policy, AccessPolicy::Role);
        assert_eq!(config.erp.api_key, "secret-erp-key");
        assert_eq!(config.erp.simulate_count, 10);
        assert!(config.session.path.ends_with("session.json"));
    }

    #[test]
    fn test_generated_template_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.guard.admin_policy, AccessPolicy::Role);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r#"
            [guard]
            admin_policy = "open"

            [erp]
            api_key = "k"
            "#,
        )
        .unwrap();
        assert_eq!(config.guard.admin_policy, AccessPolicy::Open);
        assert_eq!(config.erp.api_key, "k");
        assert_eq!(config.erp.simulate_count, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PORTAL_API_URL", "http://portal.test/api"),
            ("PORTAL_ADMIN_POLICY", "token"),
            ("PORTAL_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        let ignored = config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert!(ignored.is_empty());

        assert_eq!(config.api.base_url, "http://portal.test/api");
        assert_eq!(config.guard.admin_policy, AccessPolicy::Token);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.erp.api_key, "secret-erp-key");
    }

    #[test]
    fn test_bad_policy_override_is_ignored() {
        let mut config = Config::default();
        let ignored =
            config.apply_overrides(|key| (key == "PORTAL_ADMIN_POLICY").then(|| "nobody".to_string()));
        assert_eq!(config.guard.admin_policy, AccessPolicy::Role);
        assert_eq!(ignored.len(), 1);
        assert!(ignored[0].starts_with("Ignoring PORTAL_ADMIN_POLICY"));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = 1").unwrap();

        match Config::load(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_first_skips_broken_file_and_reports_source() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("config.toml");
        std::fs::write(&broken, "[api\nbase_url = 1").unwrap();
        std::fs::write(&good, "[erp]\napi_key = \"from-file\"\n").unwrap();

        let (config, report) = Config::load_first(&[missing, broken.clone(), good.clone()]);

        assert_eq!(config.erp.api_key, "from-file");
        assert_eq!(report.source, Some(good));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("broken.toml"));
    }

    #[test]
    fn test_load_first_without_files_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, report) = Config::load_first(&[dir.path().join("none.toml")]);

        assert_eq!(report.source, None);
        assert_eq!(config.api.request_timeout_secs, 30);
    }
}
