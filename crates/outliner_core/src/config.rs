//! Client configuration.
//!
//! # Responsibility
//! - Hold endpoint, timeout, traversal and logging settings.
//! - Load overrides from environment variables or a JSON document.
//!
//! # Invariants
//! - A config returned by any constructor has passed `validate()`.

use crate::error::{OutlineError, OutlineResult};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://workflowy.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CLIENT_VERSION: u32 = 21;
pub const DEFAULT_MAX_DEPTH: usize = 512;

const ENV_BASE_URL: &str = "OUTLINER_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "OUTLINER_TIMEOUT_SECS";
const ENV_LOG_LEVEL: &str = "OUTLINER_LOG_LEVEL";
const ENV_LOG_DIR: &str = "OUTLINER_LOG_DIR";

/// Logging settings consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rotated log files. `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Remote client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Service origin without trailing slash.
    pub base_url: String,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout_secs: u64,
    /// Protocol version sent with every request.
    pub client_version: u32,
    /// Deepest nesting accepted when building an outline.
    pub max_depth: usize,
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            client_version: DEFAULT_CLIENT_VERSION,
            max_depth: DEFAULT_MAX_DEPTH,
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `OUTLINER_*` environment variables.
    pub fn from_env() -> OutlineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parses a JSON document; absent keys keep their defaults.
    pub fn from_json_str(text: &str) -> OutlineResult<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|err| OutlineError::Validation(format!("invalid config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges and normalizes the base url.
    pub fn validate(&self) -> OutlineResult<()> {
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(OutlineError::Validation(format!(
                "base_url must start with http:// or https://, got `{base_url}`"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(OutlineError::Validation(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(OutlineError::Validation(
                "max_depth must be greater than zero".to_string(),
            ));
        }
        crate::logging::normalize_level(&self.logging.level).map_err(OutlineError::Validation)?;
        Ok(())
    }

    /// Endpoint url for one service path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim().trim_end_matches('/'), path)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> OutlineResult<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_BASE_URL) {
            config.base_url = value;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = value.trim().parse().map_err(|_| {
                OutlineError::Validation(format!("{ENV_TIMEOUT_SECS} must be an integer"))
            })?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.logging.level = value;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            config.logging.log_dir = Some(PathBuf::from(value));
        }
        config.validate()?;
        Ok(config)
    }
}
