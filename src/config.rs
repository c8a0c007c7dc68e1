//! Validator configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to its
//! default.
//!
//! ```json
//! {
//!   "lookup_timeout_ms": 5000,
//!   "binary_encoding": "base64",
//!   "enforce_normalized_label": true,
//!   "enforce_subdomain_rules": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::document::BinaryEncoding;
use crate::observability::{log_event_with_fields, Event};

/// Configuration errors. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Validation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Upper bound for each state repository lookup
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// Transport encoding of binary fields in JSON input
    #[serde(default)]
    pub binary_encoding: BinaryEncoding,

    /// Require `normalizedLabel` to equal the lower-cased `label`
    #[serde(default = "default_true")]
    pub enforce_normalized_label: bool,

    /// Consult the parent domain's `allowSubdomains` flag
    #[serde(default)]
    pub enforce_subdomain_rules: bool,
}

fn default_lookup_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: default_lookup_timeout_ms(),
            binary_encoding: BinaryEncoding::default(),
            enforce_normalized_label: true,
            enforce_subdomain_rules: false,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: ValidatorConfig = serde_json::from_str(&content)?;
        config.validate()?;

        let shown_path = path.display().to_string();
        let timeout = config.lookup_timeout_ms.to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", shown_path.as_str()), ("lookup_timeout_ms", timeout.as_str())],
        );

        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::Invalid("lookup_timeout_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout_ms = u64::try_from(timeout.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        self
    }

    pub fn with_subdomain_rules(mut self, enforce: bool) -> Self {
        self.enforce_subdomain_rules = enforce;
        self
    }

    pub fn with_normalized_label_check(mut self, enforce: bool) -> Self {
        self.enforce_normalized_label = enforce;
        self
    }
}
