//! Settings for Graft.
//!
//! Settings load from a single YAML file (conventionally `graft.yaml`). Every
//! field has a default, so an empty file is a valid configuration.
//!
//! ```yaml
//! diagnostics:
//!   warn_missing_data: true
//!   warn_unfetched_data: false
//! logging:
//!   filter: "graft=debug,info"
//! ```

pub mod diagnostics;
pub mod logging;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use diagnostics::DiagnosticsConfig;
pub use logging::LoggingConfig;

/// Complete Graft configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraftConfig {
    /// Which resolution warnings are logged.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

impl GraftConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "logging.filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
