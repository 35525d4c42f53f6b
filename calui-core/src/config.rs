//! Global calui configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{CalUiError, CalUiResult};

const DEFAULT_THROTTLE_MS: u64 = 100;
static DEFAULT_LOG_LEVEL: &str = "warn";

fn default_throttle_ms() -> u64 {
    DEFAULT_THROTTLE_MS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Configuration at ~/.config/calui/config.toml
///
/// Every field has a default, so a missing or empty file is valid.
/// `CALUI_THROTTLE_MS` and `CALUI_LOG_LEVEL` override the file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct CalUiConfig {
    /// Minimum interval between two renders, in milliseconds.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CalUiConfig {
    fn default() -> Self {
        CalUiConfig {
            throttle_ms: DEFAULT_THROTTLE_MS,
            log_level: default_log_level(),
        }
    }
}

impl CalUiConfig {
    pub fn config_path() -> CalUiResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalUiError::Config("Could not determine config directory".into()))?
            .join("calui");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location. A missing file yields the defaults.
    pub fn load() -> CalUiResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> CalUiResult<Self> {
        let config: CalUiConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("CALUI").try_parsing(true))
            .build()
            .map_err(|e| CalUiError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalUiError::Config(e.to_string()))?;

        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalUiResult<()> {
        let contents = format!(
            "\
# calui configuration

# Minimum interval between renders, in milliseconds:
# throttle_ms = {DEFAULT_THROTTLE_MS}

# Log level when RUST_LOG is not set (error, warn, info, debug, trace):
# log_level = \"{DEFAULT_LOG_LEVEL}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalUiError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalUiError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
