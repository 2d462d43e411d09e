//! Cache settings parsed from the `[cache]` table of `argus.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur when loading cache configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Cache settings controlling whether and where entries are persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether the analysis cache is used at all. When `false` every file
    /// is assigned the no-cache strategy.
    pub enabled: bool,

    /// Directory holding persisted cache entries, relative to the project
    /// root unless absolute.
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(".argus/cache"),
        }
    }
}

/// The subset of `argus.toml` this subsystem reads.
#[derive(Debug, Default, Deserialize)]
struct AnalyzerConfig {
    #[serde(default)]
    cache: CacheConfig,
}

/// Loads cache configuration from `<project_dir>/argus.toml`.
pub fn load_config(project_dir: &Path) -> Result<CacheConfig, ConfigError> {
    let config_path = project_dir.join("argus.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates cache configuration from TOML text.
///
/// Useful for testing without filesystem dependencies. A missing `[cache]`
/// table yields the defaults.
pub fn load_config_from_str(content: &str) -> Result<CacheConfig, ConfigError> {
    let config: AnalyzerConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config.cache)?;
    Ok(config.cache)
}

/// Validates that configuration values are usable.
fn validate_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "cache.dir must not be empty".to_string(),
        ));
    }
    Ok(())
}
