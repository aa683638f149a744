pub mod settings;

pub use settings::{
    ArtifactConfig, AuthorityConfig, EdgeConfig, GatewayConfig, InferenceConfig, RelayConfig,
    DEFAULT_MAX_BODY_BYTES, GATEWAY_PORT,
};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file location: ~/.edgefaas/config.yaml
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".edgefaas")
        .join("config.yaml")
}

/// Errors for file I/O operations (separate from pure parsing errors)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

// ============================================================================
// SBIO: Pure parsing (no I/O)
// ============================================================================

impl EdgeConfig {
    /// Parse a YAML (or JSON) config document. Missing sections take defaults.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// ============================================================================
// SBIO: I/O wrapper - thin layer over pure functions
// ============================================================================

/// Load and parse a config file from disk.
pub fn load_config_file(path: &Path) -> Result<EdgeConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    EdgeConfig::from_str(&content)
}

/// Load the config from an explicit path, or from the default location.
///
/// An explicit path must exist. A missing default file yields the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<EdgeConfig, ConfigError> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            load_config_file(path)
        }
        None => {
            let path = default_config_path();
            if path.exists() {
                load_config_file(&path)
            } else {
                Ok(EdgeConfig::default())
            }
        }
    }
}
