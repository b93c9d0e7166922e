//! Configuration management for vconsole

mod initiator;
mod relay;
mod responder;
pub mod serde_utils;

pub use initiator::InitiatorConfig;
pub use relay::RelayConfig;
pub use responder::ResponderConfig;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Name of the virtio console port shared by host and guest
pub const CONSOLE_PORT_NAME: &str = "tart-agent";

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vconsole")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Default host-side socket bridged to the console port
pub fn default_socket_path() -> PathBuf {
    default_config_dir().join(format!("{}.sock", CONSOLE_PORT_NAME))
}

/// Top-level configuration file with one section per role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub responder: ResponderConfig,
    pub initiator: InitiatorConfig,
    pub relay: RelayConfig,
}

impl ConfigFile {
    /// Load from `path`, or the default path; missing files yield defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        match load_config(&path) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => {
                tracing::debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}
