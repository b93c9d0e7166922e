//! Relay configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the host-side socket to console bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Unix socket to listen on
    pub socket_path: PathBuf,

    /// Path the relay reads console output from
    pub console_input: PathBuf,

    /// Path the relay writes console input to
    pub console_output: PathBuf,
}

impl Default for RelayConfig {
    fn default() -> Self {
        let config_dir = super::default_config_dir();

        Self {
            socket_path: super::default_socket_path(),
            console_input: config_dir.join("console.out"),
            console_output: config_dir.join("console.in"),
        }
    }
}
