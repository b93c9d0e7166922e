//! Initiator configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::serde_utils::option_duration_secs;
use crate::content::ContentSource;

/// Configuration for the side that sends a payload and verifies the echo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InitiatorConfig {
    /// Local socket connected to the console port
    pub socket_path: PathBuf,

    /// Bound on the whole exchange
    #[serde(with = "option_duration_secs")]
    pub timeout: Option<Duration>,

    /// Maximum bytes per payload read
    pub chunk_size: usize,

    /// Payload to send
    pub content: ContentSource,
}

impl Default for InitiatorConfig {
    fn default() -> Self {
        Self {
            socket_path: super::default_socket_path(),
            timeout: Some(Duration::from_secs(120)),
            chunk_size: vc_protocol::DEFAULT_CHUNK_SIZE,
            content: ContentSource::default(),
        }
    }
}
