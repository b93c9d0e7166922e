//! Responder configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::serde_utils::{duration_millis, option_duration_secs};
use super::CONSOLE_PORT_NAME;

/// Configuration for the side that mirrors a message back
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Console port device to read from and reply on
    pub device_path: PathBuf,

    /// Close the read handle and open a fresh one for the reply
    pub reopen_for_reply: bool,

    /// Write the received message here for inspection
    pub dump_path: Option<PathBuf>,

    /// Maximum bytes per payload read
    pub chunk_size: usize,

    /// Bound on the wait for the incoming frame
    #[serde(with = "option_duration_secs")]
    pub timeout: Option<Duration>,

    /// Extra delay after the reply is flushed, before releasing the port
    #[serde(with = "duration_millis")]
    pub linger: Duration,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from("/dev/virtio-ports").join(CONSOLE_PORT_NAME),
            reopen_for_reply: true,
            dump_path: None,
            chunk_size: vc_protocol::DEFAULT_CHUNK_SIZE,
            timeout: None,
            linger: Duration::ZERO,
        }
    }
}
