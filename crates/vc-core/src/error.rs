//! Core error types for vconsole

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use vc_protocol::ProtocolError;

use crate::digest::ContentDigest;

/// Coarse classification of an [`EchoError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Framing,
    Timeout,
    Verification,
    Config,
}

/// Errors surfaced by an echo exchange
#[derive(Error, Debug)]
pub enum EchoError {
    /// Underlying stream I/O failed (open, connect, read, write or close)
    #[error("Transport error: {0}")]
    Transport(#[source] std::io::Error),

    /// Stream ended before a declared frame was fully delivered
    #[error("Framing error: {0}")]
    Framing(#[source] ProtocolError),

    /// Bounded wait for the peer elapsed
    #[error("Timed out after {0:?} waiting for peer")]
    Timeout(Duration),

    /// Echoed content does not match what was sent
    #[error(
        "Verification failed: sent {expected_len} bytes ({expected}), received {actual_len} bytes ({actual})"
    )]
    Verification {
        expected: ContentDigest,
        actual: ContentDigest,
        expected_len: usize,
        actual_len: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EchoError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EchoError::Transport(_) => ErrorKind::Transport,
            EchoError::Framing(_) => ErrorKind::Framing,
            EchoError::Timeout(_) => ErrorKind::Timeout,
            EchoError::Verification { .. } => ErrorKind::Verification,
            EchoError::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<ProtocolError> for EchoError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => EchoError::Transport(e),
            other => EchoError::Framing(other),
        }
    }
}

impl From<std::io::Error> for EchoError {
    fn from(err: std::io::Error) -> Self {
        EchoError::Transport(err)
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
