//! Protocol error types

use std::fmt;

use thiserror::Error;

/// Which part of a frame was being received when the stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    /// The 8-byte length prefix
    Length,
    /// The payload following the prefix
    Payload,
}

impl fmt::Display for FrameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameStage::Length => write!(f, "length prefix"),
            FrameStage::Payload => write!(f, "payload"),
        }
    }
}

/// Errors that can occur during protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Stream ended before a declared frame was fully delivered
    #[error("Truncated frame: stream ended in {stage} after {received} of {expected} bytes")]
    Truncated {
        stage: FrameStage,
        expected: u64,
        received: u64,
    },

    /// Declared payload cannot be held in memory or exceeds the codec limit
    #[error("Payload too large: {size} bytes exceeds maximum of {max} bytes")]
    PayloadTooLarge { size: u64, max: u64 },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// True for malformed or truncated frames, false for transport faults
    pub fn is_framing(&self) -> bool {
        !matches!(self, ProtocolError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let truncated = ProtocolError::Truncated {
            stage: FrameStage::Payload,
            expected: 10,
            received: 4,
        };
        assert!(truncated.is_framing());

        let io = ProtocolError::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(!io.is_framing());
    }

    #[test]
    fn test_truncated_display() {
        let err = ProtocolError::Truncated {
            stage: FrameStage::Length,
            expected: 8,
            received: 3,
        };
        assert_eq!(
            err.to_string(),
            "Truncated frame: stream ended in length prefix after 3 of 8 bytes"
        );
    }
}
