//! Frame header encoding/decoding
//!
//! The frame format is a fixed 8-byte header followed by the payload:
//! - payload_length: 8 bytes (u64, big-endian)
//! - payload: exactly `payload_length` opaque bytes
//!
//! There is no version field, checksum or message-type tag.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::ProtocolError;

/// Size of the length prefix in bytes
pub const LENGTH_PREFIX_SIZE: usize = 8;

/// Upper bound on a single payload read
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Frame header carrying the payload length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Length of the payload in bytes
    pub payload_length: u64,
}

impl FrameHeader {
    /// Create a new frame header
    pub fn new(payload_length: u64) -> Self {
        Self { payload_length }
    }

    /// Header for the given payload
    pub fn for_payload(payload: &[u8]) -> Self {
        Self::new(payload.len() as u64)
    }

    /// Encode the header into a byte buffer
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(LENGTH_PREFIX_SIZE);
        dst.put_u64(self.payload_length);
    }

    /// Encode the header as a fixed array
    pub fn to_bytes(&self) -> [u8; LENGTH_PREFIX_SIZE] {
        self.payload_length.to_be_bytes()
    }

    /// Build a header from a complete length prefix
    pub fn from_bytes(bytes: [u8; LENGTH_PREFIX_SIZE]) -> Self {
        Self::new(u64::from_be_bytes(bytes))
    }

    /// Decode a header from a byte buffer
    ///
    /// Returns None if there aren't enough bytes in the buffer.
    pub fn decode(src: &mut BytesMut) -> Option<Self> {
        if src.len() < LENGTH_PREFIX_SIZE {
            return None;
        }
        Some(Self::new(src.get_u64()))
    }

    /// Payload length as an in-memory size
    ///
    /// Fails when the declared length does not fit in `usize` on this platform.
    pub fn payload_len(&self) -> Result<usize, ProtocolError> {
        usize::try_from(self.payload_length).map_err(|_| ProtocolError::PayloadTooLarge {
            size: self.payload_length,
            max: usize::MAX as u64,
        })
    }
}

/// Encode a message into its on-wire frame
pub fn encode(message: &[u8]) -> BytesMut {
    let mut dst = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + message.len());
    FrameHeader::for_payload(message).encode(&mut dst);
    dst.extend_from_slice(message);
    dst
}
