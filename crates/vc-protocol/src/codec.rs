//! Tokio codec for length-prefixed frames

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{FrameStage, ProtocolError};
use crate::frame::{FrameHeader, LENGTH_PREFIX_SIZE};

/// Codec for encoding/decoding length-prefixed frames
#[derive(Debug, Default)]
pub struct FrameCodec {
    /// Current header being decoded (if any)
    pending_header: Option<FrameHeader>,
    /// Optional bound on accepted payloads
    max_payload: Option<u64>,
}

impl FrameCodec {
    /// Create a new codec with no payload bound
    pub fn new() -> Self {
        Self {
            pending_header: None,
            max_payload: None,
        }
    }

    /// Reject payloads larger than `max` bytes in both directions
    pub fn with_max_payload(max: u64) -> Self {
        Self {
            pending_header: None,
            max_payload: Some(max),
        }
    }

    fn check_size(&self, size: u64) -> Result<(), ProtocolError> {
        match self.max_payload {
            Some(max) if size > max => Err(ProtocolError::PayloadTooLarge { size, max }),
            _ => Ok(()),
        }
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let header = match self.pending_header.take() {
            Some(h) => h,
            None => match FrameHeader::decode(src) {
                Some(h) => h,
                None => return Ok(None), // Need more data
            },
        };

        self.check_size(header.payload_length)?;
        let payload_len = header.payload_len()?;

        if src.len() < payload_len {
            // Save header and wait for more data
            self.pending_header = Some(header);
            return Ok(None);
        }

        Ok(Some(src.split_to(payload_len).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        match self.pending_header.take() {
            Some(header) => Err(ProtocolError::Truncated {
                stage: FrameStage::Payload,
                expected: header.payload_length,
                received: src.len() as u64,
            }),
            None if src.is_empty() => Ok(None),
            None => Err(ProtocolError::Truncated {
                stage: FrameStage::Length,
                expected: LENGTH_PREFIX_SIZE as u64,
                received: src.len() as u64,
            }),
        }
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let header = FrameHeader::for_payload(&payload);
        self.check_size(header.payload_length)?;

        dst.reserve(LENGTH_PREFIX_SIZE + payload.len());
        header.encode(dst);
        dst.extend_from_slice(&payload);

        Ok(())
    }
}
