//! Blocking-style message transfer over async byte streams
//!
//! `write_message` and `read_message` each transfer exactly one frame and
//! only return once the whole frame has moved (or the stream has failed).
//! Short reads and short writes from the underlying transport are absorbed
//! here and never surface to the caller.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{FrameStage, ProtocolError};
use crate::frame::{FrameHeader, DEFAULT_CHUNK_SIZE, LENGTH_PREFIX_SIZE};

/// Cap on the buffer reserved up front for a declared payload.
/// Larger payloads grow the buffer as bytes actually arrive.
const MAX_PREALLOC: usize = 1024 * 1024;

/// Progress of a single frame read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// Nothing received yet
    AwaitingLength,
    /// Part of the length prefix received
    AccumulatingLength(usize),
    /// Length prefix decoded
    LengthComplete(u64),
    /// Part of the payload received
    AccumulatingPayload { received: u64, expected: u64 },
    /// Whole frame received
    PayloadComplete,
    /// The read failed; the stream position is undefined
    Failed,
}

/// Reads length-prefixed messages from a byte stream
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
    chunk_size: usize,
    state: ReadState,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Create a reader using the default chunk size
    pub fn new(inner: R) -> Self {
        Self::with_chunk_size(inner, DEFAULT_CHUNK_SIZE)
    }

    /// Create a reader issuing payload reads of at most `chunk_size` bytes
    pub fn with_chunk_size(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.max(1),
            state: ReadState::AwaitingLength,
        }
    }

    /// Current state of the last (or ongoing) read
    pub fn state(&self) -> ReadState {
        self.state
    }

    /// Get a reference to the underlying stream
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the underlying stream
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader, returning the underlying stream
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read the next complete message
    pub async fn read_message(&mut self) -> Result<Bytes, ProtocolError> {
        match self.read_frame().await {
            Ok(message) => Ok(message),
            Err(e) => {
                self.transition(ReadState::Failed);
                Err(e)
            }
        }
    }

    async fn read_frame(&mut self) -> Result<Bytes, ProtocolError> {
        self.transition(ReadState::AwaitingLength);

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let mut filled = 0;
        while filled < LENGTH_PREFIX_SIZE {
            let n = self.inner.read(&mut prefix[filled..]).await?;
            if n == 0 {
                return Err(ProtocolError::Truncated {
                    stage: FrameStage::Length,
                    expected: LENGTH_PREFIX_SIZE as u64,
                    received: filled as u64,
                });
            }
            filled += n;
            if filled < LENGTH_PREFIX_SIZE {
                self.transition(ReadState::AccumulatingLength(filled));
            }
        }

        let header = FrameHeader::from_bytes(prefix);
        self.transition(ReadState::LengthComplete(header.payload_length));
        tracing::debug!(length = header.payload_length, "Expected message length");

        let expected = header.payload_len()?;
        let mut message = BytesMut::with_capacity(expected.min(MAX_PREALLOC));
        let mut chunk = vec![0u8; self.chunk_size.min(expected)];

        while message.len() < expected {
            let want = (expected - message.len()).min(chunk.len());
            let n = self.inner.read(&mut chunk[..want]).await?;
            if n == 0 {
                return Err(ProtocolError::Truncated {
                    stage: FrameStage::Payload,
                    expected: header.payload_length,
                    received: message.len() as u64,
                });
            }
            message.extend_from_slice(&chunk[..n]);
            self.transition(ReadState::AccumulatingPayload {
                received: message.len() as u64,
                expected: header.payload_length,
            });
        }

        self.transition(ReadState::PayloadComplete);
        Ok(message.freeze())
    }

    fn transition(&mut self, next: ReadState) {
        tracing::trace!(from = ?self.state, to = ?next, "Frame read state");
        self.state = next;
    }
}

/// Read one message using the default chunk size
pub async fn read_message<R>(reader: &mut R) -> Result<Bytes, ProtocolError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    read_message_chunked(reader, DEFAULT_CHUNK_SIZE).await
}

/// Read one message issuing payload reads of at most `chunk_size` bytes
pub async fn read_message_chunked<R>(
    reader: &mut R,
    chunk_size: usize,
) -> Result<Bytes, ProtocolError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    FrameReader::with_chunk_size(reader, chunk_size)
        .read_message()
        .await
}

/// Write one message as a complete frame and flush the stream
pub async fn write_message<W>(writer: &mut W, message: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let header = FrameHeader::for_payload(message);
    tracing::debug!(length = header.payload_length, "Send message length");

    writer.write_all(&header.to_bytes()).await?;
    writer.write_all(message).await?;
    writer.flush().await?;
    Ok(())
}
