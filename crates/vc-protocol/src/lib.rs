//! vc-protocol: Length-prefixed framing for vconsole
//!
//! Each message travels as an 8-byte big-endian length followed by exactly
//! that many opaque payload bytes. This crate turns messages into frames and
//! back again over any ordered byte stream, whether a virtio console port
//! or a local socket.

pub mod codec;
pub mod error;
pub mod frame;
pub mod io;

pub use codec::FrameCodec;
pub use error::{FrameStage, ProtocolError};
pub use frame::{encode, FrameHeader, DEFAULT_CHUNK_SIZE, LENGTH_PREFIX_SIZE};
pub use io::{read_message, read_message_chunked, write_message, FrameReader, ReadState};
