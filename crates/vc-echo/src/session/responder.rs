//! Responder role: receive one message and mirror it back

use bytes::Bytes;

use vc_core::config::ResponderConfig;
use vc_core::{EchoError, Endpoint};
use vc_protocol::{read_message_chunked, write_message};

use super::{bounded, finish};

/// Reads a framed message and sends the identical bytes back
pub struct Responder<E> {
    endpoint: E,
    config: ResponderConfig,
}

impl<E: Endpoint> Responder<E> {
    /// Create a responder on `endpoint`
    pub fn new(endpoint: E, config: ResponderConfig) -> Self {
        Self { endpoint, config }
    }

    /// Run one exchange, returning the message that was echoed
    ///
    /// The timeout covers everything that waits on the peer: opening (or
    /// accepting) the transport, reading the frame, reopening and writing the
    /// reply. Whatever transport is held when it fires is still closed.
    pub async fn run(&self) -> Result<Bytes, EchoError> {
        let mut slot = None;
        let echoed = bounded(self.config.timeout, self.exchange(&mut slot)).await;

        if echoed.is_ok() && !self.config.linger.is_zero() {
            tokio::time::sleep(self.config.linger).await;
        }

        let message = match slot.take() {
            Some(conn) => finish(conn, echoed).await?,
            None => echoed?,
        };
        tracing::info!(length = message.len(), "Echoed message");
        Ok(message)
    }

    async fn exchange(&self, slot: &mut Option<E::Conn>) -> Result<Bytes, EchoError> {
        tracing::debug!("Opening {}", self.endpoint.describe());
        let conn = slot.insert(self.endpoint.open().await?);
        let message = read_message_chunked(conn, self.config.chunk_size).await?;

        let conn = if self.config.reopen_for_reply {
            if let Some(read_side) = slot.take() {
                finish(read_side, Ok(())).await?;
            }
            self.dump(&message).await;
            tracing::debug!("Reopening {} for reply", self.endpoint.describe());
            slot.insert(self.endpoint.open().await?)
        } else {
            self.dump(&message).await;
            conn
        };
        tracing::info!(length = message.len(), "Received message");

        write_message(conn, &message).await?;
        Ok(message)
    }

    /// Best-effort copy of the received message for inspection
    async fn dump(&self, message: &[u8]) {
        let Some(path) = &self.config.dump_path else {
            return;
        };

        match tokio::fs::write(path, message).await {
            Ok(()) => tracing::debug!("Wrote received message to {:?}", path),
            Err(e) => tracing::warn!("Failed to write received message to {:?}: {}", path, e),
        }
    }
}
