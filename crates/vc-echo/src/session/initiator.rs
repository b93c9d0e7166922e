//! Initiator role: send a payload and verify the echo

use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::Serialize;

use vc_core::config::InitiatorConfig;
use vc_core::{ContentDigest, ContentSource, EchoError, Endpoint};
use vc_protocol::{read_message_chunked, write_message, DEFAULT_CHUNK_SIZE};

use super::{bounded, finish};

/// Outcome of a verified exchange
#[derive(Debug, Clone, Serialize)]
pub struct EchoReport {
    /// Bytes sent
    pub sent_len: usize,
    /// Bytes received back
    pub received_len: usize,
    /// Digest shared by both
    pub digest: ContentDigest,
    /// Wall time of the exchange in milliseconds
    pub elapsed_ms: u64,
}

/// Sends a payload, reads the echo and checks it matches
pub struct Initiator<E> {
    endpoint: E,
    timeout: Option<Duration>,
    chunk_size: usize,
}

impl<E: Endpoint> Initiator<E> {
    /// Create an initiator with no timeout
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            timeout: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Create an initiator using timeout and chunk size from `config`
    pub fn from_config(endpoint: E, config: &InitiatorConfig) -> Self {
        Self {
            endpoint,
            timeout: config.timeout,
            chunk_size: config.chunk_size,
        }
    }

    /// Bound the wait for the peer
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generate a payload from `source` and run the exchange
    pub async fn run_with(&self, source: &ContentSource) -> Result<EchoReport, EchoError> {
        let payload = source.generate()?;
        self.run(&payload).await
    }

    /// Run one exchange with `payload`
    pub async fn run(&self, payload: &[u8]) -> Result<EchoReport, EchoError> {
        let started = Instant::now();
        let expected = ContentDigest::of(payload);
        tracing::info!(length = payload.len(), digest = %expected, "Sending payload");

        let mut slot = None;
        let exchanged = bounded(self.timeout, self.exchange(&mut slot, payload)).await;
        let received = match slot.take() {
            Some(conn) => finish(conn, exchanged).await?,
            None => exchanged?,
        };

        let actual = ContentDigest::of(&received);
        if actual != expected || received.len() != payload.len() {
            tracing::warn!(
                sent = payload.len(),
                received = received.len(),
                "Echo does not match payload"
            );
            return Err(EchoError::Verification {
                expected,
                actual,
                expected_len: payload.len(),
                actual_len: received.len(),
            });
        }

        let report = EchoReport {
            sent_len: payload.len(),
            received_len: received.len(),
            digest: actual,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        tracing::info!(length = report.received_len, digest = %report.digest, "Echo verified");
        Ok(report)
    }

    async fn exchange(
        &self,
        slot: &mut Option<E::Conn>,
        payload: &[u8],
    ) -> Result<Bytes, EchoError> {
        tracing::debug!("Opening {}", self.endpoint.describe());
        let conn = slot.insert(self.endpoint.open().await?);
        write_message(conn, payload).await?;
        Ok(read_message_chunked(conn, self.chunk_size).await?)
    }
}
