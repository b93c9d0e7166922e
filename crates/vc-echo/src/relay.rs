//! Console relay
//!
//! Listens on a Unix socket and bridges each accepted connection to the
//! console port, one connection at a time.

use std::io;

use bytes::{Buf, BytesMut};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;

use vc_core::config::RelayConfig;
use vc_core::EchoError;
use vc_protocol::DEFAULT_CHUNK_SIZE;

use crate::transport::remove_stale_socket;

/// Bytes moved across one bridged connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Socket to console
    pub to_console: u64,
    /// Console to socket
    pub to_socket: u64,
}

/// Bridges a local Unix socket to the console port
pub struct ConsoleRelay {
    /// Relay configuration
    config: RelayConfig,
    /// Cancellation token for graceful shutdown
    cancel: CancellationToken,
}

impl ConsoleRelay {
    /// Create a new relay
    pub fn new(config: RelayConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    /// Run until cancelled
    pub async fn run(&self) -> Result<(), EchoError> {
        let socket_path = &self.config.socket_path;
        remove_stale_socket(socket_path)?;

        let listener = UnixListener::bind(socket_path).map_err(|e| {
            tracing::error!("Failed to bind console on unix:{}: {}", socket_path.display(), e);
            EchoError::Transport(e)
        })?;
        tracing::info!("Console listening on unix:{}", socket_path.display());

        let result = self.serve(&listener).await;

        drop(listener);
        match std::fs::remove_file(socket_path) {
            Ok(()) => tracing::info!("Console closed unix:{}", socket_path.display()),
            Err(e) => tracing::warn!(
                "Failed to close console unix:{}: {}",
                socket_path.display(),
                e
            ),
        }
        result
    }

    async fn serve(&self, listener: &UnixListener) -> Result<(), EchoError> {
        let mut console = tokio::select! {
            _ = self.cancel.cancelled() => return Ok(()),
            console = ConsoleSide::open(&self.config) => console.map_err(EchoError::Transport)?,
        };

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Console relay shutting down");
                    return Ok(());
                }

                result = listener.accept() => {
                    match result {
                        Ok((stream, _)) => {
                            tracing::info!("New console connection");
                            match self.bridge(stream, &mut console).await {
                                Ok(stats) => tracing::info!(
                                    to_console = stats.to_console,
                                    to_socket = stats.to_socket,
                                    "Console connection closed"
                                ),
                                Err(e) => tracing::warn!("Error in console bridge: {}", e),
                            }
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }
    }

    /// Copy bytes both ways until the client finishes sending
    ///
    /// End of stream from the console half-closes the socket. End of stream
    /// from the client flushes the console and ends the bridge: a Unix socket
    /// reader cannot tell a half-close from a full close. Console bytes not yet
    /// written to this client stay in `console` for the next one.
    async fn bridge(
        &self,
        stream: UnixStream,
        console: &mut ConsoleSide,
    ) -> io::Result<BridgeStats> {
        let ConsoleSide {
            input,
            output,
            pending,
        } = console;
        let (mut sock_read, mut sock_write) = stream.into_split();

        let to_console = async {
            let n = tokio::io::copy(&mut sock_read, output).await?;
            output.flush().await?;
            Ok::<_, io::Error>(n)
        };
        // Both awaits are cancel safe: an interrupted console read keeps its
        // bytes inside the file handle, and an interrupted write sends nothing.
        let to_socket = async {
            let mut total = 0u64;
            loop {
                if pending.is_empty() {
                    pending.reserve(DEFAULT_CHUNK_SIZE);
                    if input.read_buf(pending).await? == 0 {
                        break;
                    }
                }
                let n = sock_write.write(&pending[..]).await?;
                if n == 0 {
                    return Err(io::ErrorKind::WriteZero.into());
                }
                pending.advance(n);
                total += n as u64;
            }
            sock_write.shutdown().await?;
            Ok::<_, io::Error>(total)
        };
        tokio::pin!(to_console);
        tokio::pin!(to_socket);

        let mut stats = BridgeStats::default();
        let mut console_done = false;
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Console bridge cancelled");
                    break;
                }
                result = &mut to_console => {
                    stats.to_console = result?;
                    break;
                }
                result = &mut to_socket, if !console_done => {
                    stats.to_socket = result?;
                    console_done = true;
                    tracing::debug!("Console reached end of stream");
                }
            }
        }

        Ok(stats)
    }
}

/// Console handles shared by every bridged connection
///
/// Opened once so a read still in flight when a client leaves is delivered
/// to the next client instead of being dropped with a per-connection handle.
struct ConsoleSide {
    input: File,
    output: File,
    pending: BytesMut,
}

impl ConsoleSide {
    async fn open(config: &RelayConfig) -> io::Result<Self> {
        let input = File::open(&config.console_input).await?;
        let output = OpenOptions::new()
            .write(true)
            .open(&config.console_output)
            .await?;
        tracing::debug!(
            "Opened console input {:?} and output {:?}",
            config.console_input,
            config.console_output
        );
        Ok(Self {
            input,
            output,
            pending: BytesMut::new(),
        })
    }
}
