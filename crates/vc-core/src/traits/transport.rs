//! Transport traits

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// An ordered, reliable byte stream owned by one session at a time
#[async_trait]
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {
    /// Human-readable description for logs
    fn describe(&self) -> String;

    /// Release the transport
    ///
    /// Every byte written so far has been handed to the peer side once this
    /// returns `Ok`: the default flushes and then shuts down the write half.
    async fn close(&mut self) -> std::io::Result<()> {
        self.flush().await?;
        self.shutdown().await
    }
}

/// Something a session can open a fresh transport on
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// The transport type produced by this endpoint
    type Conn: Transport;

    /// Open a new transport
    async fn open(&self) -> std::io::Result<Self::Conn>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

#[async_trait]
impl Transport for tokio::net::UnixStream {
    fn describe(&self) -> String {
        match self.peer_addr() {
            Ok(addr) => match addr.as_pathname() {
                Some(path) => format!("unix:{}", path.display()),
                None => "unix:(unnamed)".to_string(),
            },
            Err(_) => "unix:(disconnected)".to_string(),
        }
    }
}

#[async_trait]
impl Transport for tokio::io::DuplexStream {
    fn describe(&self) -> String {
        "duplex".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_close_delivers_written_bytes() {
        let (mut near, mut far) = tokio::io::duplex(4);

        let writer = tokio::spawn(async move {
            near.write_all(b"flushed before close").await.unwrap();
            near.close().await.unwrap();
        });

        let mut received = Vec::new();
        far.read_to_end(&mut received).await.unwrap();
        writer.await.unwrap();

        assert_eq!(received, b"flushed before close");
    }
}
