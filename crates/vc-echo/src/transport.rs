//! Concrete transports and endpoints
//!
//! The framing layer does not care which of these it runs over.

use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;

use vc_core::{Endpoint, Transport};

/// A virtio console port (or any file-like character device)
#[derive(Debug)]
pub struct ConsolePort {
    path: PathBuf,
    file: File,
}

impl ConsolePort {
    /// Open the port for reading and writing
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .await?;
        Ok(Self { path, file })
    }

    /// Path of the underlying device
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsyncRead for ConsolePort {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}

impl AsyncWrite for ConsolePort {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.file).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_shutdown(cx)
    }
}

#[async_trait]
impl Transport for ConsolePort {
    fn describe(&self) -> String {
        format!("console:{}", self.path.display())
    }
}

/// Opens the console port at a fixed path
#[derive(Debug, Clone)]
pub struct ConsoleEndpoint {
    path: PathBuf,
}

impl ConsoleEndpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Endpoint for ConsoleEndpoint {
    type Conn = ConsolePort;

    async fn open(&self) -> io::Result<ConsolePort> {
        ConsolePort::open(&self.path).await
    }

    fn describe(&self) -> String {
        format!("console:{}", self.path.display())
    }
}

/// Connects to a Unix socket
#[derive(Debug, Clone)]
pub struct UnixEndpoint {
    path: PathBuf,
}

impl UnixEndpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Endpoint for UnixEndpoint {
    type Conn = UnixStream;

    async fn open(&self) -> io::Result<UnixStream> {
        UnixStream::connect(&self.path).await
    }

    fn describe(&self) -> String {
        format!("unix:{}", self.path.display())
    }
}

/// Accepts one incoming connection per `open`
#[derive(Debug)]
pub struct UnixListenerEndpoint {
    path: PathBuf,
    listener: Mutex<UnixListener>,
}

impl UnixListenerEndpoint {
    /// Bind at `path`, replacing a stale socket file
    pub fn bind(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        remove_stale_socket(&path)?;
        let listener = UnixListener::bind(&path)?;
        Ok(Self {
            path,
            listener: Mutex::new(listener),
        })
    }

    /// Path the listener is bound to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Endpoint for UnixListenerEndpoint {
    type Conn = UnixStream;

    async fn open(&self) -> io::Result<UnixStream> {
        let listener = self.listener.lock().await;
        let (stream, _) = listener.accept().await?;
        Ok(stream)
    }

    fn describe(&self) -> String {
        format!("unix-listen:{}", self.path.display())
    }
}

impl Drop for UnixListenerEndpoint {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Remove a leftover socket file so a fresh bind can succeed
pub(crate) fn remove_stale_socket(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Removed stale socket {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
