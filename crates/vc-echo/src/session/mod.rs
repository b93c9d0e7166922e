//! Echo sessions
//!
//! Each session owns exactly one transport at a time and releases it on
//! every exit path before an error propagates.

mod initiator;
mod responder;

pub use initiator::{EchoReport, Initiator};
pub use responder::Responder;

use std::future::Future;
use std::time::Duration;

use vc_core::{EchoError, Transport};

/// Run `fut`, failing with `Timeout` if `limit` elapses first
pub(crate) async fn bounded<T, F>(limit: Option<Duration>, fut: F) -> Result<T, EchoError>
where
    F: Future<Output = Result<T, EchoError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| EchoError::Timeout(limit))?,
        None => fut.await,
    }
}

/// Close `conn`, then hand back `result`
///
/// A close failure only surfaces when `result` itself succeeded.
pub(crate) async fn finish<C, T>(mut conn: C, result: Result<T, EchoError>) -> Result<T, EchoError>
where
    C: Transport,
{
    let peer = conn.describe();
    let closed = conn.close().await;
    tracing::debug!("Released transport {}", peer);

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(EchoError::Transport(e)),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            tracing::warn!("Failed to close {} after error: {}", peer, close_err);
            Err(e)
        }
    }
}
