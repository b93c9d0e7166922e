//! Relay command: bridge a Unix socket to the console port

use std::path::PathBuf;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use vc_core::config::RelayConfig;
use vc_echo::ConsoleRelay;

/// Run the relay until Ctrl-C
pub async fn relay_command(
    mut config: RelayConfig,
    socket: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    if let Some(socket) = socket {
        config.socket_path = socket;
    }
    if let Some(input) = input {
        config.console_input = input;
    }
    if let Some(output) = output {
        config.console_output = output;
    }

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C");
        }
        shutdown.cancel();
    });

    ConsoleRelay::new(config, cancel).run().await?;
    Ok(())
}
