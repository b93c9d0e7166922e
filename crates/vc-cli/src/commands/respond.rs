//! Respond command: mirror one message back to the sender

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::output::print_success;
use vc_core::config::ResponderConfig;
use vc_core::EchoError;
use vc_echo::{ConsoleEndpoint, Responder, UnixListenerEndpoint};

/// Command-line overrides for the responder
#[derive(Debug, Default)]
pub struct RespondOptions {
    pub device: Option<PathBuf>,
    pub listen: Option<PathBuf>,
    pub dump: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub linger_ms: Option<u64>,
}

/// Run one responder exchange
pub async fn respond_command(mut config: ResponderConfig, opts: RespondOptions) -> Result<()> {
    if let Some(device) = opts.device {
        config.device_path = device;
    }
    if let Some(dump) = opts.dump {
        config.dump_path = Some(dump);
    }
    if let Some(secs) = opts.timeout_secs {
        config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    if let Some(ms) = opts.linger_ms {
        config.linger = Duration::from_millis(ms);
    }

    let message = match opts.listen {
        Some(path) => {
            // A socket connection is already bidirectional
            config.reopen_for_reply = false;
            let endpoint = UnixListenerEndpoint::bind(&path)
                .map_err(EchoError::Transport)
                .with_context(|| format!("Failed to listen on {:?}", path))?;
            tracing::info!("Waiting for a connection on unix:{}", path.display());
            Responder::new(endpoint, config).run().await?
        }
        None => {
            let endpoint = ConsoleEndpoint::new(config.device_path.clone());
            Responder::new(endpoint, config).run().await?
        }
    };

    print_success(&format!("Echoed {} bytes", message.len()));
    Ok(())
}
