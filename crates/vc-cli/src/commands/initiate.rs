//! Initiate command: send a payload and verify the echo

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::output::{format_report, print_success};
use vc_core::config::InitiatorConfig;
use vc_core::ContentSource;
use vc_echo::{ConsoleEndpoint, Initiator, UnixEndpoint};

/// Command-line overrides for the initiator
#[derive(Debug, Default)]
pub struct InitiateOptions {
    pub socket: Option<PathBuf>,
    pub device: Option<PathBuf>,
    pub size: Option<usize>,
    pub random: bool,
    pub file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub json: bool,
}

/// Run one initiator exchange
pub async fn initiate_command(mut config: InitiatorConfig, opts: InitiateOptions) -> Result<()> {
    if let Some(socket) = opts.socket.clone() {
        config.socket_path = socket;
    }
    if let Some(secs) = opts.timeout_secs {
        config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    config.content = content_override(config.content, &opts);

    let report = match opts.device {
        Some(device) => {
            Initiator::from_config(ConsoleEndpoint::new(device), &config)
                .run_with(&config.content)
                .await?
        }
        None => {
            Initiator::from_config(UnixEndpoint::new(config.socket_path.clone()), &config)
                .run_with(&config.content)
                .await?
        }
    };

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_success(&format!("Echo verified: {} bytes", report.received_len));
        println!("{}", format_report(&report));
    }
    Ok(())
}

/// Apply `--file`, `--random` and `--size` to the configured source
fn content_override(current: ContentSource, opts: &InitiateOptions) -> ContentSource {
    if let Some(path) = &opts.file {
        return ContentSource::File { path: path.clone() };
    }

    let configured_size = match &current {
        ContentSource::Pattern { size, .. } | ContentSource::Random { size } => Some(*size),
        ContentSource::File { .. } => None,
    };

    if opts.random {
        let size = opts
            .size
            .or(configured_size)
            .unwrap_or(vc_core::content::DEFAULT_CONTENT_SIZE);
        return ContentSource::Random { size };
    }

    match (current, opts.size) {
        (ContentSource::Pattern { text, .. }, Some(size)) => ContentSource::Pattern { text, size },
        (ContentSource::Random { .. }, Some(size)) => ContentSource::Random { size },
        (ContentSource::File { .. }, Some(size)) => ContentSource::Pattern {
            text: vc_core::content::DEFAULT_PATTERN.to_string(),
            size,
        },
        (current, None) => current,
    }
}
