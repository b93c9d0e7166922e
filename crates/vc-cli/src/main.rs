//! vconsole CLI
//!
//! Single binary for both ends of a framed echo exchange:
//! - Responder (mirrors one message back, typically inside the guest)
//! - Initiator (sends a payload and verifies the echo, typically on the host)
//! - Relay (bridges a host Unix socket to the console port)

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vc_core::config::{self, ConfigFile};
use vc_core::{EchoError, ErrorKind};
use vconsole::commands::{self, InitiateOptions, RespondOptions};
use vconsole::output::print_error;

#[derive(Parser)]
#[command(name = "vconsole")]
#[command(author, version, about = "Framed echo exchange over a virtio console port")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Receive one message and send it back unchanged
    Respond {
        /// Console port device (overrides config)
        #[arg(short, long)]
        device: Option<PathBuf>,
        /// Serve on a Unix socket instead of the console port
        #[arg(short, long, conflicts_with = "device")]
        listen: Option<PathBuf>,
        /// Write the received message to this file
        #[arg(long)]
        dump: Option<PathBuf>,
        /// Seconds to wait for the message (0 = unbounded)
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Milliseconds to wait after sending before releasing the port
        #[arg(long)]
        linger: Option<u64>,
    },

    /// Send a payload and verify the echoed content
    Initiate {
        /// Unix socket connected to the console port (overrides config)
        #[arg(short, long)]
        socket: Option<PathBuf>,
        /// Talk to a console port device directly
        #[arg(short, long, conflicts_with = "socket")]
        device: Option<PathBuf>,
        /// Payload size in bytes
        #[arg(long)]
        size: Option<usize>,
        /// Send random bytes instead of the text pattern
        #[arg(long)]
        random: bool,
        /// Send the contents of a file
        #[arg(long, conflicts_with_all = ["random", "size"])]
        file: Option<PathBuf>,
        /// Seconds to wait for the echo (0 = unbounded)
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Bridge a Unix socket to the console port until Ctrl-C
    Relay {
        /// Unix socket to listen on (overrides config)
        #[arg(short, long)]
        socket: Option<PathBuf>,
        /// Path to read console output from
        #[arg(long)]
        input: Option<PathBuf>,
        /// Path to write console input to
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show config directory path
    Path,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{:#}", e));
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Respond {
            device,
            listen,
            dump,
            timeout,
            linger,
        } => {
            let config = ConfigFile::load_or_default(cli.config.as_deref())?;
            let opts = RespondOptions {
                device,
                listen,
                dump,
                timeout_secs: timeout,
                linger_ms: linger,
            };
            commands::respond_command(config.responder, opts).await?;
        }

        Commands::Initiate {
            socket,
            device,
            size,
            random,
            file,
            timeout,
            json,
        } => {
            let config = ConfigFile::load_or_default(cli.config.as_deref())?;
            let opts = InitiateOptions {
                socket,
                device,
                size,
                random,
                file,
                timeout_secs: timeout,
                json,
            };
            commands::initiate_command(config.initiator, opts).await?;
        }

        Commands::Relay {
            socket,
            input,
            output,
        } => {
            let config = ConfigFile::load_or_default(cli.config.as_deref())?;
            commands::relay_command(config.relay, socket, input, output).await?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config_show(cli.config.as_ref())?;
            }
            ConfigAction::Init { force } => {
                commands::config_init(cli.config.as_ref(), force)?;
            }
            ConfigAction::Path => {
                let path = config::default_config_dir();
                println!("{}", path.display());
            }
        },
    }

    Ok(())
}

/// Map the failure to a process exit status
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<EchoError>().map(EchoError::kind) {
        Some(ErrorKind::Transport) => 2,
        Some(ErrorKind::Framing) => 3,
        Some(ErrorKind::Timeout) => 4,
        Some(ErrorKind::Verification) => 5,
        Some(ErrorKind::Config) | None => 1,
    }
}
