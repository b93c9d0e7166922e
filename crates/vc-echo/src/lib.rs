//! vc-echo: Echo sessions over a virtio console port
//!
//! A responder reads one framed message and mirrors it back; an initiator
//! sends a payload, reads the echo and verifies it by digest. The relay
//! bridges a local Unix socket to the console port so the initiator can
//! reach a responder running inside the guest.

pub mod relay;
pub mod session;
pub mod transport;

pub use relay::ConsoleRelay;
pub use session::{EchoReport, Initiator, Responder};
pub use transport::{ConsoleEndpoint, ConsolePort, UnixEndpoint, UnixListenerEndpoint};
