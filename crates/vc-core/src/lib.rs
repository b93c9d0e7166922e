//! vc-core: Core abstractions and configuration for vconsole
//!
//! This crate provides the error taxonomy, configuration structures,
//! content digests and the transport trait shared by the echo session
//! and the command-line front end.

pub mod config;
pub mod content;
pub mod digest;
pub mod error;
pub mod traits;

pub use content::ContentSource;
pub use digest::ContentDigest;
pub use error::{ConfigError, EchoError, ErrorKind};
pub use traits::{Endpoint, Transport};
