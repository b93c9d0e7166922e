//! Core trait definitions

mod transport;

pub use transport::{Endpoint, Transport};
