//! vconsole: Command-line interface for framed console echo
//!
//! Provides the `vconsole` CLI for running either side of an echo
//! exchange and the host-side console relay.

pub mod commands;
pub mod output;
