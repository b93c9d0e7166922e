//! CLI command implementations

mod config;
mod initiate;
mod relay;
mod respond;

pub use config::{config_init, config_show, generate_default_config};
pub use initiate::{initiate_command, InitiateOptions};
pub use relay::relay_command;
pub use respond::{respond_command, RespondOptions};
