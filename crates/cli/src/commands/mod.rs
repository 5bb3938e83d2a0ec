//! Subcommand implementations.

pub mod orders;
pub mod setup;
pub mod stats;

use thiserror::Error;
use woo_orders_client::{ClientConfig, ConfigError, WooClient, WooError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Woo(#[from] WooError),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    /// Setup was run without all three credential fields.
    #[error("Missing {0}: pass it as a flag or set {1}")]
    MissingField(&'static str, &'static str),

    #[error("Could not connect to the store with these credentials")]
    ConnectionFailed,
}

/// Build the client from the environment.
pub fn client() -> Result<WooClient, CommandError> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(config_dir = %config.config_dir.display(), "Loaded configuration");
    Ok(WooClient::new(&config)?)
}
