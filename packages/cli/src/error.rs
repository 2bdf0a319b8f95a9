use thiserror::Error;

use otr_api::ConfigError;
use otr_gate::GateError;
use otr_storage::StorageError;

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Registration gate error: {0}")]
    Gate(#[from] GateError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type CliResult<T> = Result<T, CliError>;
