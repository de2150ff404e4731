//! Error types for the simulator engine.

use std::path::PathBuf;

use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn writer thread: {source}")]
    Spawn { source: std::io::Error },

    #[error("Writer thread did not stop within {timeout_ms} ms")]
    ShutdownTimeout { timeout_ms: u64 },
}

impl From<tx_core::TxError> for SimError {
    fn from(e: tx_core::TxError) -> Self {
        SimError::Config {
            message: e.to_string(),
        }
    }
}
