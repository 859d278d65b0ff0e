// Error types for drover

use std::io;
use std::time::Duration;

use thiserror::Error;

/// All error types in drover.
///
/// Per-host execution errors never cross task boundaries: the batch
/// dispatcher converts them into outcome messages and keeps going, so a
/// batch never fails fast.
#[derive(Debug, Error)]
pub enum DroverError {
    #[error("failed to launch command on {host}: {source}")]
    Launch { host: String, source: io::Error },

    #[error("command on {host} exited with code {code}")]
    NonZeroExit { host: String, code: i32 },

    #[error("command on {host} timed out after {timeout:?}")]
    Timeout { host: String, timeout: Duration },

    #[error("command for {host} resolved to an empty argument vector")]
    EmptyCommand { host: String },

    #[error("execution task for {host} aborted unexpectedly")]
    TaskAborted { host: String },

    #[error("command catalog error: {message}")]
    Catalog { message: String },

    #[error("inventory error: {message}")]
    Inventory { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
