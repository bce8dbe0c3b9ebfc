//! Errors in the library.
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum TetherError {
    /// Invalid construction arguments.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The output directory already exists.
    #[error("Output directory already exists: {0:?}")]
    FilesystemError(PathBuf),

    /// An operation was attempted on a handle that is not open.
    #[error("Invariant error: {0}")]
    InvariantError(String),
}
