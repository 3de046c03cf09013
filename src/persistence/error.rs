//! Error types for persistence and collaborator operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or storing annotations.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Operation not offered by this backend
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Image file not found at expected path
    #[error("Image not found: {path:?}")]
    ImageNotFound {
        /// Path where the image was expected
        path: PathBuf,
    },

    /// A request referred to a table that no longer exists
    #[error("Table {0} not found")]
    TableNotFound(usize),
}
