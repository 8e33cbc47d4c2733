//! Error types for annotation file operations.

use thiserror::Error;

/// Errors that can occur while reading or writing annotation files.
///
/// Problems with individual entries are not errors: they are skipped and
/// reported as [`FormatWarning`](super::FormatWarning)s instead.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not JSON, or not shaped like an annotation document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
