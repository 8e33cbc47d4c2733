//! Error types for catalog operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while editing catalogs or their files.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// An entry with the same name already exists
    #[error("The {name} {kind} already exists")]
    Duplicate {
        /// Entry kind (`image`, `class`, ...)
        kind: &'static str,
        /// The refused name
        name: String,
    },

    /// No entry with that name
    #[error("No {kind} named '{name}'")]
    NotFound {
        /// Entry kind (`image`, `class`, ...)
        kind: &'static str,
        /// The missing name
        name: String,
    },

    /// Blank names can't be added
    #[error("{kind} names can't be empty")]
    EmptyName {
        /// Entry kind (`image`, `class`, ...)
        kind: &'static str,
    },

    /// Reading or writing a catalog file failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    /// Create a duplicate entry error.
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            name: name.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
