//! Error types for the inifile library.
//!
//! A missing section or key is never an error; lookups report it as `None`,
//! a fallback value, an empty list or `false`. Errors are reserved for
//! queries against a document that was never loaded, unusable arguments,
//! file store failures and unreadable configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with an inifile error.
///
/// # Examples
///
/// ```
/// use inifile::{Error, Result};
///
/// fn example_operation() -> Result<bool> {
///     Ok(true)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the inifile library.
#[derive(Debug, Error)]
pub enum Error {
    /// A query was issued against a document that was never loaded.
    #[error("no file was loaded into the document")]
    NotLoaded,

    /// A required argument cannot be used by the operation.
    #[error("invalid argument '{field}': {reason}")]
    InvalidArgument {
        /// The argument that was rejected.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The file store failed while handling a file.
    #[error("file handling failed for {}: {source}", path.display())]
    FileHandling {
        /// The file being handled when the failure occurred.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A configuration document could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),
}

impl Error {
    /// Wraps a store failure for `path`.
    pub(crate) fn file_handling(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileHandling {
            path: path.into(),
            source,
        }
    }

    /// Check if the error was raised by a query on an unloaded document.
    ///
    /// # Examples
    ///
    /// ```
    /// use inifile::Document;
    ///
    /// let doc = Document::new();
    /// let err = doc.has_section("main").unwrap_err();
    /// assert!(err.is_not_loaded());
    /// ```
    #[must_use]
    pub fn is_not_loaded(&self) -> bool {
        matches!(self, Self::NotLoaded)
    }

    /// Check if the error wraps a file store failure.
    #[must_use]
    pub fn is_file_handling(&self) -> bool {
        matches!(self, Self::FileHandling { .. })
    }
}
