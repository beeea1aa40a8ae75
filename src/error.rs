//! Centralized error types for mboxbook.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mboxbook library.
///
/// Per-message problems (bad date, undecodable subject, failed reply
/// segmentation) are deliberately not represented here: the pipeline logs
/// them and substitutes fallbacks. These variants cover the fatal-for-run
/// cases plus per-message parse failures the caller reports and skips.
#[derive(Error, Debug)]
pub enum BookError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("MBOX file not found: {0}")]
    FileNotFound(PathBuf),

    /// A parsing error occurred at a specific byte offset.
    #[error("Parse error at offset {offset}: {reason}")]
    ParseError { offset: u64, reason: String },
}

/// Convenience alias for `Result<T, BookError>`.
pub type Result<T> = std::result::Result<T, BookError>;

impl BookError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
