//! Error types for challenge-abstracts
//!
//! Two classes of failure exist in this crate:
//! - [`Error`] / [`StorageError`]: unexpected failures (storage, I/O, upload)
//!   that propagate out of the processing job and surface as a
//!   [`Failed`](crate::types::Event::Failed) event.
//! - [`InspectError`]: expected rejections of a submission archive (bad ZIP,
//!   wrong PDF count, empty PDF). These are logged as warnings and degrade to
//!   a [`Skipped`](crate::types::Event::Skipped) event; they never convert
//!   into [`Error`].

use crate::types::SkipReason;
use thiserror::Error;

/// Result type alias for challenge-abstracts operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for challenge-abstracts
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api_base")
        key: Option<String>,
    },

    /// Host storage operation failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error while streaming file content
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown in progress - not accepting new submissions
    #[error("shutdown in progress: not accepting new submissions")]
    ShuttingDown,

    /// The publish queue is full
    #[error("publish queue is full")]
    QueueFull,
}

/// Errors surfaced by host storage backends through the store traits
#[derive(Debug, Error)]
pub enum StorageError {
    /// A record that must exist was not found
    #[error("{kind} {id} not found")]
    NotFound {
        /// The record kind (e.g., "submission", "user")
        kind: &'static str,
        /// The identifier that was not found
        id: String,
    },

    /// Backend-specific failure (connectivity, constraint, quota, ...)
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Expected rejections of a submission archive.
///
/// Each variant corresponds to a logged-warning-then-skip path; none of them
/// abort the worker or propagate as [`Error`].
#[derive(Debug, Error)]
pub enum InspectError {
    /// The uploaded bytes are not a readable ZIP container
    #[error("invalid ZIP archive: {0}")]
    InvalidArchive(String),

    /// The archive does not contain exactly one PDF entry
    #[error("archive contains {0} PDF entries, expected exactly one")]
    PdfCount(usize),

    /// The sole PDF entry has no content
    #[error("archive contains an empty PDF entry")]
    EmptyPdf,
}

impl InspectError {
    /// Map this rejection to the [`SkipReason`] carried on the
    /// [`Skipped`](crate::types::Event::Skipped) event.
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            InspectError::InvalidArchive(_) => SkipReason::InvalidArchive,
            InspectError::PdfCount(count) => SkipReason::PdfCount { count: *count },
            InspectError::EmptyPdf => SkipReason::EmptyPdf,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspect_errors_map_to_skip_reasons() {
        assert_eq!(
            InspectError::InvalidArchive("bad magic".into()).skip_reason(),
            SkipReason::InvalidArchive
        );
        assert_eq!(
            InspectError::PdfCount(3).skip_reason(),
            SkipReason::PdfCount { count: 3 }
        );
        assert_eq!(InspectError::EmptyPdf.skip_reason(), SkipReason::EmptyPdf);
    }

    #[test]
    fn storage_error_display_names_kind_and_id() {
        let err = StorageError::NotFound {
            kind: "submission",
            id: "sub1".into(),
        };
        assert_eq!(err.to_string(), "submission sub1 not found");
    }

    #[test]
    fn storage_error_converts_into_error() {
        let err: Error = StorageError::Backend("connection refused".into()).into();
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
