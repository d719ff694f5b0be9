//! Error handling for the resolution engine.

use chrono::NaiveDate;
use std::io;
use std::path::PathBuf;

/// Specialized error type for the resolution engine
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// Error opening or reading a snapshot file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error decoding a snapshot file
    #[error("Snapshot decode error in {path}: {source}")]
    SnapshotDecode {
        /// File that failed to decode
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Snapshot dates not strictly increasing
    #[error("Snapshot dates out of order: {previous} followed by {current}")]
    SnapshotOrder {
        /// Date of the preceding snapshot
        previous: NaiveDate,
        /// Offending date
        current: NaiveDate,
    },

    /// Error with input validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transient fallback segmenter failure, safe to retry
    #[error("Fallback segmenter transient failure: {0}")]
    FallbackTransient(String),

    /// Permanent fallback segmenter failure
    #[error("Fallback segmenter error: {0}")]
    Fallback(String),

    /// A validity interval would overlap an existing one for the same
    /// (product, code) pair. Indicates an upstream canonicalization or
    /// resolver bug; aborts that pair only.
    #[error("Overlapping validity interval for product {product} code {code} at {date}")]
    IntervalOverlap {
        /// Product whose pair processing is aborted
        product: String,
        /// Indication code of the pair
        code: String,
        /// Snapshot date at which the overlap was detected
        date: NaiveDate,
    },
}

impl ResolverError {
    /// Whether the error is a transient condition worth retrying
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::FallbackTransient(_))
    }
}

/// Result type for resolution engine operations
pub type Result<T> = std::result::Result<T, ResolverError>;
