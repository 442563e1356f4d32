//! Error types for the Forest recommendation engine.
//!
//! All fallible operations return [`ForestError`] through the crate-wide
//! [`Result`] alias. Errors fall into two channels: recoverable ones that only
//! drop a single record or item from a batch, and fatal ones that abort the
//! whole recommendation request. [`ForestError::is_recoverable`] tells them
//! apart.
//!
//! # Examples
//!
//! ```
//! use forest::error::{ForestError, Result};
//!
//! fn lookup() -> Result<()> {
//!     Err(ForestError::data_unavailable("no items for any category"))
//! }
//!
//! let err = lookup().unwrap_err();
//! assert!(err.is_recoverable());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Forest operations.
#[derive(Error, Debug)]
pub enum ForestError {
    /// Empty item corpus or missing user profile.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// A record lacks or misreports its content type.
    #[error("Invalid content type: {0}")]
    ContentTypeInvalid(String),

    /// A raw record cannot be turned into an item (e.g. no identifier).
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Vectors originate from different vocabulary fits.
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    VectorDimensionMismatch { expected: usize, actual: usize },

    /// NaN or infinite values encountered during scoring.
    #[error("Computation error: {0}")]
    Computation(String),

    /// Scoring of a single item failed; the item is dropped from the batch.
    #[error("Scoring failed for item {item_id}: {reason}")]
    PerItemScoring { item_id: u64, reason: String },

    /// A vectorizer was asked to transform text before it was fitted.
    #[error("Vectorizer has not been fitted")]
    NotFitted,

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// I/O errors (reading provider or config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with ForestError.
pub type Result<T> = std::result::Result<T, ForestError>;

impl ForestError {
    /// Create a new data unavailable error.
    pub fn data_unavailable<S: Into<String>>(msg: S) -> Self {
        ForestError::DataUnavailable(msg.into())
    }

    /// Create a new content type error.
    pub fn content_type_invalid<S: Into<String>>(msg: S) -> Self {
        ForestError::ContentTypeInvalid(msg.into())
    }

    /// Create a new invalid record error.
    pub fn invalid_record<S: Into<String>>(msg: S) -> Self {
        ForestError::InvalidRecord(msg.into())
    }

    /// Create a new dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        ForestError::VectorDimensionMismatch { expected, actual }
    }

    /// Create a new computation error.
    pub fn computation<S: Into<String>>(msg: S) -> Self {
        ForestError::Computation(msg.into())
    }

    /// Create a new per-item scoring failure.
    pub fn per_item<S: Into<String>>(item_id: u64, reason: S) -> Self {
        ForestError::PerItemScoring {
            item_id,
            reason: reason.into(),
        }
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        ForestError::InvalidConfig(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        ForestError::Analysis(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ForestError::Other(msg.into())
    }

    /// Create a new internal consistency error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        ForestError::Other(format!("Internal error: {}", msg.into()))
    }

    /// Whether this error only affects a single record or item.
    ///
    /// Recoverable errors are collected and the batch continues; every other
    /// error aborts the current request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForestError::DataUnavailable(_)
                | ForestError::ContentTypeInvalid(_)
                | ForestError::InvalidRecord(_)
                | ForestError::PerItemScoring { .. }
        )
    }
}
