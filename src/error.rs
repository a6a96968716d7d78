//! Rich diagnostic error types for corpus curation.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so operators know exactly
//! what went wrong and how to fix it.
//!
//! Rejections (duplicate content, unclassifiable content) are not errors; they
//! are reported through [`SubmissionOutcome`](crate::policy::SubmissionOutcome).

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::paths::PathError;

/// Top-level error type for the curation tool.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the operator.
#[derive(Debug, Error, Diagnostic)]
pub enum CurateError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(curate::store::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("store unavailable: {message}")]
    #[diagnostic(
        code(curate::store::redb),
        help(
            "The corpus database could not be opened or a transaction failed. \
             Nothing from the current operation was written. Check that no other \
             process holds the database file, then retry."
        )
    )]
    Redb { message: String },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(curate::store::serde),
        help(
            "Failed to serialize or deserialize a corpus record. \
             The stored data format may have changed between versions."
        )
    )]
    Serialization { message: String },

    #[error("record not found: {id}")]
    #[diagnostic(
        code(curate::store::not_found),
        help("No record with this id exists. List candidates with `curate accepter high` or `low`.")
    )]
    RecordNotFound { id: u64 },

    #[error("record {id} is not in the seed set")]
    #[diagnostic(
        code(curate::store::not_seeded),
        help("Only promoted records can be demoted. Promote with `curate accepter promote {id}`.")
    )]
    NotSeeded { id: u64 },
}

impl StoreError {
    /// Whether this error means the referenced record does not exist,
    /// as opposed to the store itself failing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. } | Self::NotSeeded { .. })
    }
}

// ---------------------------------------------------------------------------
// Classification errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ClassifyError {
    #[error("invalid acceptance threshold: {value}")]
    #[diagnostic(
        code(curate::classify::threshold),
        help("Thresholds must be finite numbers between 0.0 and 1.0.")
    )]
    InvalidThreshold { value: f64 },
}

/// Convenience result type for top-level operations.
pub type CurateResult<T> = std::result::Result<T, CurateError>;
