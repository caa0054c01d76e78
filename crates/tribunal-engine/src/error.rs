//! # Engine Error Taxonomy
//!
//! The caller-facing error boundary. Precondition failures split into two
//! caller-actionable categories, `NotFound` and `BadRequest`; transient
//! backend failures keep their source chain so operators can diagnose them.
//! Store-level constraint violations (`DisputeNotFound`, `DuplicateVote`)
//! are mapped into the caller-facing categories before they leave the
//! engine, so `Store` only ever carries genuine backend trouble.

use thiserror::Error;

use tribunal_core::DirectoryError;
use tribunal_store::StoreError;

/// Errors surfaced by the dispute lifecycle engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The referenced dispute does not exist.
    #[error("dispute {dispute_id} not found")]
    NotFound {
        /// The missing dispute identifier.
        dispute_id: String,
    },

    /// The request is well-formed but violates a lifecycle precondition:
    /// wrong status, non-panelist voter, expired deadline, duplicate vote,
    /// or an insufficient juror pool.
    #[error("{reason}")]
    BadRequest {
        /// Human-readable rejection reason.
        reason: String,
    },

    /// The store failed; the enclosing transaction was rolled back and the
    /// operation can be retried.
    #[error("storage failure")]
    Store(#[source] StoreError),

    /// The juror directory could not be queried.
    #[error("juror directory failure")]
    Directory(#[from] DirectoryError),
}

impl EngineError {
    pub(crate) fn bad_request(reason: impl Into<String>) -> Self {
        Self::BadRequest {
            reason: reason.into(),
        }
    }

    /// Map a store error into the caller-facing taxonomy.
    pub(crate) fn from_store(e: StoreError) -> Self {
        match e {
            StoreError::DisputeNotFound { dispute_id } => Self::NotFound { dispute_id },
            StoreError::DuplicateVote {
                dispute_id,
                juror_id,
            } => Self::bad_request(format!(
                "juror {juror_id} has already voted on dispute {dispute_id}"
            )),
            other => Self::Store(other),
        }
    }
}
