//! # Store Error Types
//!
//! Errors shared by every store implementation. Constraint violations that
//! the engine turns into caller-facing rejections (`DisputeNotFound`,
//! `DuplicateVote`) are distinct variants; everything else collapses into
//! `Backend` so raw driver errors never leak past this crate.

use thiserror::Error;

/// Errors arising from dispute persistence operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No dispute exists with the given identifier.
    #[error("dispute {dispute_id} not found")]
    DisputeNotFound {
        /// The missing dispute identifier.
        dispute_id: String,
    },

    /// A dispute with the given identifier already exists.
    #[error("dispute {dispute_id} already exists")]
    DisputeExists {
        /// The conflicting dispute identifier.
        dispute_id: String,
    },

    /// The (dispute, juror) uniqueness guarantee rejected a second vote.
    #[error("juror {juror_id} has already voted on dispute {dispute_id}")]
    DuplicateVote {
        /// The dispute identifier.
        dispute_id: String,
        /// The juror identifier.
        juror_id: String,
    },

    /// The storage backend failed; the transaction was rolled back.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_vote_display() {
        let err = StoreError::DuplicateVote {
            dispute_id: "dispute:0000".to_string(),
            juror_id: "user:1111".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("dispute:0000"));
        assert!(msg.contains("user:1111"));
        assert!(msg.contains("already voted"));
    }

    #[test]
    fn not_found_display() {
        let err = StoreError::DisputeNotFound {
            dispute_id: "dispute:2222".to_string(),
        };
        assert!(format!("{err}").contains("not found"));
    }
}
