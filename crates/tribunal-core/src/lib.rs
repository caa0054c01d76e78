//! # tribunal-core — Adjudication Domain Types
//!
//! Foundational types for the dispute adjudication engine:
//!
//! - **Identity** ([`identity`]): UUID newtype identifiers for disputes,
//!   votes, and users.
//!
//! - **Dispute** ([`dispute`]): The dispute record and its validated status
//!   machine, `Pending → Voting → {Resolved | Escalated}`.
//!
//! - **Vote** ([`vote`]): Immutable juror votes and the tally that derives
//!   the dispute outcome.
//!
//! - **Ports** ([`ports`]): Async trait seams for the juror pool and the
//!   notification service.
//!
//! - **Error** ([`error`]): Structured errors for dispute record operations.

pub mod dispute;
pub mod error;
pub mod identity;
pub mod ports;
pub mod vote;

// Re-export primary types for ergonomic imports.

pub use dispute::{Dispute, DisputeOutcome, DisputeStatus};
pub use error::DisputeError;
pub use identity::{DisputeId, UserId, VoteId};
pub use ports::{
    DirectoryError, JurorDirectory, JurorProfile, NotificationKind, NotificationSink, NotifyError,
};
pub use vote::{Vote, VoteDecision, VoteTally};
