//! # tribunal-store — Transactional Dispute Persistence
//!
//! The store contracts the lifecycle engine runs on, plus two
//! implementations:
//!
//! - **Memory** ([`memory`]): per-dispute async mutex standing in for a row
//!   lock, `parking_lot` maps for the records. Backs the test suite and
//!   single-process deployments.
//!
//! - **Postgres** ([`postgres`]): SQLx against PostgreSQL,
//!   `SELECT ... FOR UPDATE` for the row lock, a `UNIQUE (dispute_id,
//!   juror_id)` constraint as the duplicate-vote backstop. Also ships the
//!   Postgres-backed juror directory.
//!
//! ## Transaction Model
//!
//! [`DisputeStore::begin`] takes an exclusive lock on one dispute and hands
//! back a [`DisputeTxn`] holding a working copy of the record. Mutations to
//! the working copy and staged vote inserts become visible to other readers
//! only when [`DisputeTxn::commit`] returns; dropping the transaction
//! without committing discards everything. Operations on different disputes
//! never block each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tribunal_core::{Dispute, DisputeId, DisputeStatus, Vote};

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::{PgJurorDirectory, PgStore};

/// A dispute store: durable records plus per-dispute exclusive transactions.
#[async_trait]
pub trait DisputeStore: Send + Sync + 'static {
    /// The transaction handle produced by [`begin`](DisputeStore::begin).
    type Txn: DisputeTxn;

    /// Persist a newly opened dispute.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DisputeExists`] if the identifier is taken.
    async fn insert_dispute(&self, dispute: Dispute) -> Result<(), StoreError>;

    /// Open an exclusive transaction on one dispute.
    ///
    /// Blocks until any in-flight transaction on the same dispute finishes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DisputeNotFound`] if the dispute does not exist.
    async fn begin(&self, id: DisputeId) -> Result<Self::Txn, StoreError>;

    /// Fetch one dispute without locking it.
    async fn fetch_dispute(&self, id: DisputeId) -> Result<Option<Dispute>, StoreError>;

    /// Fetch the committed votes for one dispute, oldest first.
    async fn fetch_votes(&self, id: DisputeId) -> Result<Vec<Vote>, StoreError>;

    /// List disputes, optionally filtered by status, newest first.
    async fn list_disputes(
        &self,
        status: Option<DisputeStatus>,
    ) -> Result<Vec<Dispute>, StoreError>;

    /// Identifiers of disputes still in voting whose deadline is behind `now`.
    async fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<DisputeId>, StoreError>;
}

/// An exclusive transaction over a single dispute.
///
/// Holds the dispute's lock for its whole lifetime. The working copy
/// returned by [`dispute_mut`](DisputeTxn::dispute_mut) and any staged votes
/// are published atomically by [`commit`](DisputeTxn::commit).
#[async_trait]
pub trait DisputeTxn: Send {
    /// The working copy of the locked dispute.
    fn dispute(&self) -> &Dispute;

    /// Mutable access to the working copy.
    fn dispute_mut(&mut self) -> &mut Dispute;

    /// Stage a vote insert.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateVote`] if the juror already has a
    /// vote on this dispute, committed or staged.
    async fn insert_vote(&mut self, vote: Vote) -> Result<(), StoreError>;

    /// Votes visible inside this transaction: committed plus staged,
    /// oldest first.
    async fn votes(&mut self) -> Result<Vec<Vote>, StoreError>;

    /// Count of votes visible inside this transaction.
    async fn count_votes(&mut self) -> Result<usize, StoreError>;

    /// Publish the working copy and all staged votes, releasing the lock.
    async fn commit(self) -> Result<Dispute, StoreError>;
}
