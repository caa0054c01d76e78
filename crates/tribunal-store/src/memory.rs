//! # In-Memory Store
//!
//! A process-local [`DisputeStore`] used by the test suite and by
//! single-process deployments. The per-dispute exclusive lock is a
//! `tokio::sync::Mutex` held for the transaction's lifetime; the record maps
//! are `parking_lot` locks that are only ever taken for synchronous
//! copy-in/copy-out and never held across an await point.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::OwnedMutexGuard;

use tribunal_core::{Dispute, DisputeId, DisputeStatus, UserId, Vote};

use crate::error::StoreError;
use crate::{DisputeStore, DisputeTxn};

#[derive(Default)]
struct Tables {
    disputes: RwLock<HashMap<DisputeId, Dispute>>,
    /// Committed votes per dispute, oldest first.
    votes: RwLock<HashMap<DisputeId, Vec<Vote>>>,
    /// Uniqueness index over committed votes.
    voted: RwLock<HashSet<(DisputeId, UserId)>>,
    /// One lock per dispute, created lazily and never removed.
    row_locks: Mutex<HashMap<DisputeId, Arc<tokio::sync::Mutex<()>>>>,
}

/// In-memory dispute store. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn row_lock(&self, id: DisputeId) -> Arc<tokio::sync::Mutex<()>> {
        self.tables
            .row_locks
            .lock()
            .entry(id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl DisputeStore for MemoryStore {
    type Txn = MemoryTxn;

    async fn insert_dispute(&self, dispute: Dispute) -> Result<(), StoreError> {
        let mut disputes = self.tables.disputes.write();
        if disputes.contains_key(&dispute.id) {
            return Err(StoreError::DisputeExists {
                dispute_id: dispute.id.to_string(),
            });
        }
        disputes.insert(dispute.id, dispute);
        Ok(())
    }

    async fn begin(&self, id: DisputeId) -> Result<MemoryTxn, StoreError> {
        let guard = self.row_lock(id).lock_owned().await;
        let dispute = self
            .tables
            .disputes
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::DisputeNotFound {
                dispute_id: id.to_string(),
            })?;
        Ok(MemoryTxn {
            tables: Arc::clone(&self.tables),
            _guard: guard,
            dispute,
            staged_votes: Vec::new(),
        })
    }

    async fn fetch_dispute(&self, id: DisputeId) -> Result<Option<Dispute>, StoreError> {
        Ok(self.tables.disputes.read().get(&id).cloned())
    }

    async fn fetch_votes(&self, id: DisputeId) -> Result<Vec<Vote>, StoreError> {
        Ok(self
            .tables
            .votes
            .read()
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_disputes(
        &self,
        status: Option<DisputeStatus>,
    ) -> Result<Vec<Dispute>, StoreError> {
        let mut disputes: Vec<Dispute> = self
            .tables
            .disputes
            .read()
            .values()
            .filter(|d| status.map_or(true, |s| d.status == s))
            .cloned()
            .collect();
        disputes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(disputes)
    }

    async fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<DisputeId>, StoreError> {
        Ok(self
            .tables
            .disputes
            .read()
            .values()
            .filter(|d| d.status == DisputeStatus::Voting && d.deadline_passed(now))
            .map(|d| d.id)
            .collect())
    }
}

/// An exclusive in-memory transaction. Dropping it without committing
/// discards the working copy and every staged vote.
pub struct MemoryTxn {
    tables: Arc<Tables>,
    _guard: OwnedMutexGuard<()>,
    dispute: Dispute,
    staged_votes: Vec<Vote>,
}

#[async_trait]
impl DisputeTxn for MemoryTxn {
    fn dispute(&self) -> &Dispute {
        &self.dispute
    }

    fn dispute_mut(&mut self) -> &mut Dispute {
        &mut self.dispute
    }

    async fn insert_vote(&mut self, vote: Vote) -> Result<(), StoreError> {
        let key = (vote.dispute_id, vote.juror_id);
        let already_committed = self.tables.voted.read().contains(&key);
        let already_staged = self
            .staged_votes
            .iter()
            .any(|v| v.juror_id == vote.juror_id);
        if already_committed || already_staged {
            return Err(StoreError::DuplicateVote {
                dispute_id: vote.dispute_id.to_string(),
                juror_id: vote.juror_id.to_string(),
            });
        }
        self.staged_votes.push(vote);
        Ok(())
    }

    async fn votes(&mut self) -> Result<Vec<Vote>, StoreError> {
        let mut votes = self
            .tables
            .votes
            .read()
            .get(&self.dispute.id)
            .cloned()
            .unwrap_or_default();
        votes.extend(self.staged_votes.iter().cloned());
        Ok(votes)
    }

    async fn count_votes(&mut self) -> Result<usize, StoreError> {
        Ok(self.votes().await?.len())
    }

    async fn commit(self) -> Result<Dispute, StoreError> {
        let id = self.dispute.id;
        {
            let mut voted = self.tables.voted.write();
            let mut votes = self.tables.votes.write();
            let entry = votes.entry(id).or_default();
            for vote in self.staged_votes {
                voted.insert((id, vote.juror_id));
                entry.push(vote);
            }
        }
        self.tables
            .disputes
            .write()
            .insert(id, self.dispute.clone());
        Ok(self.dispute)
    }
}
