//! # Dispute Lifecycle Engine
//!
//! Orchestrates the adjudication flow over a [`DisputeStore`]: open a
//! dispute, seat a juror panel, collect votes, and finalize.
//!
//! ## Transaction Discipline
//!
//! Every mutation runs inside one exclusive per-dispute transaction: lock,
//! validate against the locked working copy, mutate, commit. The final vote
//! and its finalization commit atomically, so a dispute can never resolve
//! twice and a vote can never land after resolution. Notifications are
//! dispatched strictly after commit; a delivery failure is logged at WARN
//! and never fails the operation that triggered it.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use tribunal_core::{
    Dispute, DisputeId, DisputeOutcome, DisputeStatus, JurorDirectory, NotificationKind,
    NotificationSink, UserId, Vote, VoteDecision, VoteTally,
};
use tribunal_panel::select_panel;
use tribunal_store::{DisputeStore, DisputeTxn};

use crate::error::EngineError;

// ── Configuration ──────────────────────────────────────────────────────

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a panel has to vote once seated.
    pub voting_window: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            voting_window: Duration::hours(24),
        }
    }
}

// ── Requests and views ─────────────────────────────────────────────────

/// Input for opening a dispute.
#[derive(Debug, Clone)]
pub struct NewDispute {
    /// Short human-readable summary.
    pub title: String,
    /// Full description of the disagreement.
    pub description: String,
    /// Links to supporting evidence.
    pub evidence_urls: Vec<String>,
    /// The user raising the dispute.
    pub creator_id: UserId,
}

/// A dispute together with its collected votes.
#[derive(Debug, Clone)]
pub struct DisputeDetail {
    /// The dispute record.
    pub dispute: Dispute,
    /// Committed votes, oldest first.
    pub votes: Vec<Vote>,
}

// ── The engine ─────────────────────────────────────────────────────────

/// The dispute lifecycle engine.
///
/// Generic over the store; the juror pool and the notification service are
/// object-safe ports so hosts can swap implementations.
pub struct DisputeEngine<S: DisputeStore> {
    store: S,
    directory: Arc<dyn JurorDirectory>,
    sink: Arc<dyn NotificationSink>,
    config: EngineConfig,
}

impl<S: DisputeStore> DisputeEngine<S> {
    /// Create an engine with the default 24-hour voting window.
    pub fn new(
        store: S,
        directory: Arc<dyn JurorDirectory>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::with_config(store, directory, sink, EngineConfig::default())
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(
        store: S,
        directory: Arc<dyn JurorDirectory>,
        sink: Arc<dyn NotificationSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            directory,
            sink,
            config,
        }
    }

    /// Open a dispute and immediately try to seat a panel.
    ///
    /// The dispute is persisted first; panel assignment is chained
    /// best-effort. When the juror pool is too small the dispute stays
    /// `Pending` (logged at WARN, not an error) so it can be assigned later
    /// when the pool has grown. Store and directory failures propagate.
    pub async fn create_dispute(&self, new: NewDispute) -> Result<Dispute, EngineError> {
        let dispute = Dispute::open(new.title, new.description, new.evidence_urls, new.creator_id);
        let id = dispute.id;
        self.store
            .insert_dispute(dispute.clone())
            .await
            .map_err(EngineError::from_store)?;
        tracing::info!(dispute = %id, creator = %dispute.creator_id, "dispute opened");

        match self.assign_jurors(id).await {
            Ok(assigned) => Ok(assigned),
            Err(EngineError::BadRequest { reason }) => {
                tracing::warn!(dispute = %id, reason = %reason,
                    "panel assignment deferred, dispute stays pending");
                Ok(dispute)
            }
            Err(e) => Err(e),
        }
    }

    /// Seat a juror panel on a pending dispute and open voting.
    ///
    /// Queries the juror pool, ranks it by reputation, and seats a uniform
    /// sample of the top candidates. The voting deadline is
    /// `now + voting_window`. Each seated juror is notified after commit.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing dispute; `BadRequest` when the dispute
    /// already left `Pending` (panels are seated exactly once) or the pool
    /// is too small.
    pub async fn assign_jurors(&self, id: DisputeId) -> Result<Dispute, EngineError> {
        let mut txn = self.store.begin(id).await.map_err(EngineError::from_store)?;
        if txn.dispute().status != DisputeStatus::Pending {
            return Err(EngineError::bad_request(format!(
                "dispute {id} already has a panel (status {})",
                txn.dispute().status
            )));
        }

        let mut pool = self.directory.eligible_jurors().await?;
        pool.sort_by(|a, b| b.reputation.cmp(&a.reputation));
        let ranked: Vec<UserId> = pool.iter().map(|p| p.user_id).collect();

        let panel = select_panel(&ranked, &mut rand::thread_rng())
            .map_err(|e| EngineError::bad_request(e.to_string()))?;
        let deadline = Utc::now() + self.config.voting_window;

        txn.dispute_mut()
            .assign_panel(panel, deadline)
            .map_err(|e| EngineError::bad_request(e.to_string()))?;
        let dispute = txn.commit().await.map_err(EngineError::from_store)?;

        tracing::info!(dispute = %id, panel_size = dispute.assigned_juror_ids.len(),
            deadline = %deadline, "juror panel seated");
        for juror in &dispute.assigned_juror_ids {
            self.notify(
                *juror,
                NotificationKind::JurorAssigned,
                json!({
                    "dispute_id": dispute.id,
                    "title": dispute.title,
                    "voting_deadline": dispute.voting_deadline,
                }),
            )
            .await;
        }

        Ok(dispute)
    }

    /// Cast one juror's vote on a dispute.
    ///
    /// Validation order: the dispute must exist, the voter must sit on its
    /// panel, the dispute must still be in `Voting`, the deadline must not
    /// have passed, and the juror must not have voted before. A rejected
    /// vote creates no record. When this vote completes the panel, the
    /// dispute is finalized in the same transaction and the creator is
    /// notified after commit.
    pub async fn vote(
        &self,
        dispute_id: DisputeId,
        juror_id: UserId,
        decision: VoteDecision,
        reasoning: Option<String>,
    ) -> Result<Vote, EngineError> {
        let mut txn = self
            .store
            .begin(dispute_id)
            .await
            .map_err(EngineError::from_store)?;

        {
            let dispute = txn.dispute();
            if !dispute.is_panel_member(&juror_id) {
                return Err(EngineError::bad_request(format!(
                    "user {juror_id} is not on the panel for dispute {dispute_id}"
                )));
            }
            if dispute.status != DisputeStatus::Voting {
                return Err(EngineError::bad_request(format!(
                    "dispute {dispute_id} is not accepting votes (status {})",
                    dispute.status
                )));
            }
            if dispute.deadline_passed(Utc::now()) {
                return Err(EngineError::bad_request(format!(
                    "voting deadline for dispute {dispute_id} has passed"
                )));
            }
        }

        let vote = Vote::cast(dispute_id, juror_id, decision, reasoning);
        txn.insert_vote(vote.clone())
            .await
            .map_err(EngineError::from_store)?;

        let collected = txn.count_votes().await.map_err(EngineError::from_store)?;
        let panel_size = txn.dispute().assigned_juror_ids.len();
        let finalized = if collected == panel_size {
            let tally = VoteTally::from_votes(&txn.votes().await.map_err(EngineError::from_store)?);
            txn.dispute_mut()
                .record_outcome(tally.outcome(), tally.summary())
                .map_err(|e| EngineError::bad_request(e.to_string()))?;
            true
        } else {
            false
        };

        let dispute = txn.commit().await.map_err(EngineError::from_store)?;
        tracing::info!(dispute = %dispute_id, juror = %juror_id, decision = %decision,
            collected, panel_size, "vote recorded");

        if finalized {
            self.announce_resolution(&dispute).await;
        }
        Ok(vote)
    }

    /// Finalize a dispute from whatever votes it has collected.
    ///
    /// Returns the recorded outcome, or `None` when the dispute has already
    /// left `Voting`; calling this twice is a harmless no-op, which closes
    /// the race between a completing panel and a deadline sweep.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing dispute; `BadRequest` if the dispute never
    /// entered voting.
    pub async fn finalize_dispute(
        &self,
        id: DisputeId,
    ) -> Result<Option<DisputeOutcome>, EngineError> {
        let mut txn = self.store.begin(id).await.map_err(EngineError::from_store)?;
        match txn.dispute().status {
            DisputeStatus::Voting => {}
            DisputeStatus::Pending => {
                return Err(EngineError::bad_request(format!(
                    "dispute {id} has no panel to tally"
                )));
            }
            // Already finalized by a racing caller.
            _ => return Ok(None),
        }

        let tally = VoteTally::from_votes(&txn.votes().await.map_err(EngineError::from_store)?);
        let outcome = tally.outcome();
        txn.dispute_mut()
            .record_outcome(outcome, tally.summary())
            .map_err(|e| EngineError::bad_request(e.to_string()))?;
        let dispute = txn.commit().await.map_err(EngineError::from_store)?;

        tracing::info!(dispute = %id, outcome = %outcome, summary = ?dispute.resolution_summary,
            "dispute finalized");
        self.announce_resolution(&dispute).await;
        Ok(Some(outcome))
    }

    /// Fetch a dispute together with its votes.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing dispute.
    pub async fn get_dispute(&self, id: DisputeId) -> Result<DisputeDetail, EngineError> {
        let dispute = self
            .store
            .fetch_dispute(id)
            .await
            .map_err(EngineError::from_store)?
            .ok_or_else(|| EngineError::NotFound {
                dispute_id: id.to_string(),
            })?;
        let votes = self
            .store
            .fetch_votes(id)
            .await
            .map_err(EngineError::from_store)?;
        Ok(DisputeDetail { dispute, votes })
    }

    /// List disputes, optionally filtered by status, newest first.
    pub async fn list_disputes(
        &self,
        status: Option<DisputeStatus>,
    ) -> Result<Vec<Dispute>, EngineError> {
        self.store
            .list_disputes(status)
            .await
            .map_err(EngineError::from_store)
    }

    /// Finalize every voting dispute whose deadline has passed.
    ///
    /// A panel with zero decisive votes escalates. Returns how many
    /// disputes were finalized; per-dispute failures are logged and do not
    /// abort the sweep.
    pub async fn sweep_expired(&self) -> Result<usize, EngineError> {
        let overdue = self
            .store
            .list_overdue(Utc::now())
            .await
            .map_err(EngineError::from_store)?;
        let mut finalized = 0usize;
        for id in overdue {
            match self.finalize_dispute(id).await {
                Ok(Some(_)) => finalized += 1,
                // Finalized by a racing final vote between listing and locking.
                Ok(None) => {}
                Err(e) => tracing::warn!(dispute = %id, error = %e,
                    "deadline sweep could not finalize dispute"),
            }
        }
        tracing::debug!(finalized, "deadline sweep complete");
        Ok(finalized)
    }

    /// Notify the creator that their dispute reached a terminal status.
    async fn announce_resolution(&self, dispute: &Dispute) {
        self.notify(
            dispute.creator_id,
            NotificationKind::DisputeResolved,
            json!({
                "dispute_id": dispute.id,
                "title": dispute.title,
                "status": dispute.status,
                "outcome": dispute.outcome,
                "resolution_summary": dispute.resolution_summary,
            }),
        )
        .await;
    }

    /// Post-commit delivery; failures are logged, never surfaced.
    async fn notify(&self, user_id: UserId, kind: NotificationKind, payload: serde_json::Value) {
        if let Err(e) = self.sink.notify(user_id, kind, payload).await {
            tracing::warn!(user = %user_id, kind = %kind, error = %e,
                "notification delivery failed");
        }
    }
}
