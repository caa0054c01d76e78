//! # PostgreSQL Store
//!
//! SQLx-backed [`DisputeStore`] for multi-process deployments. The
//! per-dispute exclusive lock is `SELECT ... FOR UPDATE` inside a database
//! transaction; the (dispute, juror) uniqueness guarantee is the
//! `uq_dispute_votes_dispute_juror` constraint, so the duplicate-vote
//! backstop holds even against writers that bypass this crate.
//!
//! Status, outcome, and decision columns store the canonical wire strings
//! (`pending`, `voting`, …). A row whose enum column fails to parse is a
//! data integrity problem and surfaces as [`StoreError::Backend`] rather
//! than being silently coerced to a default.
//!
//! Schema lives in `migrations/0001_create_disputes.sql`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use tribunal_core::{
    DirectoryError, Dispute, DisputeId, DisputeStatus, JurorDirectory, JurorProfile, UserId, Vote,
    VoteId,
};

use crate::error::StoreError;
use crate::{DisputeStore, DisputeTxn};

const DISPUTE_COLUMNS: &str = "id, title, description, evidence_urls, creator_id, status, \
     outcome, assigned_juror_ids, voting_deadline, resolution_summary, created_at, updated_at";

const VOTE_COLUMNS: &str = "id, dispute_id, juror_id, decision, reasoning, created_at";

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// PostgreSQL dispute store over a shared connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DisputeStore for PgStore {
    type Txn = PgTxn;

    async fn insert_dispute(&self, dispute: Dispute) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO disputes (id, title, description, evidence_urls, creator_id, status, \
             outcome, assigned_juror_ids, voting_deadline, resolution_summary, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(*dispute.id.as_uuid())
        .bind(&dispute.title)
        .bind(&dispute.description)
        .bind(&dispute.evidence_urls)
        .bind(*dispute.creator_id.as_uuid())
        .bind(dispute.status.as_str())
        .bind(dispute.outcome.as_str())
        .bind(juror_uuids(&dispute.assigned_juror_ids))
        .bind(dispute.voting_deadline)
        .bind(&dispute.resolution_summary)
        .bind(dispute.created_at)
        .bind(dispute.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DisputeExists {
                dispute_id: dispute.id.to_string(),
            }),
            Err(e) => Err(backend(e)),
        }
    }

    async fn begin(&self, id: DisputeId) -> Result<PgTxn, StoreError> {
        let mut txn = self.pool.begin().await.map_err(backend)?;
        let row = sqlx::query_as::<_, DisputeRow>(&format!(
            "SELECT {DISPUTE_COLUMNS} FROM disputes WHERE id = $1 FOR UPDATE"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&mut *txn)
        .await
        .map_err(backend)?;

        // Dropping the transaction here rolls back and releases the lock.
        let row = row.ok_or_else(|| StoreError::DisputeNotFound {
            dispute_id: id.to_string(),
        })?;

        Ok(PgTxn {
            txn,
            dispute: row.into_record()?,
        })
    }

    async fn fetch_dispute(&self, id: DisputeId) -> Result<Option<Dispute>, StoreError> {
        let row = sqlx::query_as::<_, DisputeRow>(&format!(
            "SELECT {DISPUTE_COLUMNS} FROM disputes WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(DisputeRow::into_record).transpose()
    }

    async fn fetch_votes(&self, id: DisputeId) -> Result<Vec<Vote>, StoreError> {
        let rows = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {VOTE_COLUMNS} FROM dispute_votes WHERE dispute_id = $1 ORDER BY created_at"
        ))
        .bind(*id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(VoteRow::into_record).collect()
    }

    async fn list_disputes(
        &self,
        status: Option<DisputeStatus>,
    ) -> Result<Vec<Dispute>, StoreError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, DisputeRow>(&format!(
                    "SELECT {DISPUTE_COLUMNS} FROM disputes WHERE status = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, DisputeRow>(&format!(
                    "SELECT {DISPUTE_COLUMNS} FROM disputes ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(backend)?;

        rows.into_iter().map(DisputeRow::into_record).collect()
    }

    async fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<DisputeId>, StoreError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM disputes WHERE status = 'voting' AND voting_deadline < $1",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(ids.into_iter().map(DisputeId::from_uuid).collect())
    }
}

/// An exclusive Postgres transaction holding a `FOR UPDATE` row lock on one
/// dispute. Dropping it without committing rolls back.
pub struct PgTxn {
    txn: Transaction<'static, Postgres>,
    dispute: Dispute,
}

#[async_trait]
impl DisputeTxn for PgTxn {
    fn dispute(&self) -> &Dispute {
        &self.dispute
    }

    fn dispute_mut(&mut self) -> &mut Dispute {
        &mut self.dispute
    }

    async fn insert_vote(&mut self, vote: Vote) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO dispute_votes (id, dispute_id, juror_id, decision, reasoning, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*vote.id.as_uuid())
        .bind(*vote.dispute_id.as_uuid())
        .bind(*vote.juror_id.as_uuid())
        .bind(vote.decision.as_str())
        .bind(&vote.reasoning)
        .bind(vote.created_at)
        .execute(&mut *self.txn)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateVote {
                dispute_id: vote.dispute_id.to_string(),
                juror_id: vote.juror_id.to_string(),
            }),
            Err(e) => Err(backend(e)),
        }
    }

    async fn votes(&mut self) -> Result<Vec<Vote>, StoreError> {
        let rows = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {VOTE_COLUMNS} FROM dispute_votes WHERE dispute_id = $1 ORDER BY created_at"
        ))
        .bind(*self.dispute.id.as_uuid())
        .fetch_all(&mut *self.txn)
        .await
        .map_err(backend)?;

        rows.into_iter().map(VoteRow::into_record).collect()
    }

    async fn count_votes(&mut self) -> Result<usize, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM dispute_votes WHERE dispute_id = $1")
                .bind(*self.dispute.id.as_uuid())
                .fetch_one(&mut *self.txn)
                .await
                .map_err(backend)?;
        Ok(count as usize)
    }

    async fn commit(mut self) -> Result<Dispute, StoreError> {
        sqlx::query(
            "UPDATE disputes SET status = $1, outcome = $2, assigned_juror_ids = $3, \
             voting_deadline = $4, resolution_summary = $5, updated_at = $6 WHERE id = $7",
        )
        .bind(self.dispute.status.as_str())
        .bind(self.dispute.outcome.as_str())
        .bind(juror_uuids(&self.dispute.assigned_juror_ids))
        .bind(self.dispute.voting_deadline)
        .bind(&self.dispute.resolution_summary)
        .bind(self.dispute.updated_at)
        .bind(*self.dispute.id.as_uuid())
        .execute(&mut *self.txn)
        .await
        .map_err(backend)?;

        self.txn.commit().await.map_err(backend)?;
        Ok(self.dispute)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

fn juror_uuids(jurors: &[UserId]) -> Vec<Uuid> {
    jurors.iter().map(|j| *j.as_uuid()).collect()
}

// ── Row mapping ────────────────────────────────────────────────────────

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct DisputeRow {
    id: Uuid,
    title: String,
    description: String,
    evidence_urls: Vec<String>,
    creator_id: Uuid,
    status: String,
    outcome: String,
    assigned_juror_ids: Vec<Uuid>,
    voting_deadline: Option<DateTime<Utc>>,
    resolution_summary: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DisputeRow {
    fn into_record(self) -> Result<Dispute, StoreError> {
        let status = self.status.parse().map_err(|e| {
            tracing::error!(id = %self.id, status = %self.status, error = %e,
                "unknown dispute status in database");
            StoreError::Backend(format!("dispute {}: {e}", self.id))
        })?;
        let outcome = self.outcome.parse().map_err(|e| {
            tracing::error!(id = %self.id, outcome = %self.outcome, error = %e,
                "unknown dispute outcome in database");
            StoreError::Backend(format!("dispute {}: {e}", self.id))
        })?;

        Ok(Dispute {
            id: DisputeId::from_uuid(self.id),
            title: self.title,
            description: self.description,
            evidence_urls: self.evidence_urls,
            creator_id: UserId::from_uuid(self.creator_id),
            status,
            outcome,
            assigned_juror_ids: self
                .assigned_juror_ids
                .into_iter()
                .map(UserId::from_uuid)
                .collect(),
            voting_deadline: self.voting_deadline,
            resolution_summary: self.resolution_summary,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct VoteRow {
    id: Uuid,
    dispute_id: Uuid,
    juror_id: Uuid,
    decision: String,
    reasoning: Option<String>,
    created_at: DateTime<Utc>,
}

impl VoteRow {
    fn into_record(self) -> Result<Vote, StoreError> {
        let decision = self.decision.parse().map_err(|e| {
            tracing::error!(id = %self.id, decision = %self.decision, error = %e,
                "unknown vote decision in database");
            StoreError::Backend(format!("vote {}: {e}", self.id))
        })?;

        Ok(Vote {
            id: VoteId::from_uuid(self.id),
            dispute_id: DisputeId::from_uuid(self.dispute_id),
            juror_id: UserId::from_uuid(self.juror_id),
            decision,
            reasoning: self.reasoning,
            created_at: self.created_at,
        })
    }
}

// ── Juror directory ────────────────────────────────────────────────────

/// Juror pool backed by the marketplace `users` table.
///
/// Expects a table with `id UUID`, `roles TEXT[]`, and
/// `juror_reputation BIGINT` columns; the table is owned by the host
/// application and is not part of this crate's migrations. Reads are a
/// lock-free snapshot.
#[derive(Clone)]
pub struct PgJurorDirectory {
    pool: PgPool,
}

impl PgJurorDirectory {
    /// Create a directory over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct JurorRow {
    id: Uuid,
    juror_reputation: i64,
}

#[async_trait]
impl JurorDirectory for PgJurorDirectory {
    async fn eligible_jurors(&self) -> Result<Vec<JurorProfile>, DirectoryError> {
        let rows = sqlx::query_as::<_, JurorRow>(
            "SELECT id, juror_reputation FROM users WHERE 'juror' = ANY(roles) \
             ORDER BY juror_reputation DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DirectoryError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|r| JurorProfile {
                user_id: UserId::from_uuid(r.id),
                reputation: r.juror_reputation,
            })
            .collect())
    }
}
