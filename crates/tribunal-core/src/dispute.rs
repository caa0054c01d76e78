//! # Dispute Record and Status Machine
//!
//! The dispute lifecycle: `Pending → Voting → {Resolved | Escalated}`.
//!
//! ## Design Choice: Validated Enum over Typestate
//!
//! The status machine is a validated enum (runtime-checked) rather than a
//! typestate. Disputes live in a database and cross a wire format where the
//! status is not known at compile time, so a validated enum serializes
//! directly via serde with no intermediate dynamic layer. Each transition has
//! a dedicated method on [`Dispute`] that rejects out-of-order calls with
//! [`DisputeError::InvalidTransition`].
//!
//! ## Transition Graph
//!
//! ```text
//! Pending ──assign_panel()──▶ Voting ──record_outcome()──▶ Resolved
//!                                │
//!                                └──record_outcome(Escalated)──▶ Escalated
//! ```
//!
//! Both `Resolved` and `Escalated` are terminal. The panel, the voting
//! deadline, and the outcome are each written exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DisputeError;
use crate::identity::{DisputeId, UserId};

// ── Status ─────────────────────────────────────────────────────────────

/// The lifecycle status of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    /// Created, no juror panel assigned yet.
    Pending,
    /// Panel assigned, votes being collected until the deadline.
    Voting,
    /// A decisive outcome was recorded. Terminal status.
    Resolved,
    /// No decisive votes were cast; escalated to manual review. Terminal status.
    Escalated,
}

impl DisputeStatus {
    /// The canonical wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Voting => "voting",
            Self::Resolved => "resolved",
            Self::Escalated => "escalated",
        }
    }

    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Escalated)
    }

    /// Valid target statuses from this status.
    pub fn valid_transitions(&self) -> &'static [DisputeStatus] {
        match self {
            Self::Pending => &[Self::Voting],
            Self::Voting => &[Self::Resolved, Self::Escalated],
            Self::Resolved | Self::Escalated => &[],
        }
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DisputeStatus {
    type Err = DisputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "voting" => Ok(Self::Voting),
            "resolved" => Ok(Self::Resolved),
            "escalated" => Ok(Self::Escalated),
            other => Err(DisputeError::UnknownValue {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

// ── Outcome ────────────────────────────────────────────────────────────

/// The adjudicated outcome of a dispute.
///
/// `Pending` until finalization; every other value is written exactly once
/// when the dispute leaves `Voting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeOutcome {
    /// Not yet adjudicated.
    Pending,
    /// The panel sided with the dispute creator.
    Upheld,
    /// The panel sided against the dispute creator.
    Rejected,
    /// Decisive votes split evenly.
    Tied,
    /// No decisive votes were cast.
    Escalated,
}

impl DisputeOutcome {
    /// The canonical wire name of this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Upheld => "upheld",
            Self::Rejected => "rejected",
            Self::Tied => "tied",
            Self::Escalated => "escalated",
        }
    }

    /// The terminal status this outcome maps a dispute to, or `None` for
    /// [`Pending`](DisputeOutcome::Pending), which is not a final outcome.
    pub fn final_status(&self) -> Option<DisputeStatus> {
        match self {
            Self::Pending => None,
            Self::Escalated => Some(DisputeStatus::Escalated),
            Self::Upheld | Self::Rejected | Self::Tied => Some(DisputeStatus::Resolved),
        }
    }
}

impl std::fmt::Display for DisputeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DisputeOutcome {
    type Err = DisputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "upheld" => Ok(Self::Upheld),
            "rejected" => Ok(Self::Rejected),
            "tied" => Ok(Self::Tied),
            "escalated" => Ok(Self::Escalated),
            other => Err(DisputeError::UnknownValue {
                kind: "outcome",
                value: other.to_string(),
            }),
        }
    }
}

// ── The Dispute ────────────────────────────────────────────────────────

/// A dispute raised by a marketplace user, adjudicated by a juror panel.
///
/// Created via [`Dispute::open`] in `Pending` status, advanced with the
/// checked transition methods [`assign_panel`](Dispute::assign_panel) and
/// [`record_outcome`](Dispute::record_outcome). Disputes are never deleted;
/// terminal statuses reject all further transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    /// Unique dispute identifier.
    pub id: DisputeId,
    /// Short human-readable summary of the disagreement.
    pub title: String,
    /// Full description submitted by the creator.
    pub description: String,
    /// Links to supporting evidence.
    pub evidence_urls: Vec<String>,
    /// The user who raised the dispute.
    pub creator_id: UserId,
    /// Current lifecycle status.
    pub status: DisputeStatus,
    /// Adjudicated outcome; `Pending` until finalization.
    pub outcome: DisputeOutcome,
    /// The juror panel, empty until assignment.
    pub assigned_juror_ids: Vec<UserId>,
    /// Voting cutoff, set once at `Pending → Voting` and never cleared.
    pub voting_deadline: Option<DateTime<Utc>>,
    /// Human-readable tally summary, written at finalization.
    pub resolution_summary: Option<String>,
    /// When the dispute was created (UTC).
    pub created_at: DateTime<Utc>,
    /// When the dispute was last updated (UTC).
    pub updated_at: DateTime<Utc>,
}

impl Dispute {
    /// Open a new dispute in `Pending` status with no panel.
    pub fn open(
        title: impl Into<String>,
        description: impl Into<String>,
        evidence_urls: Vec<String>,
        creator_id: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DisputeId::new(),
            title: title.into(),
            description: description.into(),
            evidence_urls,
            creator_id,
            status: DisputeStatus::Pending,
            outcome: DisputeOutcome::Pending,
            assigned_juror_ids: Vec::new(),
            voting_deadline: None,
            resolution_summary: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition `Pending → Voting`, recording the juror panel and the
    /// voting deadline. The panel is set exactly once; a dispute that has
    /// already entered voting rejects reassignment.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::InvalidTransition`] if not in `Pending`
    /// status, or [`DisputeError::EmptyPanel`] for an empty panel.
    pub fn assign_panel(
        &mut self,
        panel: Vec<UserId>,
        deadline: DateTime<Utc>,
    ) -> Result<(), DisputeError> {
        self.require_status(DisputeStatus::Pending, DisputeStatus::Voting)?;
        if panel.is_empty() {
            return Err(DisputeError::EmptyPanel {
                dispute_id: self.id.to_string(),
            });
        }
        self.assigned_juror_ids = panel;
        self.voting_deadline = Some(deadline);
        self.status = DisputeStatus::Voting;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Transition `Voting` to its terminal status, recording the outcome and
    /// the tally summary. `Upheld`, `Rejected`, and `Tied` resolve the
    /// dispute; `Escalated` escalates it.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::InvalidTransition`] if not in `Voting` status,
    /// or [`DisputeError::UndecidedOutcome`] for the `Pending` outcome.
    pub fn record_outcome(
        &mut self,
        outcome: DisputeOutcome,
        summary: impl Into<String>,
    ) -> Result<(), DisputeError> {
        let target = outcome
            .final_status()
            .ok_or_else(|| DisputeError::UndecidedOutcome {
                outcome: outcome.as_str().to_string(),
            })?;
        self.require_status(DisputeStatus::Voting, target)?;
        self.outcome = outcome;
        self.status = target;
        self.resolution_summary = Some(summary.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Whether the given user sits on the assigned panel.
    pub fn is_panel_member(&self, juror_id: &UserId) -> bool {
        self.assigned_juror_ids.contains(juror_id)
    }

    /// Whether the voting deadline has passed as of `now`. Always false
    /// before a deadline is set.
    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        matches!(self.voting_deadline, Some(deadline) if now > deadline)
    }

    /// Check that the dispute is in the expected status for a transition.
    fn require_status(
        &self,
        expected: DisputeStatus,
        target: DisputeStatus,
    ) -> Result<(), DisputeError> {
        if self.status.is_terminal() {
            return Err(DisputeError::TerminalStatus {
                dispute_id: self.id.to_string(),
                status: self.status.as_str().to_string(),
            });
        }
        if self.status != expected {
            return Err(DisputeError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: target.as_str().to_string(),
                reason: format!("expected status {}, got {}", expected, self.status),
            });
        }
        Ok(())
    }
}
