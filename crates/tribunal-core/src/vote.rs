//! # Votes and Tallying
//!
//! A [`Vote`] is one juror's immutable decision on a dispute. The store
//! enforces at most one vote per (dispute, juror) pair; this module only
//! models the record and the tally arithmetic.
//!
//! [`VoteTally`] derives the dispute outcome from the collected decisions:
//! abstentions count toward quorum but never toward the result, a majority of
//! decisive votes resolves the dispute, a decisive tie resolves it as tied,
//! and a panel with zero decisive votes escalates to manual review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dispute::DisputeOutcome;
use crate::error::DisputeError;
use crate::identity::{DisputeId, UserId, VoteId};

// ── Decision ───────────────────────────────────────────────────────────

/// A juror's decision on a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDecision {
    /// Side with the dispute creator.
    Uphold,
    /// Side against the dispute creator.
    Reject,
    /// Decline to take a side; counts toward quorum only.
    Abstain,
}

impl VoteDecision {
    /// The canonical wire name of this decision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uphold => "uphold",
            Self::Reject => "reject",
            Self::Abstain => "abstain",
        }
    }

    /// Whether this decision counts toward the outcome.
    pub fn is_decisive(&self) -> bool {
        !matches!(self, Self::Abstain)
    }
}

impl std::fmt::Display for VoteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VoteDecision {
    type Err = DisputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uphold" => Ok(Self::Uphold),
            "reject" => Ok(Self::Reject),
            "abstain" => Ok(Self::Abstain),
            other => Err(DisputeError::UnknownValue {
                kind: "decision",
                value: other.to_string(),
            }),
        }
    }
}

// ── The Vote ───────────────────────────────────────────────────────────

/// A single juror's vote on a dispute. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    /// Unique vote identifier.
    pub id: VoteId,
    /// The dispute being voted on.
    pub dispute_id: DisputeId,
    /// The juror casting the vote.
    pub juror_id: UserId,
    /// The juror's decision.
    pub decision: VoteDecision,
    /// Optional free-text reasoning.
    pub reasoning: Option<String>,
    /// When the vote was cast (UTC).
    pub created_at: DateTime<Utc>,
}

impl Vote {
    /// Cast a new vote.
    pub fn cast(
        dispute_id: DisputeId,
        juror_id: UserId,
        decision: VoteDecision,
        reasoning: Option<String>,
    ) -> Self {
        Self {
            id: VoteId::new(),
            dispute_id,
            juror_id,
            decision,
            reasoning,
            created_at: Utc::now(),
        }
    }
}

// ── Tally ──────────────────────────────────────────────────────────────

/// Decision counts for a dispute's collected votes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Votes siding with the creator.
    pub upholds: usize,
    /// Votes siding against the creator.
    pub rejects: usize,
    /// Abstentions.
    pub abstains: usize,
}

impl VoteTally {
    /// Tally a slice of votes.
    pub fn from_votes(votes: &[Vote]) -> Self {
        let mut tally = Self::default();
        for vote in votes {
            tally.record(vote.decision);
        }
        tally
    }

    /// Record one decision.
    pub fn record(&mut self, decision: VoteDecision) {
        match decision {
            VoteDecision::Uphold => self.upholds += 1,
            VoteDecision::Reject => self.rejects += 1,
            VoteDecision::Abstain => self.abstains += 1,
        }
    }

    /// Total votes collected, abstentions included.
    pub fn total(&self) -> usize {
        self.upholds + self.rejects + self.abstains
    }

    /// Decisive votes, abstentions excluded.
    pub fn decisive(&self) -> usize {
        self.upholds + self.rejects
    }

    /// Derive the dispute outcome.
    ///
    /// Zero decisive votes escalates; otherwise the decisive majority wins
    /// and an even split is tied.
    pub fn outcome(&self) -> DisputeOutcome {
        if self.decisive() == 0 {
            DisputeOutcome::Escalated
        } else if self.upholds > self.rejects {
            DisputeOutcome::Upheld
        } else if self.upholds < self.rejects {
            DisputeOutcome::Rejected
        } else {
            DisputeOutcome::Tied
        }
    }

    /// Render the human-readable summary stored on the dispute at
    /// finalization, e.g. `"upheld 2-1 (1 abstained)"`.
    pub fn summary(&self) -> String {
        let mut summary = match self.outcome() {
            DisputeOutcome::Upheld => format!("upheld {}-{}", self.upholds, self.rejects),
            DisputeOutcome::Rejected => format!("rejected {}-{}", self.rejects, self.upholds),
            DisputeOutcome::Tied => format!("tied {}-{}", self.upholds, self.rejects),
            DisputeOutcome::Escalated | DisputeOutcome::Pending => {
                "escalated with no decisive votes".to_string()
            }
        };
        if self.abstains > 0 {
            summary.push_str(&format!(" ({} abstained)", self.abstains));
        }
        summary
    }
}
