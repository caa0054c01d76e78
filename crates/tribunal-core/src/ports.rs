//! # Collaborator Ports
//!
//! Trait seams for the two external systems the engine talks to: the juror
//! pool and the notification service. Both are object-safe async traits so
//! hosts can plug in database-backed or queue-backed implementations while
//! tests use in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::identity::UserId;

// ── Juror directory ────────────────────────────────────────────────────

/// A juror candidate with the reputation score used for ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JurorProfile {
    /// The juror's user identifier.
    pub user_id: UserId,
    /// Reputation score; higher ranks earlier in candidate selection.
    pub reputation: i64,
}

/// The juror pool could not be queried.
#[derive(Error, Debug)]
#[error("juror directory unavailable: {0}")]
pub struct DirectoryError(pub String);

/// Read access to the pool of users eligible to serve as jurors.
///
/// Implementations return a point-in-time snapshot; the engine re-ranks by
/// reputation itself, so ordering of the returned profiles is not load-bearing.
#[async_trait]
pub trait JurorDirectory: Send + Sync {
    /// All users currently eligible to serve on a panel.
    async fn eligible_jurors(&self) -> Result<Vec<JurorProfile>, DirectoryError>;
}

// ── Notification sink ──────────────────────────────────────────────────

/// The category of a notification, selecting the downstream template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Sent to each juror when they are seated on a panel.
    JurorAssigned,
    /// Sent to the dispute creator when the dispute reaches a terminal status.
    DisputeResolved,
}

impl NotificationKind {
    /// The canonical wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JurorAssigned => "dispute_assignment",
            Self::DisputeResolved => "dispute_resolution",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification could not be delivered.
#[derive(Error, Debug)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound notification delivery.
///
/// The engine only calls this after a transaction has committed, and treats
/// delivery failure as non-fatal. Implementations own any retry policy.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification to one user.
    async fn notify(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), NotifyError>;
}
