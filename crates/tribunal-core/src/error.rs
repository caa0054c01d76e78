//! # Domain Error Types
//!
//! Structured errors for the dispute record itself. Every variant carries
//! enough context for operators to diagnose the failure without inspecting
//! logs: state machine rejections include the current state, the attempted
//! target, and the rejection reason.

use thiserror::Error;

/// Errors arising from dispute record operations.
#[derive(Error, Debug)]
pub enum DisputeError {
    /// Attempted status transition is not valid from the current status.
    #[error("invalid dispute transition from {from} to {to}: {reason}")]
    InvalidTransition {
        /// The current status name.
        from: String,
        /// The attempted target status name.
        to: String,
        /// Human-readable reason for the rejection.
        reason: String,
    },

    /// Dispute is in a terminal status and cannot accept further transitions.
    #[error("dispute {dispute_id} is in terminal status {status}")]
    TerminalStatus {
        /// The dispute identifier.
        dispute_id: String,
        /// The terminal status name.
        status: String,
    },

    /// A panel assignment was attempted with no jurors.
    #[error("dispute {dispute_id} cannot enter voting with an empty panel")]
    EmptyPanel {
        /// The dispute identifier.
        dispute_id: String,
    },

    /// Finalization was attempted without a decided outcome.
    #[error("outcome {outcome} cannot be recorded as a final outcome")]
    UndecidedOutcome {
        /// The rejected outcome name.
        outcome: String,
    },

    /// A string did not parse as a known enum value.
    #[error("unknown {kind} value: \"{value}\"")]
    UnknownValue {
        /// Which enum was being parsed ("status", "outcome", "decision").
        kind: &'static str,
        /// The offending input.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_display() {
        let err = DisputeError::InvalidTransition {
            from: "resolved".to_string(),
            to: "voting".to_string(),
            reason: "panel is assigned exactly once".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("resolved"));
        assert!(msg.contains("voting"));
        assert!(msg.contains("exactly once"));
    }

    #[test]
    fn terminal_status_display() {
        let err = DisputeError::TerminalStatus {
            dispute_id: "dispute:0000".to_string(),
            status: "escalated".to_string(),
        };
        assert!(format!("{err}").contains("escalated"));
    }

    #[test]
    fn unknown_value_display() {
        let err = DisputeError::UnknownValue {
            kind: "decision",
            value: "maybe".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("decision"));
        assert!(msg.contains("maybe"));
    }
}
