//! The finalization decision table, exercised end to end through the engine.
//!
//! For a full 3-juror panel: a decisive majority resolves the dispute in
//! that direction, an even decisive split resolves it as tied, and a panel
//! with zero decisive votes escalates. Abstentions count toward panel
//! completion but never toward the result.

use std::sync::Arc;

use tribunal_core::{DisputeOutcome, DisputeStatus, JurorProfile, UserId, VoteDecision};
use tribunal_engine::{DisputeEngine, FixedJurorDirectory, LogSink, NewDispute};
use tribunal_store::MemoryStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn juror_pool(n: usize) -> Vec<JurorProfile> {
    (0..n)
        .map(|i| JurorProfile {
            user_id: UserId::new(),
            reputation: 1_000 - i as i64,
        })
        .collect()
}

/// Drive a fresh dispute through a full 3-juror panel casting `decisions`,
/// returning the finalized record.
async fn adjudicate(decisions: [VoteDecision; 3]) -> tribunal_core::Dispute {
    let engine = DisputeEngine::new(
        MemoryStore::new(),
        Arc::new(FixedJurorDirectory::new(juror_pool(9))),
        Arc::new(LogSink),
    );

    let dispute = engine
        .create_dispute(NewDispute {
            title: "Quality complaint".to_string(),
            description: "Delivered work fails the acceptance criteria.".to_string(),
            evidence_urls: vec![],
            creator_id: UserId::new(),
        })
        .await
        .unwrap();
    assert_eq!(dispute.assigned_juror_ids.len(), 3);

    for (juror, decision) in dispute.assigned_juror_ids.iter().zip(decisions) {
        engine
            .vote(dispute.id, *juror, decision, None)
            .await
            .unwrap();
    }

    engine.get_dispute(dispute.id).await.unwrap().dispute
}

// ---------------------------------------------------------------------------
// Decision table
// ---------------------------------------------------------------------------

#[tokio::test]
async fn uphold_majority_resolves_upheld() {
    use VoteDecision::*;
    let dispute = adjudicate([Uphold, Uphold, Reject]).await;
    assert_eq!(dispute.status, DisputeStatus::Resolved);
    assert_eq!(dispute.outcome, DisputeOutcome::Upheld);
    assert_eq!(dispute.resolution_summary.as_deref(), Some("upheld 2-1"));
}

#[tokio::test]
async fn reject_majority_resolves_rejected() {
    use VoteDecision::*;
    let dispute = adjudicate([Reject, Uphold, Reject]).await;
    assert_eq!(dispute.status, DisputeStatus::Resolved);
    assert_eq!(dispute.outcome, DisputeOutcome::Rejected);
    assert_eq!(dispute.resolution_summary.as_deref(), Some("rejected 2-1"));
}

#[tokio::test]
async fn abstention_breaks_the_panel_into_a_tie() {
    use VoteDecision::*;
    let dispute = adjudicate([Uphold, Abstain, Reject]).await;
    assert_eq!(dispute.status, DisputeStatus::Resolved);
    assert_eq!(dispute.outcome, DisputeOutcome::Tied);
    assert_eq!(
        dispute.resolution_summary.as_deref(),
        Some("tied 1-1 (1 abstained)")
    );
}

#[tokio::test]
async fn single_decisive_vote_decides() {
    use VoteDecision::*;
    let dispute = adjudicate([Abstain, Reject, Abstain]).await;
    assert_eq!(dispute.status, DisputeStatus::Resolved);
    assert_eq!(dispute.outcome, DisputeOutcome::Rejected);
    assert_eq!(
        dispute.resolution_summary.as_deref(),
        Some("rejected 1-0 (2 abstained)")
    );
}

#[tokio::test]
async fn all_abstentions_escalate() {
    use VoteDecision::*;
    let dispute = adjudicate([Abstain, Abstain, Abstain]).await;
    assert_eq!(dispute.status, DisputeStatus::Escalated);
    assert_eq!(dispute.outcome, DisputeOutcome::Escalated);
    assert_eq!(
        dispute.resolution_summary.as_deref(),
        Some("escalated with no decisive votes (3 abstained)")
    );
}
