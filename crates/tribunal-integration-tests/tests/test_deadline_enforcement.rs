//! Deadline enforcement: lazy rejection at vote intake and the opt-in
//! background sweep.
//!
//! A dispute whose deadline has passed stays in `voting` until something
//! touches it. A late vote is rejected without creating a record; the sweep
//! finalizes overdue disputes from whatever partial tally they collected.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};

use tribunal_core::{
    DisputeOutcome, DisputeStatus, JurorProfile, NotificationKind, UserId, VoteDecision,
};
use tribunal_engine::{
    run_deadline_sweeper, DisputeEngine, EngineError, FixedJurorDirectory, NewDispute,
    RecordingSink,
};
use tribunal_store::{DisputeStore, DisputeTxn, MemoryStore};

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

struct Harness {
    engine: Arc<DisputeEngine<MemoryStore>>,
    store: MemoryStore,
    sink: Arc<RecordingSink>,
}

fn harness(pool_size: usize) -> Harness {
    let store = MemoryStore::new();
    let sink = Arc::new(RecordingSink::new());
    let engine = Arc::new(DisputeEngine::new(
        store.clone(),
        Arc::new(FixedJurorDirectory::new(juror_pool(pool_size))),
        sink.clone(),
    ));
    Harness {
        engine,
        store,
        sink,
    }
}

fn new_dispute() -> NewDispute {
    NewDispute {
        title: "Abandoned engagement".to_string(),
        description: "Contractor stopped responding mid-engagement.".to_string(),
        evidence_urls: vec![],
        creator_id: UserId::new(),
    }
}

/// Rewind a voting dispute's deadline into the past, bypassing the engine.
async fn expire_deadline(store: &MemoryStore, id: tribunal_core::DisputeId) {
    let mut txn = store.begin(id).await.unwrap();
    txn.dispute_mut().voting_deadline = Some(Utc::now() - Duration::minutes(1));
    txn.commit().await.unwrap();
}

// ---------------------------------------------------------------------------
// Lazy enforcement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn late_vote_rejected_and_creates_no_record() {
    let h = harness(9);
    let dispute = h.engine.create_dispute(new_dispute()).await.unwrap();
    let jurors = dispute.assigned_juror_ids.clone();

    h.engine
        .vote(dispute.id, jurors[0], VoteDecision::Uphold, None)
        .await
        .unwrap();
    expire_deadline(&h.store, dispute.id).await;

    let result = h
        .engine
        .vote(dispute.id, jurors[1], VoteDecision::Reject, None)
        .await;
    match result {
        Err(EngineError::BadRequest { reason }) => assert!(reason.contains("deadline")),
        other => panic!("expected BadRequest, got {other:?}"),
    }

    // The rejected vote left nothing behind and the dispute is untouched.
    let detail = h.engine.get_dispute(dispute.id).await.unwrap();
    assert_eq!(detail.votes.len(), 1);
    assert_eq!(detail.dispute.status, DisputeStatus::Voting);
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sweep_finalizes_overdue_disputes_from_partial_tally() {
    let h = harness(9);

    // One overdue dispute with a single uphold vote, one overdue with no
    // votes, one still inside its window.
    let partial = h.engine.create_dispute(new_dispute()).await.unwrap();
    h.engine
        .vote(
            partial.id,
            partial.assigned_juror_ids[0],
            VoteDecision::Uphold,
            None,
        )
        .await
        .unwrap();
    let silent = h.engine.create_dispute(new_dispute()).await.unwrap();
    let current = h.engine.create_dispute(new_dispute()).await.unwrap();

    expire_deadline(&h.store, partial.id).await;
    expire_deadline(&h.store, silent.id).await;

    assert_eq!(h.engine.sweep_expired().await.unwrap(), 2);

    let partial = h.engine.get_dispute(partial.id).await.unwrap().dispute;
    assert_eq!(partial.status, DisputeStatus::Resolved);
    assert_eq!(partial.outcome, DisputeOutcome::Upheld);
    assert_eq!(partial.resolution_summary.as_deref(), Some("upheld 1-0"));

    let silent = h.engine.get_dispute(silent.id).await.unwrap().dispute;
    assert_eq!(silent.status, DisputeStatus::Escalated);
    assert_eq!(silent.outcome, DisputeOutcome::Escalated);

    let current = h.engine.get_dispute(current.id).await.unwrap().dispute;
    assert_eq!(current.status, DisputeStatus::Voting);

    // One resolution notification per finalized dispute, none for the rest.
    assert_eq!(h.sink.count_of(NotificationKind::DisputeResolved), 2);

    // Nothing left for the next cycle.
    assert_eq!(h.engine.sweep_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn background_sweeper_escalates_without_manual_calls() {
    let h = harness(9);
    let dispute = h.engine.create_dispute(new_dispute()).await.unwrap();
    expire_deadline(&h.store, dispute.id).await;

    let handle = run_deadline_sweeper(h.engine.clone(), StdDuration::from_millis(20));

    // Give the sweeper a few ticks.
    let deadline = std::time::Instant::now() + StdDuration::from_secs(2);
    loop {
        let status = h.engine.get_dispute(dispute.id).await.unwrap().dispute.status;
        if status == DisputeStatus::Escalated {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "sweeper never finalized the overdue dispute"
        );
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    handle.abort();
}
