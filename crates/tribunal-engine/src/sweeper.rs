//! # Deadline Sweeper
//!
//! Optional background task that periodically finalizes voting disputes
//! whose deadline has passed. Deadline enforcement does not depend on it:
//! a late vote is rejected at intake regardless. The sweeper only moves
//! overdue disputes to their terminal status without waiting for the next
//! rejected vote to surface them.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use tribunal_store::DisputeStore;

use crate::engine::DisputeEngine;

/// Spawn the periodic deadline sweep.
///
/// Runs until the returned handle is aborted. Sweep failures are logged at
/// WARN and the task keeps ticking.
pub fn run_deadline_sweeper<S: DisputeStore>(
    engine: Arc<DisputeEngine<S>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = engine.sweep_expired().await {
                tracing::warn!(error = %e, "deadline sweep failed");
            }
        }
    })
}
