//! # tribunal-engine — Dispute Lifecycle Orchestration
//!
//! The service layer of the adjudication system:
//!
//! - **Engine** ([`engine`]): Dispute creation, juror assignment, vote
//!   intake with exactly-once finalization, and deadline enforcement, all
//!   under per-dispute exclusive transactions.
//!
//! - **Sweeper** ([`sweeper`]): Opt-in background task finalizing overdue
//!   disputes.
//!
//! - **Adapters** ([`adapters`]): In-process implementations of the juror
//!   directory and notification sink ports.
//!
//! - **Error** ([`error`]): The caller-facing `NotFound` / `BadRequest` /
//!   backend error taxonomy.

pub mod adapters;
pub mod engine;
pub mod error;
pub mod sweeper;

// Re-export primary types for ergonomic imports.

pub use adapters::{Delivery, FixedJurorDirectory, LogSink, RecordingSink};
pub use engine::{DisputeDetail, DisputeEngine, EngineConfig, NewDispute};
pub use error::EngineError;
pub use sweeper::run_deadline_sweeper;
