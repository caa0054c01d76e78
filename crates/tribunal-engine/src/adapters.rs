//! # Port Adapters
//!
//! In-process implementations of the engine's ports: a tracing-backed
//! notification sink for deployments without a delivery pipeline, a
//! recording sink for assertions, and a fixed in-memory juror directory.
//! Production hosts plug in their own implementations (e.g. the
//! Postgres-backed directory in `tribunal-store`).

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use tribunal_core::{
    DirectoryError, JurorDirectory, JurorProfile, NotificationKind, NotificationSink, NotifyError,
    UserId,
};

// ── Sinks ──────────────────────────────────────────────────────────────

/// A sink that logs every notification and delivers nowhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), NotifyError> {
        tracing::info!(user = %user_id, kind = %kind, payload = %payload, "notification");
        Ok(())
    }
}

/// One delivery captured by a [`RecordingSink`].
#[derive(Debug, Clone)]
pub struct Delivery {
    /// The recipient.
    pub user_id: UserId,
    /// The notification category.
    pub kind: NotificationKind,
    /// The notification payload.
    pub payload: serde_json::Value,
}

/// A sink that records every delivery for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, in delivery order.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    /// How many deliveries of the given kind have been made.
    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.deliveries.lock().iter().filter(|d| d.kind == kind).count()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), NotifyError> {
        self.deliveries.lock().push(Delivery {
            user_id,
            kind,
            payload,
        });
        Ok(())
    }
}

// ── Directory ──────────────────────────────────────────────────────────

/// A juror directory over a fixed in-memory pool.
#[derive(Debug, Default)]
pub struct FixedJurorDirectory {
    jurors: RwLock<Vec<JurorProfile>>,
}

impl FixedJurorDirectory {
    /// Create a directory over the given pool.
    pub fn new(jurors: Vec<JurorProfile>) -> Self {
        Self {
            jurors: RwLock::new(jurors),
        }
    }

    /// Add one juror to the pool.
    pub fn push(&self, juror: JurorProfile) {
        self.jurors.write().push(juror);
    }
}

#[async_trait]
impl JurorDirectory for FixedJurorDirectory {
    async fn eligible_jurors(&self) -> Result<Vec<JurorProfile>, DirectoryError> {
        Ok(self.jurors.read().clone())
    }
}
