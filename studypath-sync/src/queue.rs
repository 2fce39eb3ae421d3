//! Sync queue processor.
//!
//! Drains the durable mutation log against the remote service. Exactly one
//! drain runs at a time: a trigger that arrives mid-drain is dropped, not
//! deferred, so work enqueued during a drain waits for the next trigger
//! (probe tick, reconnect, or an explicit force sync).

use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteApi;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use studypath_store::{QueueStore, QueueTotals, StoreResult};
use studypath_types::{EntityKind, OperationKind, QueueEntry, QueuedOperation, SyncStatus};
use tracing::{debug, info, warn};

/// Configuration for the queue processor.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Failed replay attempts before an entry is promoted to `Failed` and
    /// no longer retried automatically.
    pub max_attempts: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

/// What a drain pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Entries the pass replayed (or tried to).
    pub attempted: usize,
    /// Entries confirmed by the remote and removed.
    pub synced: usize,
    /// Entries promoted to `Failed` during this pass.
    pub failed: usize,
}

/// Result of a drain trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Another drain was already running; this trigger did nothing.
    AlreadyRunning,
    /// The pass ran to completion.
    Completed(DrainReport),
}

/// Replays the durable mutation log against the remote service.
pub struct SyncQueue {
    log: Arc<QueueStore>,
    remote: Arc<dyn RemoteApi>,
    config: QueueConfig,
    draining: AtomicBool,
}

impl SyncQueue {
    /// Creates a processor over the durable log and a remote client.
    pub fn new(log: QueueStore, remote: Arc<dyn RemoteApi>, config: QueueConfig) -> Self {
        Self {
            log: Arc::new(log),
            remote,
            config,
            draining: AtomicBool::new(false),
        }
    }

    /// Durably appends a pending operation; returns its assigned id once
    /// committed.
    pub async fn enqueue(&self, op: QueuedOperation) -> SyncResult<i64> {
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        let id = self
            .with_log(move |log| log.append(&op, timestamp_ms))
            .await?;
        debug!(id, "operation queued for sync");
        Ok(id)
    }

    /// Drains pending entries in insertion order, sequentially. A call
    /// while another drain is running returns `AlreadyRunning` without
    /// touching the queue. One entry's failure never aborts the rest of
    /// the pass.
    pub async fn drain(&self) -> SyncResult<DrainOutcome> {
        if self
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("drain already in progress; trigger dropped");
            return Ok(DrainOutcome::AlreadyRunning);
        }

        let result = self.drain_pass().await;
        self.draining.store(false, Ordering::SeqCst);
        result.map(DrainOutcome::Completed)
    }

    /// Whether a drain pass is currently running.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Counts of pending, failed, and total entries.
    pub async fn status(&self) -> SyncResult<QueueTotals> {
        self.with_log(|log| log.totals()).await
    }

    /// Requeues failed entries as pending. Returns how many were reset.
    pub async fn retry_failed(&self) -> SyncResult<usize> {
        self.with_log(|log| log.retry_failed()).await
    }

    async fn drain_pass(&self) -> SyncResult<DrainReport> {
        let pending = self.with_log(|log| log.pending_in_order()).await?;
        if pending.is_empty() {
            return Ok(DrainReport::default());
        }

        info!(entries = pending.len(), "draining sync queue");
        let mut report = DrainReport {
            attempted: pending.len(),
            ..DrainReport::default()
        };

        for entry in pending {
            let id = entry.id;
            self.with_log(move |log| log.mark_syncing(id)).await?;

            match self.replay(&entry).await {
                Ok(()) => {
                    self.with_log(move |log| log.remove(id)).await?;
                    report.synced += 1;
                    debug!(id, entity = %entry.op.entity, "entry synced and removed");
                }
                Err(err @ (SyncError::UnsupportedOperation { .. } | SyncError::InvalidPayload(_))) => {
                    // The remote can never accept this entry; retrying is pointless.
                    warn!(id, error = %err, "entry permanently failed");
                    self.with_log(move |log| log.mark_failed(id)).await?;
                    report.failed += 1;
                }
                Err(err) => {
                    warn!(id, entity = %entry.op.entity, error = %err, "entry replay failed");
                    let max = self.config.max_attempts;
                    let status = self.with_log(move |log| log.record_failure(id, max)).await?;
                    if status == SyncStatus::Failed {
                        warn!(id, "entry exhausted retries; marked failed");
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            attempted = report.attempted,
            synced = report.synced,
            failed = report.failed,
            "sync drain finished"
        );
        Ok(report)
    }

    /// Replays one entry against the matching remote endpoint.
    async fn replay(&self, entry: &QueueEntry) -> SyncResult<()> {
        let payload = &entry.op.payload;
        match (entry.op.entity, entry.op.kind) {
            (EntityKind::Schedule, OperationKind::Create) => {
                if payload.is_array() {
                    self.remote.create_schedule_items(payload).await
                } else {
                    self.remote.create_schedule_item(payload).await
                }
            }
            (EntityKind::Schedule, OperationKind::Update) => {
                self.remote.move_schedule_items(payload).await
            }
            (EntityKind::Schedule, OperationKind::Delete) => {
                if payload.is_null() {
                    self.remote.clear_schedule().await
                } else if payload.is_array() {
                    self.remote.delete_schedule_items(payload).await
                } else {
                    self.remote.delete_schedule_item(&record_id(payload)?).await
                }
            }
            (EntityKind::Exam, OperationKind::Create) => self.remote.create_exam(payload).await,
            (EntityKind::Exam, OperationKind::Update) => self.remote.update_exam(payload).await,
            (EntityKind::Exam, OperationKind::Delete) => {
                self.remote.delete_exam(&record_id(payload)?).await
            }
            // Results are upserted remotely, so local creates replay as updates.
            (EntityKind::Result, OperationKind::Create | OperationKind::Update) => {
                self.remote.update_result(payload).await
            }
            (EntityKind::Result, OperationKind::Delete) => {
                self.remote.delete_result(&record_id(payload)?).await
            }
            // Decks and app config live inside the remote profile document.
            (EntityKind::Flashcard | EntityKind::Config, OperationKind::Create | OperationKind::Update) => {
                self.remote.update_profile(payload).await
            }
            (EntityKind::Flashcard, OperationKind::Delete) => {
                self.remote.update_profile(payload).await
            }
            (EntityKind::Session, OperationKind::Create) => {
                self.remote.create_study_session(payload).await
            }
            (entity, kind) => Err(SyncError::UnsupportedOperation { entity, kind }),
        }
    }

    async fn with_log<T, F>(&self, f: F) -> SyncResult<T>
    where
        F: FnOnce(&QueueStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let log = Arc::clone(&self.log);
        tokio::task::spawn_blocking(move || f(&log))
            .await
            .map_err(|e| SyncError::TaskJoin(e.to_string()))?
            .map_err(Into::into)
    }
}

/// Extracts the record id a single-record delete endpoint needs.
fn record_id(payload: &Value) -> SyncResult<String> {
    payload
        .get("id")
        .and_then(Value::as_str)
        .or_else(|| payload.as_str())
        .map(str::to_string)
        .ok_or_else(|| SyncError::InvalidPayload("delete payload has no id".to_string()))
}
