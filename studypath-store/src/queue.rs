//! Durable sync-queue log.
//!
//! Append-only storage for mutations awaiting remote replay. Entries get a
//! store-assigned auto-incrementing id; replay order is ascending id, which
//! matches insertion (and therefore timestamp) order. The drain logic lives
//! in the sync crate; this type only owns persistence.

use crate::error::{StoreError, StoreResult};
use crate::store::Store;
use rusqlite::params;
use std::sync::Arc;
use studypath_types::{QueueEntry, QueuedOperation, SyncStatus};

/// Counts reported by `getSyncStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueTotals {
    pub pending: usize,
    pub failed: usize,
    pub total: usize,
}

/// Persistence for the sync queue, backed by the shared store.
pub struct QueueStore {
    store: Arc<Store>,
}

impl QueueStore {
    /// Creates a queue store over the shared store.
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Appends a pending entry and returns its assigned id. The entry is
    /// durably committed before this returns.
    pub fn append(&self, op: &QueuedOperation, timestamp_ms: i64) -> StoreResult<i64> {
        let conn = self.store.lock();
        conn.execute(
            "INSERT INTO sync_queue (entity, op, payload, timestamp_ms, status, attempts) \
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                op.entity.as_str(),
                op.kind.as_str(),
                serde_json::to_string(&op.payload)?,
                timestamp_ms,
                SyncStatus::Pending.as_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All pending entries in replay order (ascending id).
    pub fn pending_in_order(&self) -> StoreResult<Vec<QueueEntry>> {
        self.select_entries("WHERE status = 'pending' ORDER BY id ASC")
    }

    /// Every entry regardless of status, in insertion order.
    pub fn entries(&self) -> StoreResult<Vec<QueueEntry>> {
        self.select_entries("ORDER BY id ASC")
    }

    /// Marks an entry as currently syncing.
    pub fn mark_syncing(&self, id: i64) -> StoreResult<()> {
        self.set_status(id, SyncStatus::Syncing)
    }

    /// Records a failed replay attempt: increments the attempt counter and
    /// either requeues the entry as pending or, once `max_attempts` is
    /// reached, promotes it to failed. Returns the resulting status.
    pub fn record_failure(&self, id: i64, max_attempts: u32) -> StoreResult<SyncStatus> {
        let conn = self.store.lock();
        let attempts: u32 = conn.query_row(
            "UPDATE sync_queue SET attempts = attempts + 1 WHERE id = ?1 RETURNING attempts",
            params![id],
            |row| row.get(0),
        )?;
        let status = if attempts >= max_attempts {
            SyncStatus::Failed
        } else {
            SyncStatus::Pending
        };
        conn.execute(
            "UPDATE sync_queue SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        Ok(status)
    }

    /// Marks an entry as failed outright, bypassing the retry counter.
    /// Used for operations the remote can never accept.
    pub fn mark_failed(&self, id: i64) -> StoreResult<()> {
        self.set_status(id, SyncStatus::Failed)
    }

    /// Removes an entry after confirmed remote success.
    pub fn remove(&self, id: i64) -> StoreResult<()> {
        self.store
            .lock()
            .execute("DELETE FROM sync_queue WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Resets every failed entry to pending with a fresh attempt counter.
    /// Returns how many entries were reset.
    pub fn retry_failed(&self) -> StoreResult<usize> {
        let reset = self.store.lock().execute(
            "UPDATE sync_queue SET status = 'pending', attempts = 0 WHERE status = 'failed'",
            [],
        )?;
        Ok(reset)
    }

    /// Counts entries by scanning the queue table.
    pub fn totals(&self) -> StoreResult<QueueTotals> {
        let conn = self.store.lock();
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM sync_queue GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut totals = QueueTotals::default();
        for row in rows {
            let (status, count) = row?;
            let count = count as usize;
            totals.total += count;
            match status.parse::<SyncStatus>() {
                Ok(SyncStatus::Pending) => totals.pending += count,
                Ok(SyncStatus::Failed) => totals.failed += count,
                Ok(SyncStatus::Syncing) => {}
                Err(e) => return Err(StoreError::InvalidData(e.to_string())),
            }
        }
        Ok(totals)
    }

    fn set_status(&self, id: i64, status: SyncStatus) -> StoreResult<()> {
        self.store.lock().execute(
            "UPDATE sync_queue SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        Ok(())
    }

    fn select_entries(&self, suffix: &str) -> StoreResult<Vec<QueueEntry>> {
        let conn = self.store.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, entity, op, payload, timestamp_ms, status, attempts FROM sync_queue {suffix}"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, entity, op, payload, timestamp_ms, status, attempts) = row?;
            entries.push(QueueEntry {
                id,
                op: QueuedOperation {
                    kind: op
                        .parse()
                        .map_err(|e: studypath_types::Error| StoreError::InvalidData(e.to_string()))?,
                    entity: entity
                        .parse()
                        .map_err(|e: studypath_types::Error| StoreError::InvalidData(e.to_string()))?,
                    payload: serde_json::from_str(&payload)?,
                },
                timestamp_ms,
                status: status
                    .parse()
                    .map_err(|e: studypath_types::Error| StoreError::InvalidData(e.to_string()))?,
                attempts: attempts as u32,
            });
        }
        Ok(entries)
    }
}
