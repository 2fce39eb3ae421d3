//! Remote service abstraction.
//!
//! Defines the authenticated CRUD surface of the remote study-plan service
//! as a trait, so the queue processor and network monitor can run against
//! the real HTTP client or a test double. Payloads stay opaque JSON: the
//! engine replays them, it does not interpret them.

use crate::error::SyncResult;
use async_trait::async_trait;
use serde_json::Value;

/// The remote study-plan service.
///
/// All mutation endpoints are assumed idempotent on the remote side;
/// delivery is at-least-once.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Lightweight liveness probe against the status endpoint.
    async fn ping(&self) -> SyncResult<()>;

    // ── Profile ─────────────────────────────────────────────────

    /// Upserts profile fields (also carries flashcard decks and app
    /// config, which live inside the remote profile document).
    async fn update_profile(&self, payload: &Value) -> SyncResult<()>;

    // ── Schedule items ──────────────────────────────────────────

    async fn create_schedule_item(&self, payload: &Value) -> SyncResult<()>;
    async fn create_schedule_items(&self, payload: &Value) -> SyncResult<()>;
    async fn delete_schedule_item(&self, id: &str) -> SyncResult<()>;
    async fn delete_schedule_items(&self, ids: &Value) -> SyncResult<()>;
    async fn move_schedule_items(&self, payload: &Value) -> SyncResult<()>;
    async fn clear_schedule(&self) -> SyncResult<()>;

    // ── Exams ───────────────────────────────────────────────────

    async fn create_exam(&self, payload: &Value) -> SyncResult<()>;
    async fn update_exam(&self, payload: &Value) -> SyncResult<()>;
    async fn delete_exam(&self, id: &str) -> SyncResult<()>;

    // ── Results ─────────────────────────────────────────────────

    async fn update_result(&self, payload: &Value) -> SyncResult<()>;
    async fn delete_result(&self, id: &str) -> SyncResult<()>;

    // ── Study sessions ──────────────────────────────────────────

    async fn create_study_session(&self, payload: &Value) -> SyncResult<()>;
}
