//! Shared test doubles for the sync engine tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use studypath_sync::{RemoteApi, SyncError, SyncResult};

/// In-memory stand-in for the remote service.
///
/// Records every mutation call as `"method:label"` (the label being the
/// payload's `label` field, when present) so tests can assert call order.
/// Individual calls can be made to fail by method name or by the full
/// recorded string.
#[derive(Default)]
pub struct MockRemote {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    reachable: AtomicBool,
    pings: AtomicUsize,
    latency: Mutex<Duration>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self {
            reachable: AtomicBool::new(true),
            ..Self::default()
        }
    }

    /// Makes matching calls fail with a mock 500 until cleared.
    pub fn fail_on(&self, target: &str) {
        self.failing.lock().unwrap().insert(target.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Controls whether `ping` succeeds.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Adds artificial latency to every mutation call.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    /// Every recorded mutation call, in order. Pings are not included.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn ping_count(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    async fn call(&self, method: &str, payload: Option<&Value>) -> SyncResult<()> {
        let label = payload
            .and_then(|p| p.get("label"))
            .and_then(Value::as_str)
            .unwrap_or("-");
        let full = format!("{method}:{label}");
        self.calls.lock().unwrap().push(full.clone());

        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let failing = self.failing.lock().unwrap();
        if failing.contains(method) || failing.contains(&full) {
            return Err(SyncError::Remote {
                status: 500,
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn ping(&self) -> SyncResult<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SyncError::Network("mock unreachable".to_string()))
        }
    }

    async fn update_profile(&self, payload: &Value) -> SyncResult<()> {
        self.call("update_profile", Some(payload)).await
    }

    async fn create_schedule_item(&self, payload: &Value) -> SyncResult<()> {
        self.call("create_schedule_item", Some(payload)).await
    }

    async fn create_schedule_items(&self, payload: &Value) -> SyncResult<()> {
        self.call("create_schedule_items", Some(payload)).await
    }

    async fn delete_schedule_item(&self, _id: &str) -> SyncResult<()> {
        self.call("delete_schedule_item", None).await
    }

    async fn delete_schedule_items(&self, ids: &Value) -> SyncResult<()> {
        self.call("delete_schedule_items", Some(ids)).await
    }

    async fn move_schedule_items(&self, payload: &Value) -> SyncResult<()> {
        self.call("move_schedule_items", Some(payload)).await
    }

    async fn clear_schedule(&self) -> SyncResult<()> {
        self.call("clear_schedule", None).await
    }

    async fn create_exam(&self, payload: &Value) -> SyncResult<()> {
        self.call("create_exam", Some(payload)).await
    }

    async fn update_exam(&self, payload: &Value) -> SyncResult<()> {
        self.call("update_exam", Some(payload)).await
    }

    async fn delete_exam(&self, _id: &str) -> SyncResult<()> {
        self.call("delete_exam", None).await
    }

    async fn update_result(&self, payload: &Value) -> SyncResult<()> {
        self.call("update_result", Some(payload)).await
    }

    async fn delete_result(&self, _id: &str) -> SyncResult<()> {
        self.call("delete_result", None).await
    }

    async fn create_study_session(&self, payload: &Value) -> SyncResult<()> {
        self.call("create_study_session", Some(payload)).await
    }
}
