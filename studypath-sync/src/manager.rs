//! Offline manager — the single API surface the application uses.
//!
//! Composes the persistent store, response cache, network monitor, and
//! sync queue processor. Local writes always succeed regardless of
//! connectivity; every mutation routed through `queue_operation` is
//! durably logged and replayed once the remote service is reachable.

use crate::error::{SyncError, SyncResult};
use crate::monitor::{MonitorConfig, NetworkMonitor, NetworkStatus, Subscription};
use crate::queue::{DrainOutcome, QueueConfig, SyncQueue};
use crate::remote::RemoteApi;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use studypath_store::{Collection, QueueStore, QueueTotals, ResponseCache, Store, StoreResult};
use studypath_types::{ExamResult, PlanDocument, QueuedOperation, SubjectId, SubjectProfile};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Configuration for the offline manager and its components.
#[derive(Debug, Clone)]
pub struct OfflineConfig {
    pub queue: QueueConfig,
    pub monitor: MonitorConfig,
    /// How often expired cache entries are swept, or `None` to rely on
    /// lazy read-time eviction only.
    pub cache_sweep_interval: Option<Duration>,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            monitor: MonitorConfig::default(),
            cache_sweep_interval: Some(Duration::from_secs(10 * 60)),
        }
    }
}

/// Orchestrates offline-first persistence and synchronization.
pub struct OfflineManager {
    store: Arc<Store>,
    cache: Arc<ResponseCache>,
    queue: Arc<SyncQueue>,
    monitor: Arc<NetworkMonitor>,
    config: OfflineConfig,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl OfflineManager {
    /// Wires the components around a shared store and a remote client.
    /// Call [`start`] to begin probing and reconnect-draining.
    ///
    /// [`start`]: OfflineManager::start
    pub fn new(store: Arc<Store>, remote: Arc<dyn RemoteApi>, config: OfflineConfig) -> Arc<Self> {
        let monitor = Arc::new(NetworkMonitor::new(
            Arc::clone(&remote),
            config.monitor.clone(),
        ));
        let queue = Arc::new(SyncQueue::new(
            QueueStore::new(Arc::clone(&store)),
            remote,
            config.queue.clone(),
        ));
        let cache = Arc::new(ResponseCache::new(Arc::clone(&store)));
        Arc::new(Self {
            store,
            cache,
            queue,
            monitor,
            config,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Starts the probe loop, the reconnect-triggered drain, and the
    /// optional cache sweeper.
    pub fn start(self: &Arc<Self>) {
        self.monitor.start();

        // One drain attempt per offline→online transition. The watch
        // channel coalesces repeated sends of the same status, and the
        // queue's own guard drops overlapping triggers.
        let mut rx = self.monitor.subscribe();
        let queue = Arc::clone(&self.queue);
        let drain_task = tokio::spawn(async move {
            let mut prev = *rx.borrow_and_update();
            while rx.changed().await.is_ok() {
                let next = *rx.borrow_and_update();
                if next == NetworkStatus::Online && prev != NetworkStatus::Online {
                    info!("connectivity restored; draining sync queue");
                    if let Err(err) = queue.drain().await {
                        warn!(error = %err, "reconnect drain failed");
                    }
                }
                prev = next;
            }
        });

        let mut tasks = self.tasks.lock().unwrap();
        tasks.push(drain_task);

        if let Some(every) = self.config.cache_sweep_interval {
            let cache = Arc::clone(&self.cache);
            tasks.push(tokio::spawn(async move {
                let mut interval = tokio::time::interval(every);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                interval.tick().await; // immediate first tick
                loop {
                    interval.tick().await;
                    let cache = Arc::clone(&cache);
                    let swept =
                        tokio::task::spawn_blocking(move || cache.sweep_expired()).await;
                    if let Ok(Err(err)) = swept {
                        warn!(error = %err, "cache sweep failed");
                    }
                }
            }));
        }
    }

    /// Stops background tasks. Queued entries stay durable; the next
    /// `start` (or an explicit `force_sync`) picks them up.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
        self.monitor.stop();
    }

    // ── Composite documents ─────────────────────────────────────

    /// Persists a plan document locally, decomposed into per-collection
    /// writes inside one transaction: either the whole composite lands or
    /// none of it does.
    pub async fn save_locally(&self, document: &PlanDocument) -> SyncResult<()> {
        let doc = document.clone();
        self.with_store(move |store| {
            store.with_transaction(|tx| {
                tx.put(Collection::Profiles, &doc.profile)?;
                tx.put_batch(Collection::ScheduleItems, &doc.schedule)?;
                for exam in &doc.exams {
                    tx.put(Collection::Exams, exam)?;
                }
                for result in &doc.results {
                    tx.put(Collection::Results, result)?;
                }
                for deck in &doc.decks {
                    tx.put(Collection::FlashcardDecks, deck)?;
                }
                Ok(())
            })
        })
        .await
    }

    /// Reconstructs a subject's plan document from the local collections.
    /// Returns `None` if no profile exists for the subject.
    pub async fn load_locally(&self, subject: &SubjectId) -> SyncResult<Option<PlanDocument>> {
        let subject = subject.clone();
        self.with_store(move |store| {
            let profile: Option<SubjectProfile> =
                store.get(Collection::Profiles, subject.as_str())?;
            let Some(profile) = profile else {
                return Ok(None);
            };

            let schedule =
                store.get_by_index(Collection::ScheduleItems, "subject", subject.as_str())?;
            let exams = store.get_by_index(Collection::Exams, "subject", subject.as_str())?;
            let decks =
                store.get_by_index(Collection::FlashcardDecks, "subject", subject.as_str())?;
            // Results are only indexed by date, so filter the full scan.
            let results: Vec<ExamResult> = store
                .get_all(Collection::Results)?
                .into_iter()
                .filter(|r: &ExamResult| r.subject == subject)
                .collect();

            Ok(Some(PlanDocument {
                profile,
                schedule,
                exams,
                results,
                decks,
            }))
        })
        .await
    }

    // ── Sync queue ──────────────────────────────────────────────

    /// Durably queues a mutation for remote replay. If the monitor
    /// currently reports online, a drain is attempted immediately in the
    /// background.
    pub async fn queue_operation(&self, op: QueuedOperation) -> SyncResult<i64> {
        let id = self.queue.enqueue(op).await?;
        if self.monitor.current() == NetworkStatus::Online {
            let queue = Arc::clone(&self.queue);
            tokio::spawn(async move {
                if let Err(err) = queue.drain().await {
                    warn!(error = %err, "post-enqueue drain failed");
                }
            });
        }
        Ok(id)
    }

    /// Drains the queue now. Fails with [`SyncError::Offline`] without
    /// touching the remote if the monitor reports anything but online.
    pub async fn force_sync(&self) -> SyncResult<DrainOutcome> {
        if self.monitor.current() != NetworkStatus::Online {
            return Err(SyncError::Offline);
        }
        self.queue.drain().await
    }

    /// Counts of pending, failed, and total queue entries.
    pub async fn sync_status(&self) -> SyncResult<QueueTotals> {
        self.queue.status().await
    }

    /// Requeues entries that exhausted their retries.
    pub async fn retry_failed(&self) -> SyncResult<usize> {
        self.queue.retry_failed().await
    }

    // ── Response cache ──────────────────────────────────────────

    /// Caches a remote response under `key`. `ttl` defaults to one hour.
    pub async fn cache_response<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        ttl: Option<Duration>,
    ) -> SyncResult<()> {
        let key = key.to_string();
        let value = serde_json::to_value(data)?;
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || cache.put(&key, &value, ttl))
            .await
            .map_err(|e| SyncError::TaskJoin(e.to_string()))?
            .map_err(Into::into)
    }

    /// Returns the cached response for `key`, or `None` if absent or
    /// expired.
    pub async fn cached_response<T>(&self, key: &str) -> SyncResult<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let key = key.to_string();
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || cache.get(&key))
            .await
            .map_err(|e| SyncError::TaskJoin(e.to_string()))?
            .map_err(Into::into)
    }

    // ── Network status ──────────────────────────────────────────

    /// The current network status.
    pub fn network_status(&self) -> NetworkStatus {
        self.monitor.current()
    }

    /// Applies a host-reported connectivity event.
    pub fn set_host_status(&self, online: bool) {
        self.monitor.set_host_status(online);
    }

    /// Registers a status-change callback; see
    /// [`NetworkMonitor::on_status_change`].
    pub fn on_network_status_change<F>(&self, cb: F) -> Subscription
    where
        F: Fn(NetworkStatus) + Send + 'static,
    {
        self.monitor.on_status_change(cb)
    }

    /// The underlying monitor, for subscription-based consumers.
    pub fn monitor(&self) -> &Arc<NetworkMonitor> {
        &self.monitor
    }

    async fn with_store<T, F>(&self, f: F) -> SyncResult<T>
    where
        F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| SyncError::TaskJoin(e.to_string()))?
            .map_err(Into::into)
    }
}
