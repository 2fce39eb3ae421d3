//! Offline-first sync engine for StudyPath.
//!
//! Keeps the application fully functional with no network: every mutation
//! is persisted locally and recorded in a durable sync queue, then replayed
//! against the remote service once connectivity returns.
//!
//! # Architecture
//!
//! - **Monitor**: tracks connectivity via host events plus a periodic
//!   liveness probe, publishing transitions through a watch channel
//! - **Queue**: drains the durable mutation log sequentially, in insertion
//!   order, guarded so only one drain runs at a time
//! - **Remote**: the service's CRUD surface as a trait, with an HTTP
//!   implementation
//! - **Manager**: composes the above with the persistent store and the
//!   response cache into the one API the application calls
//!
//! # Sync process
//!
//! 1. A local mutation is saved to the store and enqueued
//! 2. The monitor detects (or a probe confirms) the service is reachable
//! 3. The reconnect transition triggers a drain
//! 4. Each queued entry is replayed against its remote endpoint; success
//!    removes it, failure leaves it for the next drain
//!
//! Delivery is at-least-once; the remote endpoints are assumed idempotent.
//! Conflicts resolve last-write-wins.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use studypath_store::Store;
//! use studypath_sync::{HttpRemote, OfflineConfig, OfflineManager, RemoteConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(Store::open("studypath.db")?);
//! let remote = Arc::new(HttpRemote::new(RemoteConfig::default()));
//! let manager = OfflineManager::new(store, remote, OfflineConfig::default());
//! manager.start();
//! # Ok(())
//! # }
//! ```

mod error;
mod http;
mod manager;
mod monitor;
mod queue;
mod remote;

pub use error::{SyncError, SyncResult};
pub use http::{HttpRemote, RemoteConfig};
pub use manager::{OfflineConfig, OfflineManager};
pub use monitor::{
    wait_for_status, MonitorConfig, NetworkMonitor, NetworkStatus, Subscription,
};
pub use queue::{DrainOutcome, DrainReport, QueueConfig, SyncQueue};
pub use remote::RemoteApi;
