//! Network status monitoring.
//!
//! Tracks connectivity from two sources: host-reported connectivity events
//! (applied immediately via `set_host_status`) and a periodic liveness
//! probe against the remote status endpoint. Status is published through a
//! `tokio::sync::watch` channel, so subscribers always see the latest
//! value first and then every transition.

use crate::remote::RemoteApi;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Connectivity state as determined by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    /// Before the first determination.
    Checking,
    Online,
    Offline,
}

/// Configuration for the network monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// How often the liveness probe runs.
    pub probe_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_secs(30),
        }
    }
}

/// Tracks connectivity and publishes transitions.
pub struct NetworkMonitor {
    status: watch::Sender<NetworkStatus>,
    remote: Arc<dyn RemoteApi>,
    config: MonitorConfig,
    probe_task: Mutex<Option<JoinHandle<()>>>,
}

impl NetworkMonitor {
    /// Creates a monitor in the `Checking` state. Call [`start`] to begin
    /// probing.
    ///
    /// [`start`]: NetworkMonitor::start
    pub fn new(remote: Arc<dyn RemoteApi>, config: MonitorConfig) -> Self {
        let (status, _) = watch::channel(NetworkStatus::Checking);
        Self {
            status,
            remote,
            config,
            probe_task: Mutex::new(None),
        }
    }

    /// The current status.
    pub fn current(&self) -> NetworkStatus {
        *self.status.borrow()
    }

    /// Subscribes to status changes. The receiver's current value is the
    /// latest status; `changed().await` resolves on each transition.
    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.status.subscribe()
    }

    /// Applies a host-reported connectivity event immediately.
    pub fn set_host_status(&self, online: bool) {
        self.set_status(if online {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        });
    }

    /// Runs one liveness probe and applies the result. Probe failures
    /// degrade status to offline; they never propagate.
    pub async fn probe_once(&self) -> NetworkStatus {
        let next = match self.remote.ping().await {
            Ok(()) => NetworkStatus::Online,
            Err(err) => {
                debug!(error = %err, "liveness probe failed");
                NetworkStatus::Offline
            }
        };
        self.set_status(next);
        next
    }

    /// Spawns the periodic probe loop. The first probe fires immediately,
    /// resolving the initial `Checking` state. Calling `start` again
    /// replaces the previous loop.
    pub fn start(self: &Arc<Self>) {
        let monitor = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(monitor.config.probe_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                monitor.probe_once().await;
            }
        });
        if let Some(old) = self.probe_task.lock().unwrap().replace(handle) {
            old.abort();
        }
    }

    /// Stops the probe loop, if running.
    pub fn stop(&self) {
        if let Some(handle) = self.probe_task.lock().unwrap().take() {
            handle.abort();
        }
    }

    /// Registers a callback invoked immediately with the current status
    /// and then on every transition. The returned subscription stops the
    /// callbacks when unsubscribed or dropped.
    pub fn on_status_change<F>(&self, cb: F) -> Subscription
    where
        F: Fn(NetworkStatus) + Send + 'static,
    {
        let mut rx = self.status.subscribe();
        let handle = tokio::spawn(async move {
            cb(*rx.borrow_and_update());
            while rx.changed().await.is_ok() {
                cb(*rx.borrow_and_update());
            }
        });
        Subscription {
            handle: Some(handle),
        }
    }

    fn set_status(&self, next: NetworkStatus) {
        self.status.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            info!(from = ?current, to = ?next, "network status changed");
            *current = next;
            true
        });
    }
}

impl Drop for NetworkMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Disposer for a status-change callback. Safe to unsubscribe more than
/// once; dropping unsubscribes too.
pub struct Subscription {
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stops delivering callbacks.
    pub fn unsubscribe(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Convenience: waits until the monitor reports the wanted status or the
/// timeout elapses. Mostly useful in application startup paths.
pub async fn wait_for_status(
    mut rx: watch::Receiver<NetworkStatus>,
    wanted: NetworkStatus,
    timeout: Duration,
) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if *rx.borrow_and_update() == wanted {
            return true;
        }
        match tokio::time::timeout_at(deadline, rx.changed()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) | Err(_) => return false,
        }
    }
}
