// ── Device facade ──
//
// Lifecycle management for one reconciled wireless device: wires the
// lifecycle listener, the bootstrap sequencer and the mutation loop
// together, and exposes the registry to consumers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use airsync_api::Client;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::backend::WirelessBackend;
use crate::bootstrap::{self, BootstrapReport};
use crate::config::DeviceConfig;
use crate::engine::Reconciler;
use crate::error::CoreError;
use crate::listener;
use crate::store::{Registry, Snapshot};
use crate::stream::SnapshotStream;
use crate::subscription::SubscriptionManager;
use crate::uptime::Uptime;

/// Live access point view of one wireless device.
///
/// Cheaply cloneable. Nothing runs until [`start()`](Self::start);
/// scan and activation requests work either way. Dropping the last clone
/// cancels every background task, as [`shutdown()`](Self::shutdown) does,
/// without waiting for them.
pub struct WifiDevice<B: WirelessBackend> {
    inner: Arc<DeviceInner<B>>,
}

impl<B: WirelessBackend> Clone for WifiDevice<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct DeviceInner<B> {
    backend: Arc<B>,
    config: DeviceConfig,
    registry: Arc<Registry>,
    cancel: CancellationToken,
    started: AtomicBool,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WifiDevice<Client> {
    /// Connect to the system bus and bind to the configured device.
    pub async fn connect(config: DeviceConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let client = Client::connect(&config.device, &config.supplicant_interface).await?;
        Ok(Self::new(client, config))
    }
}

impl<B: WirelessBackend> WifiDevice<B> {
    pub fn new(backend: B, config: DeviceConfig) -> Self {
        Self {
            inner: Arc::new(DeviceInner {
                backend: Arc::new(backend),
                config,
                registry: Arc::new(Registry::new()),
                cancel: CancellationToken::new(),
                started: AtomicBool::new(false),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Subscribe to lifecycle signals, bootstrap from both sources, then
    /// start applying live events.
    ///
    /// When this returns, the registry holds the bootstrap state.
    pub async fn start(&self) -> Result<BootstrapReport, CoreError> {
        self.inner.config.validate()?;
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(CoreError::AlreadyStarted);
        }

        match self.spawn_tasks().await {
            Ok(report) => Ok(report),
            Err(e) => {
                self.inner.started.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    async fn spawn_tasks(&self) -> Result<BootstrapReport, CoreError> {
        let inner = &self.inner;
        let config = &inner.config;
        let cancel = inner.cancel.child_token();

        // Subscribe before enumerating so nothing between the two is lost.
        let events = inner.backend.lifecycle_events().await?;
        let (events, pump) = listener::buffer(events, cancel.clone());

        let (tx, rx) = mpsc::channel(config.mutation_buffer);
        let uptime = Uptime::new(config.uptime_path.clone(), config.uptime_timeout);
        let subscriptions = SubscriptionManager::new(tx.clone(), uptime, cancel.clone());
        let reconciler = Reconciler::new(Arc::clone(&inner.registry), subscriptions);
        let engine = tokio::spawn(reconciler.run(rx, cancel.clone()));

        let report = match bootstrap::run(&*inner.backend, &tx).await {
            Ok(report) => report,
            Err(e) => {
                cancel.cancel();
                join_all(vec![engine, pump]).await;
                return Err(e);
            }
        };

        let listener = tokio::spawn(listener::run(Arc::clone(&inner.backend), events, tx, cancel));
        inner.task_handles.lock().await.extend([pump, engine, listener]);

        info!(
            access_points = inner.registry.len(),
            bss = report.bss,
            "device started"
        );
        Ok(report)
    }

    /// Stop every background task and BSS subscription.
    ///
    /// The device cannot be restarted afterwards; the last snapshot stays
    /// readable.
    pub async fn shutdown(&self) -> Result<(), CoreError> {
        if !self.is_started() {
            return Err(CoreError::NotStarted);
        }
        self.inner.cancel.cancel();

        let handles = std::mem::take(&mut *self.inner.task_handles.lock().await);
        join_all(handles).await;
        info!("device stopped");
        Ok(())
    }

    // ── Snapshots ────────────────────────────────────────────────────

    /// Last published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.registry.snapshot()
    }

    /// Live snapshot stream, starting from the last published snapshot.
    pub fn access_points(&self) -> SnapshotStream {
        SnapshotStream::new(self.inner.registry.subscribe())
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Ask NetworkManager to rescan. Resolves once the request is
    /// acknowledged, not when results arrive.
    pub async fn request_scan(&self) -> Result<(), CoreError> {
        self.inner
            .backend
            .request_scan()
            .await
            .map_err(|source| CoreError::ScanRequest { source })
    }

    /// Activate a saved connection profile on this device, returning the
    /// active-connection object path.
    pub async fn activate_connection(&self, profile: &str) -> Result<String, CoreError> {
        Ok(self.inner.backend.activate_connection(profile).await?)
    }
}

impl<B> Drop for DeviceInner<B> {
    fn drop(&mut self) {
        // Child tokens reach the listener, the loop and every forwarder.
        self.cancel.cancel();
    }
}

async fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(e) = handle.await {
            debug!(error = %e, "background task ended abnormally");
        }
    }
}
