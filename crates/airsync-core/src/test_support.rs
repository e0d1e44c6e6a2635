// In-memory `WirelessBackend` for engine and device tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use airsync_api::{AccessPointInfo, BssChanges};
use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::backend::{ChangeStream, LifecycleEvent, LifecycleStream, WirelessBackend};
use crate::model::{ApPath, BssPath};

type Result<T> = std::result::Result<T, airsync_api::Error>;

fn failure(path: &str) -> airsync_api::Error {
    airsync_api::Error::InvalidPath {
        path: path.to_owned(),
        reason: "injected failure".into(),
    }
}

pub(crate) fn mac_bytes(text: &str) -> Vec<u8> {
    text.split(':')
        .map(|octet| u8::from_str_radix(octet, 16).unwrap_or_default())
        .collect()
}

pub(crate) fn ap_info(mac: &str, ssid: &str) -> AccessPointInfo {
    AccessPointInfo {
        hw_address: mac.to_owned(),
        ssid: ssid.as_bytes().to_vec(),
        frequency: 2412,
        strength: 60,
        mode: 2,
        last_seen: -1,
        ..AccessPointInfo::default()
    }
}

/// Signals delivered in the middle of the first access point read, the
/// way a busy bus interleaves them with a bootstrap in progress.
#[derive(Default)]
pub(crate) struct Burst {
    pub(crate) events: Vec<LifecycleEvent>,
    pub(crate) changes: Vec<(BssPath, BssChanges)>,
}

/// Capacity of every fake signal queue unless overridden.
const QUEUE: usize = 1024;

pub(crate) struct FakeBackend {
    bss: Mutex<BTreeMap<BssPath, Vec<u8>>>,
    access_points: Mutex<BTreeMap<ApPath, AccessPointInfo>>,
    broken_access_points: Mutex<HashSet<ApPath>>,
    changes: Mutex<HashMap<BssPath, mpsc::Sender<BssChanges>>>,
    change_capacity: usize,
    lifecycle_tx: mpsc::Sender<LifecycleEvent>,
    lifecycle_rx: Mutex<Option<mpsc::Receiver<LifecycleEvent>>>,
    burst: Mutex<Option<Burst>>,
    fail_scan: AtomicBool,
    scans: AtomicUsize,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::with_queues(QUEUE, QUEUE)
    }

    /// Signal queues that hold at most `lifecycle` add/remove signals and
    /// `changes` property changes per BSS. Senders wait when full.
    pub(crate) fn with_queues(lifecycle: usize, changes: usize) -> Self {
        let (lifecycle_tx, lifecycle_rx) = mpsc::channel(lifecycle);
        Self {
            bss: Mutex::default(),
            access_points: Mutex::default(),
            broken_access_points: Mutex::default(),
            changes: Mutex::default(),
            change_capacity: changes,
            lifecycle_tx,
            lifecycle_rx: Mutex::new(Some(lifecycle_rx)),
            burst: Mutex::default(),
            fail_scan: AtomicBool::new(false),
            scans: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_bss(self, path: &str, mac: &str) -> Self {
        self.bss.lock().unwrap().insert(BssPath::new(path), mac_bytes(mac));
        self
    }

    pub(crate) fn with_access_point(self, path: &str, info: AccessPointInfo) -> Self {
        self.access_points.lock().unwrap().insert(ApPath::new(path), info);
        self
    }

    /// Property reads for `path` fail.
    pub(crate) fn with_broken_access_point(self, path: &str, info: AccessPointInfo) -> Self {
        self.broken_access_points.lock().unwrap().insert(ApPath::new(path));
        self.with_access_point(path, info)
    }

    /// Deliver `burst` during the first access point read. The read only
    /// returns once every signal in it has been queued.
    pub(crate) fn with_burst(self, burst: Burst) -> Self {
        *self.burst.lock().unwrap() = Some(burst);
        self
    }

    pub(crate) fn with_failing_scan(self) -> Self {
        self.fail_scan.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Register an object that a later add signal will announce.
    pub(crate) fn add_access_point(&self, path: &str, info: AccessPointInfo) {
        self.access_points.lock().unwrap().insert(ApPath::new(path), info);
    }

    pub(crate) fn add_bss(&self, path: &str, mac: &str) {
        self.bss.lock().unwrap().insert(BssPath::new(path), mac_bytes(mac));
    }

    pub(crate) fn emit(&self, event: LifecycleEvent) {
        self.lifecycle_tx.try_send(event).unwrap();
    }

    /// Deliver a property change to whoever holds the stream for `path`.
    /// Returns `false` if no live subscriber exists.
    pub(crate) fn change(&self, path: &str, change: BssChanges) -> bool {
        self.changes
            .lock()
            .unwrap()
            .get(&BssPath::new(path))
            .is_some_and(|tx| tx.try_send(change).is_ok())
    }

    /// Whether a subscriber still listens on `path`.
    pub(crate) fn is_subscribed(&self, path: &str) -> bool {
        self.changes
            .lock()
            .unwrap()
            .get(&BssPath::new(path))
            .is_some_and(|tx| !tx.is_closed())
    }

    async fn deliver(&self, burst: Burst) {
        for event in burst.events {
            self.lifecycle_tx.send(event).await.unwrap();
        }
        for (path, change) in burst.changes {
            let tx = self.changes.lock().unwrap().get(&path).cloned();
            if let Some(tx) = tx {
                // A closed stream just means the subscriber went away.
                let _ = tx.send(change).await;
            }
        }
    }
}

impl WirelessBackend for FakeBackend {
    async fn bss_paths(&self) -> Result<Vec<BssPath>> {
        Ok(self.bss.lock().unwrap().keys().cloned().collect())
    }

    async fn bss_address(&self, path: &BssPath) -> Result<Vec<u8>> {
        self.bss
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| failure(path.as_str()))
    }

    async fn bss_changes(&self, path: &BssPath) -> Result<ChangeStream> {
        let (tx, rx) = mpsc::channel(self.change_capacity);
        self.changes.lock().unwrap().insert(path.clone(), tx);
        Ok(ReceiverStream::new(rx).boxed())
    }

    async fn access_point_paths(&self) -> Result<Vec<ApPath>> {
        Ok(self.access_points.lock().unwrap().keys().cloned().collect())
    }

    async fn access_point(&self, path: &ApPath) -> Result<AccessPointInfo> {
        let burst = self.burst.lock().unwrap().take();
        if let Some(burst) = burst {
            self.deliver(burst).await;
        }
        if self.broken_access_points.lock().unwrap().contains(path) {
            return Err(failure(path.as_str()));
        }
        self.access_points
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| failure(path.as_str()))
    }

    async fn lifecycle_events(&self) -> Result<LifecycleStream> {
        match self.lifecycle_rx.lock().unwrap().take() {
            Some(rx) => Ok(ReceiverStream::new(rx).boxed()),
            None => Ok(stream::pending().boxed()),
        }
    }

    async fn request_scan(&self) -> Result<()> {
        if self.fail_scan.load(Ordering::SeqCst) {
            return Err(failure("/scan"));
        }
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn activate_connection(&self, profile: &str) -> Result<String> {
        if profile.starts_with("/org/freedesktop/NetworkManager/Settings/") {
            Ok("/org/freedesktop/NetworkManager/ActiveConnection/1".into())
        } else {
            Err(failure(profile))
        }
    }
}

/// An uptime source whose reads never complete: a FIFO with no writer.
///
/// Dropping it opens the FIFO read-write, which releases a reader stuck
/// in `open` so the blocking pool can wind down.
pub(crate) struct StalledFile {
    _dir: tempfile::TempDir,
    path: PathBuf,
}

impl StalledFile {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uptime");
        let status = std::process::Command::new("mkfifo").arg(&path).status().unwrap();
        assert!(status.success(), "mkfifo failed");
        Self { _dir: dir, path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StalledFile {
    fn drop(&mut self) {
        let _ = std::fs::OpenOptions::new().read(true).write(true).open(&self.path);
    }
}
