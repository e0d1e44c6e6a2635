// ── Access point registry ──
//
// Authoritative path → record map with push-based change notification
// via `watch` channels. Every successful mutation rebuilds one immutable
// snapshot and publishes it exactly once.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::{AccessPoint, ApPath};

/// Immutable view of every known access point, keyed by object path.
pub type Snapshot = Arc<BTreeMap<ApPath, Arc<AccessPoint>>>;

/// Reactive store of merged access point records.
///
/// Reads are lock-free for consumers; writes come from the device's
/// single mutation loop, so no two mutations interleave.
pub struct Registry {
    records: DashMap<ApPath, Arc<AccessPoint>>,

    /// Publish counter, bumped once per snapshot.
    version: watch::Sender<u64>,

    snapshot: watch::Sender<Snapshot>,
}

impl Registry {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(BTreeMap::new()));

        Self {
            records: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Add or fully replace the record at `path`.
    pub(crate) fn insert(&self, path: ApPath, record: AccessPoint) {
        self.records.insert(path, Arc::new(record));
        self.publish();
    }

    /// Delete the record at `path`. Returns the removed record, if any.
    ///
    /// Publishes even when nothing was present, so each remove event maps
    /// to exactly one emission.
    pub(crate) fn remove(&self, path: &ApPath) -> Option<Arc<AccessPoint>> {
        let removed = self.records.remove(path).map(|(_, v)| v);
        self.publish();
        removed
    }

    /// Apply field-level changes to the record at `path`.
    ///
    /// An unknown path means the identity index and the registry disagree;
    /// it is reported as [`CoreError::UnknownAccessPoint`] and nothing is
    /// published.
    pub(crate) fn patch<F>(&self, path: &ApPath, mutate: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut AccessPoint),
    {
        {
            let mut entry = self
                .records
                .get_mut(path)
                .ok_or_else(|| CoreError::UnknownAccessPoint { path: path.clone() })?;
            let mut record = AccessPoint::clone(&entry);
            mutate(&mut record);
            *entry = Arc::new(record);
        }
        self.publish();
        Ok(())
    }

    pub fn get(&self, path: &ApPath) -> Option<Arc<AccessPoint>> {
        self.records.get(path).map(|r| Arc::clone(r.value()))
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    /// Number of snapshots published so far.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn publish(&self) {
        let map: BTreeMap<ApPath, Arc<AccessPoint>> = self
            .records
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(map));
        self.version.send_modify(|v| *v += 1);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
