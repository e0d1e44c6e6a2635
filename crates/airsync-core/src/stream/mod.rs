// ── Snapshot streams ──
//
// Consumer-side view of the registry: point-in-time access plus
// push-based change notification.

mod filter;

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::Snapshot;

pub use filter::AccessPointFilter;

/// A subscription to the access point registry.
///
/// New subscribers see the latest snapshot immediately; every later
/// registry publish is delivered as one new snapshot.
pub struct SnapshotStream {
    current: Snapshot,
    receiver: watch::Receiver<Snapshot>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot as of creation or the last `changed()`.
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// The registry's newest snapshot, which may be ahead of
    /// [`current()`](Self::current). Does not mark it as seen, so a
    /// following `changed()` still reports it.
    pub fn latest(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next publish. `None` once the registry is gone.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Yields the latest snapshot right away, then one per publish.
    ///
    /// Every item is a complete, immutable view of the registry, never a
    /// delta. A slow consumer sees only the newest of several publishes
    /// that happened between polls; nothing is lost, since that snapshot
    /// already includes every earlier change. The stream ends when the
    /// registry is dropped.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter over the registry's `watch` channel.
pub struct SnapshotWatchStream {
    inner: WatchStream<Snapshot>,
}

impl Stream for SnapshotWatchStream {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
