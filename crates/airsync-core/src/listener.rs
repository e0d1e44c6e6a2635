// ── Lifecycle listener ──
//
// Consumes add/remove signals from both sources in arrival order. Any
// bus round-trips an event needs happen here, one event at a time, so
// the mutation loop only ever sees finished mutations.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::backend::{LifecycleEvent, LifecycleStream, WirelessBackend};
use crate::convert;
use crate::engine::Mutation;
use crate::error::CoreError;
use crate::model::{ApPath, BssPath, MacAddress};

/// Resolve a BSS's identity and open its change stream.
///
/// `bssid` is used when the add signal already carried it; otherwise the
/// address is read from the object.
pub(crate) async fn prepare_bss<B: WirelessBackend>(
    backend: &B,
    path: BssPath,
    bssid: Option<Vec<u8>>,
) -> Result<Mutation, CoreError> {
    let raw = match bssid {
        Some(raw) => raw,
        None => backend.bss_address(&path).await?,
    };
    let identity = MacAddress::from_bytes(&raw).ok_or_else(|| CoreError::InvalidHardwareAddress {
        path: path.clone(),
        len: raw.len(),
    })?;
    let changes = backend.bss_changes(&path).await?;

    Ok(Mutation::BssAdded {
        path,
        identity,
        changes,
    })
}

/// Fetch an access point's properties and build its record.
pub(crate) async fn prepare_access_point<B: WirelessBackend>(
    backend: &B,
    path: ApPath,
) -> Result<Mutation, CoreError> {
    let info = backend.access_point(&path).await?;
    Ok(Mutation::AccessPointAdded {
        record: convert::access_point(path, info),
    })
}

async fn prepare<B: WirelessBackend>(backend: &B, event: LifecycleEvent) -> Option<Mutation> {
    match event {
        LifecycleEvent::AccessPointAdded(path) => {
            match prepare_access_point(backend, path.clone()).await {
                Ok(mutation) => Some(mutation),
                Err(e) if e.is_transient() => {
                    debug!(path = %path, error = %e, "access point vanished before it could be read");
                    None
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "skipping new access point");
                    None
                }
            }
        }
        LifecycleEvent::AccessPointRemoved(path) => Some(Mutation::AccessPointRemoved { path }),
        LifecycleEvent::BssAdded { path, bssid } => {
            match prepare_bss(backend, path.clone(), bssid).await {
                Ok(mutation) => Some(mutation),
                Err(e) if e.is_transient() => {
                    debug!(path = %path, error = %e, "BSS vanished before it could be read");
                    None
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "skipping new BSS");
                    None
                }
            }
        }
        LifecycleEvent::BssRemoved(path) => Some(Mutation::BssRemoved { path }),
    }
}

/// Move lifecycle signals off the bus as they arrive.
///
/// A bus connection stops dispatching method replies while any of its
/// signal queues is full, so the raw stream has to be drained even while
/// bootstrap is still reading objects. The returned stream holds
/// everything received so far, in order.
pub(crate) fn buffer(
    mut events: LifecycleStream,
    cancel: CancellationToken,
) -> (LifecycleStream, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                event = events.next() => match event {
                    Some(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
    });
    (UnboundedReceiverStream::new(rx).boxed(), handle)
}

/// Pump lifecycle events into the mutation loop until cancelled or the
/// stream ends.
pub(crate) async fn run<B: WirelessBackend>(
    backend: Arc<B>,
    mut events: LifecycleStream,
    tx: mpsc::Sender<Mutation>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = events.next() => {
                let Some(event) = event else {
                    warn!("lifecycle signal stream ended");
                    break;
                };
                event
            }
        };
        debug!(?event, "lifecycle event");

        let mutation = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            mutation = prepare(&*backend, event) => mutation,
        };
        let Some(mutation) = mutation else { continue };

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            sent = tx.send(mutation) => if sent.is_err() { break },
        }
    }
    debug!("lifecycle listener stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_stream::wrappers::ReceiverStream;

    fn removed(n: usize) -> LifecycleEvent {
        LifecycleEvent::BssRemoved(BssPath::new(format!("/bss/{n}")))
    }

    #[tokio::test]
    async fn buffer_drains_source_nobody_reads_yet() {
        let (tx, rx) = mpsc::channel(2);
        let cancel = CancellationToken::new();
        let (mut buffered, handle) = buffer(ReceiverStream::new(rx).boxed(), cancel.clone());

        // Many times the source capacity; completes only if it is drained.
        tokio::time::timeout(Duration::from_secs(5), async {
            for n in 0..100 {
                tx.send(removed(n)).await.unwrap();
            }
        })
        .await
        .unwrap();

        assert_eq!(buffered.next().await, Some(removed(0)));
        assert_eq!(buffered.next().await, Some(removed(1)));

        cancel.cancel();
        handle.await.unwrap();
    }
}
