// ── Bootstrap sequencer ──
//
// Populates the engine from both sources before live events are applied.
// BSS objects go first so that access points can be correlated as soon
// as they are inserted. Results go through the running mutation loop, so
// forwarders started here are drained from the moment they exist.

use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::backend::WirelessBackend;
use crate::engine::Mutation;
use crate::error::CoreError;
use crate::listener::{prepare_access_point, prepare_bss};

/// What the initial enumeration found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// BSS objects now subscribed.
    pub bss: usize,
    pub bss_skipped: usize,
    /// Access points inserted into the registry.
    pub access_points: usize,
    pub access_points_skipped: usize,
}

/// Enumerate both sources and queue the results on `tx`.
///
/// Returns once the loop has applied everything queued here. A failing
/// listing call aborts; a failing per-object fetch skips that object only.
pub(crate) async fn run<B: WirelessBackend>(
    backend: &B,
    tx: &mpsc::Sender<Mutation>,
) -> Result<BootstrapReport, CoreError> {
    let mut report = BootstrapReport::default();

    for path in backend.bss_paths().await? {
        match prepare_bss(backend, path.clone(), None).await {
            Ok(mutation) => {
                enqueue(tx, mutation).await?;
                report.bss += 1;
            }
            Err(e) => {
                warn!(path = %path, error = %e, "skipping BSS during bootstrap");
                report.bss_skipped += 1;
            }
        }
    }

    for path in backend.access_point_paths().await? {
        match prepare_access_point(backend, path.clone()).await {
            Ok(mutation) => {
                enqueue(tx, mutation).await?;
                report.access_points += 1;
            }
            Err(e) => {
                warn!(path = %path, error = %e, "skipping access point during bootstrap");
                report.access_points_skipped += 1;
            }
        }
    }

    let (done, applied) = oneshot::channel();
    enqueue(tx, Mutation::Flush { done }).await?;
    applied.await.map_err(|_| CoreError::Stopped)?;

    info!(
        bss = report.bss,
        bss_skipped = report.bss_skipped,
        access_points = report.access_points,
        access_points_skipped = report.access_points_skipped,
        "bootstrap complete"
    );
    Ok(report)
}

async fn enqueue(tx: &mpsc::Sender<Mutation>, mutation: Mutation) -> Result<(), CoreError> {
    tx.send(mutation).await.map_err(|_| CoreError::Stopped)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::Reconciler;
    use crate::model::{ApPath, BssPath, MacAddress};
    use crate::store::Registry;
    use crate::subscription::SubscriptionManager;
    use crate::test_support::{FakeBackend, ap_info};
    use crate::uptime::Uptime;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct Fixture {
        engine: Reconciler,
        registry: Arc<Registry>,
        tx: mpsc::Sender<Mutation>,
        rx: mpsc::Receiver<Mutation>,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(Registry::new());
        let (tx, rx) = mpsc::channel(2);
        let uptime = Uptime::new("/proc/uptime", Duration::from_millis(50));
        let subscriptions = SubscriptionManager::new(tx.clone(), uptime, CancellationToken::new());
        Fixture {
            engine: Reconciler::new(Arc::clone(&registry), subscriptions),
            registry,
            tx,
            rx,
        }
    }

    impl Fixture {
        /// Bootstrap `backend`, applying queued mutations as they arrive.
        async fn bootstrap(&mut self, backend: &FakeBackend) -> Result<BootstrapReport, CoreError> {
            let engine = &mut self.engine;
            let rx = &mut self.rx;
            let drive = async {
                while let Some(mutation) = rx.recv().await {
                    engine.apply(mutation);
                }
            };
            tokio::select! {
                report = run(backend, &self.tx) => report,
                () = drive => panic!("mutation channel closed during bootstrap"),
            }
        }
    }

    #[tokio::test]
    async fn correlates_bss_and_access_point() {
        let backend = FakeBackend::new()
            .with_bss("/bss/1", "AA:BB:CC:DD:EE:FF")
            .with_access_point("/ap/1", ap_info("AA:BB:CC:DD:EE:FF", "Home"));
        let mut f = fixture();

        let report = f.bootstrap(&backend).await.unwrap();
        assert_eq!(
            report,
            BootstrapReport {
                bss: 1,
                bss_skipped: 0,
                access_points: 1,
                access_points_skipped: 0,
            }
        );

        let snap = f.registry.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[&ApPath::new("/ap/1")].ssid, "Home");

        let mac = MacAddress::new("AA:BB:CC:DD:EE:FF");
        let index = f.engine.index();
        assert_eq!(index.identity_by_bss(&BssPath::new("/bss/1")), Some(&mac));
        assert_eq!(index.bss_by_identity(&mac), Some(&BssPath::new("/bss/1")));
        assert_eq!(index.identity_by_ap(&ApPath::new("/ap/1")), Some(&mac));
        assert_eq!(index.ap_by_identity(&mac), Some(&ApPath::new("/ap/1")));
        assert!(backend.is_subscribed("/bss/1"));
        f.engine.shutdown().await;
    }

    #[tokio::test]
    async fn one_bad_object_does_not_abort() {
        let backend = FakeBackend::new()
            .with_bss("/bss/short", "AA:BB")
            .with_broken_access_point("/ap/1", ap_info("AA:BB:CC:DD:EE:01", "Broken"))
            .with_access_point("/ap/2", ap_info("AA:BB:CC:DD:EE:02", "Fine"));
        let mut f = fixture();

        let report = f.bootstrap(&backend).await.unwrap();
        assert_eq!(report.bss_skipped, 1);
        assert_eq!(report.access_points, 1);
        assert_eq!(report.access_points_skipped, 1);
        assert!(f.registry.get(&ApPath::new("/ap/2")).is_some());
        assert!(f.registry.get(&ApPath::new("/ap/1")).is_none());
        f.engine.shutdown().await;
    }

    #[tokio::test]
    async fn stopped_loop_fails_bootstrap() {
        let backend = FakeBackend::new().with_access_point("/ap/1", ap_info("AA:BB:CC:DD:EE:01", "Home"));
        let (tx, rx) = mpsc::channel(2);
        drop(rx);

        let err = run(&backend, &tx).await.unwrap_err();
        assert!(matches!(err, CoreError::Stopped));
    }
}
