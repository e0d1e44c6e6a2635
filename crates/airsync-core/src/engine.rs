// ── Mutation loop ──
//
// Single consumer for everything that changes the identity index, the
// subscription table or the registry. Producers (the lifecycle listener
// and the BSS forwarders) do their I/O first and enqueue a finished
// `Mutation`; applying one never awaits, so mutations never interleave.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::ChangeStream;
use crate::index::IdentityIndex;
use crate::model::{AccessPoint, AccessPointPatch, ApPath, BssPath, MacAddress};
use crate::store::Registry;
use crate::subscription::SubscriptionManager;

/// One serialized state change.
pub(crate) enum Mutation {
    /// A BSS object was observed, with its change stream already open.
    BssAdded {
        path: BssPath,
        identity: MacAddress,
        changes: ChangeStream,
    },
    BssRemoved { path: BssPath },
    /// Forwarded by the subscription for `identity` bound to `path`.
    BssChanged {
        identity: MacAddress,
        path: BssPath,
        patch: AccessPointPatch,
    },
    AccessPointAdded { record: AccessPoint },
    AccessPointRemoved { path: ApPath },
    /// Acknowledged once every mutation queued before it has been applied.
    Flush { done: oneshot::Sender<()> },
}

/// Owns the per-device correlation state.
pub(crate) struct Reconciler {
    index: IdentityIndex,
    registry: Arc<Registry>,
    subscriptions: SubscriptionManager,
}

impl Reconciler {
    pub(crate) fn new(registry: Arc<Registry>, subscriptions: SubscriptionManager) -> Self {
        Self {
            index: IdentityIndex::new(),
            registry,
            subscriptions,
        }
    }

    pub(crate) fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::BssAdded {
                path,
                identity,
                changes,
            } => self.bss_added(path, identity, changes),
            Mutation::BssRemoved { path } => self.bss_removed(&path),
            Mutation::BssChanged {
                identity,
                path,
                patch,
            } => self.bss_changed(&identity, &path, patch),
            Mutation::AccessPointAdded { record } => self.access_point_added(record),
            Mutation::AccessPointRemoved { path } => self.access_point_removed(&path),
            Mutation::Flush { done } => {
                // The waiter may have given up.
                let _ = done.send(());
            }
        }
    }

    /// Drain `rx` until cancelled, then tear down every subscription.
    pub(crate) async fn run(mut self, mut rx: mpsc::Receiver<Mutation>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                mutation = rx.recv() => {
                    let Some(mutation) = mutation else { break };
                    self.apply(mutation);
                }
            }
        }
        self.shutdown().await;
        info!(
            access_points = self.registry.len(),
            correlated = self.index.ap_len(),
            bss = self.index.bss_len(),
            "mutation loop stopped"
        );
    }

    pub(crate) async fn shutdown(&mut self) {
        self.subscriptions.shutdown().await;
    }

    // ── Secondary source ────────────────────────────────────────────

    fn bss_added(&mut self, path: BssPath, identity: MacAddress, changes: ChangeStream) {
        // The path may have been re-used for a different radio.
        if let Some(previous) = self.index.identity_by_bss(&path).cloned() {
            if previous != identity {
                debug!(path = %path, old = %previous, new = %identity, "BSS path re-bound");
                self.subscriptions.unsubscribe(&previous);
            }
        }
        self.index.record_bss(path.clone(), identity.clone());
        self.subscriptions.subscribe(identity, path, changes);
    }

    fn bss_removed(&mut self, path: &BssPath) {
        match self.index.remove_bss(path) {
            Some(identity) => {
                self.subscriptions.unsubscribe(&identity);
                debug!(path = %path, identity = %identity, "BSS removed");
            }
            None => debug!(path = %path, "removal of unknown BSS ignored"),
        }
    }

    fn bss_changed(&self, identity: &MacAddress, path: &BssPath, patch: AccessPointPatch) {
        if self.index.bss_by_identity(identity) != Some(path) {
            debug!(path = %path, identity = %identity, "dropping change from stale BSS subscription");
            return;
        }
        let Some(ap_path) = self.index.ap_by_identity(identity) else {
            debug!(identity = %identity, "BSS not yet correlated with an access point");
            return;
        };

        if let Err(e) = self.registry.patch(ap_path, |record| patch.apply(record)) {
            warn!(identity = %identity, error = %e, "identity index and registry out of sync");
        }
    }

    // ── Primary source ──────────────────────────────────────────────

    fn access_point_added(&mut self, record: AccessPoint) {
        let path = record.path.clone();
        if record.hw_address.as_str().is_empty() {
            debug!(path = %path, "access point has no hardware address, not correlating");
            self.index.remove_ap(&path);
        } else {
            self.index.record_ap(path.clone(), record.hw_address.clone());
        }
        self.registry.insert(path, record);
    }

    fn access_point_removed(&mut self, path: &ApPath) {
        let identity = self.index.remove_ap(path);
        if self.registry.remove(path).is_none() {
            debug!(path = %path, "removal of unknown access point");
        } else if let Some(identity) = identity {
            debug!(path = %path, identity = %identity, "access point removed");
        }
    }
}

#[cfg(test)]
impl Reconciler {
    pub(crate) fn index(&self) -> &IdentityIndex {
        &self.index
    }

    pub(crate) fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::sample;
    use crate::security::SecurityFlags;
    use crate::uptime::Uptime;
    use futures_util::StreamExt;
    use futures_util::stream;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn reconciler() -> (Reconciler, Arc<Registry>) {
        let registry = Arc::new(Registry::new());
        let (tx, _rx) = mpsc::channel(8);
        let uptime = Uptime::new("/nonexistent/uptime", Duration::from_millis(50));
        let subscriptions = SubscriptionManager::new(tx, uptime, CancellationToken::new());
        (Reconciler::new(Arc::clone(&registry), subscriptions), registry)
    }

    fn mac(s: &str) -> MacAddress {
        MacAddress::new(s)
    }

    fn bss_added(path: &str, identity: &str) -> Mutation {
        Mutation::BssAdded {
            path: BssPath::new(path),
            identity: mac(identity),
            changes: stream::pending::<airsync_api::BssChanges>().boxed(),
        }
    }

    fn ap_added(path: &str, identity: &str, ssid: &str) -> Mutation {
        Mutation::AccessPointAdded {
            record: sample(path, identity, ssid),
        }
    }

    fn changed(path: &str, identity: &str, patch: AccessPointPatch) -> Mutation {
        Mutation::BssChanged {
            identity: mac(identity),
            path: BssPath::new(path),
            patch,
        }
    }

    const MAC: &str = "AA:BB:CC:DD:EE:FF";

    #[tokio::test]
    async fn change_patches_correlated_record() {
        let (mut engine, registry) = reconciler();
        engine.apply(bss_added("/bss/1", MAC));
        engine.apply(ap_added("/ap/1", MAC, "Home"));

        let patch = AccessPointPatch {
            last_seen: Some(105),
            frequency: Some(5180),
            rsn_flags: Some(SecurityFlags::KEY_MGMT_PSK),
            ..AccessPointPatch::default()
        };
        let before = registry.version();
        engine.apply(changed("/bss/1", MAC, patch));

        let record = registry.get(&ApPath::new("/ap/1")).unwrap();
        assert_eq!(record.last_seen, Some(105));
        assert_eq!(record.frequency, 5180);
        assert_eq!(record.rsn_flags, SecurityFlags::KEY_MGMT_PSK);
        assert_eq!(record.ssid, "Home");
        assert_eq!(registry.version(), before + 1);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn uncorrelated_change_is_dropped() {
        let (mut engine, registry) = reconciler();
        engine.apply(bss_added("/bss/1", MAC));

        let before = registry.version();
        engine.apply(changed(
            "/bss/1",
            MAC,
            AccessPointPatch {
                last_seen: Some(1),
                ..AccessPointPatch::default()
            },
        ));
        assert_eq!(registry.version(), before);
        assert!(registry.is_empty());
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn stale_subscription_change_is_dropped() {
        let (mut engine, registry) = reconciler();
        engine.apply(bss_added("/bss/1", MAC));
        engine.apply(ap_added("/ap/1", MAC, "Home"));
        engine.apply(bss_added("/bss/2", MAC));

        let before = registry.version();
        engine.apply(changed(
            "/bss/1",
            MAC,
            AccessPointPatch {
                frequency: Some(2437),
                ..AccessPointPatch::default()
            },
        ));
        assert_eq!(registry.version(), before);
        assert_eq!(registry.get(&ApPath::new("/ap/1")).unwrap().frequency, 2412);
        assert_eq!(engine.subscriptions().len(), 1);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn bss_removal_tears_down_subscription_and_index() {
        let (mut engine, _registry) = reconciler();
        engine.apply(bss_added("/bss/1", MAC));
        assert_eq!(engine.subscriptions().len(), 1);

        engine.apply(Mutation::BssRemoved {
            path: BssPath::new("/bss/1"),
        });
        assert_eq!(engine.subscriptions().len(), 0);
        assert!(engine.index().identity_by_bss(&BssPath::new("/bss/1")).is_none());
        assert!(engine.index().bss_by_identity(&mac(MAC)).is_none());

        // Second removal is a no-op.
        engine.apply(Mutation::BssRemoved {
            path: BssPath::new("/bss/1"),
        });
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn rebinding_a_bss_path_drops_the_old_identity() {
        let (mut engine, _registry) = reconciler();
        engine.apply(bss_added("/bss/1", MAC));
        engine.apply(bss_added("/bss/1", "11:22:33:44:55:66"));

        assert_eq!(engine.subscriptions().len(), 1);
        assert!(engine.subscriptions().path(&mac(MAC)).is_none());
        assert!(engine.index().bss_by_identity(&mac(MAC)).is_none());
        assert!(engine.index().is_consistent());
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn access_point_removal_is_exact() {
        let (mut engine, registry) = reconciler();
        engine.apply(ap_added("/ap/1", MAC, "Home"));
        engine.apply(ap_added("/ap/2", "11:22:33:44:55:66", "Cafe"));

        engine.apply(Mutation::AccessPointRemoved {
            path: ApPath::new("/ap/1"),
        });

        let snap = registry.snapshot();
        assert_eq!(snap.len(), 1);
        assert!(snap.contains_key(&ApPath::new("/ap/2")));
        assert!(engine.index().identity_by_ap(&ApPath::new("/ap/1")).is_none());
        assert!(engine.index().ap_by_identity(&mac(MAC)).is_none());
        assert_eq!(
            engine.index().ap_by_identity(&mac("11:22:33:44:55:66")),
            Some(&ApPath::new("/ap/2"))
        );
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn every_mutation_publishes_once() {
        let (mut engine, registry) = reconciler();
        let rx = registry.subscribe();

        engine.apply(ap_added("/ap/1", MAC, "Home"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(registry.version(), 1);

        engine.apply(Mutation::AccessPointRemoved {
            path: ApPath::new("/ap/1"),
        });
        assert_eq!(registry.version(), 2);

        // BSS lifecycle never touches the registry.
        engine.apply(bss_added("/bss/1", MAC));
        assert_eq!(registry.version(), 2);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn flush_is_acknowledged_after_earlier_mutations() {
        let (engine, registry) = reconciler();
        let (tx, rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(engine.run(rx, cancel.clone()));

        tx.send(ap_added("/ap/1", MAC, "Home")).await.unwrap();
        let (done, applied) = oneshot::channel();
        tx.send(Mutation::Flush { done }).await.unwrap();
        applied.await.unwrap();
        assert!(registry.get(&ApPath::new("/ap/1")).is_some());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn run_exits_on_cancel() {
        let (engine, _registry) = reconciler();
        let (_tx, rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(engine.run(rx, cancel.clone()));
        cancel.cancel();
        handle.await.unwrap();
    }
}
