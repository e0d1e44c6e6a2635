// ── BSS subscription manager ──
//
// One forwarding task per BSS identity. Each task turns raw
// `PropertiesChanged` payloads into registry patches (uptime read and
// flag decoding happen here, off the mutation loop) and hands them to the
// loop. The loop owns this table; nothing else touches it.

use std::collections::HashMap;

use airsync_api::BssChanges;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::backend::ChangeStream;
use crate::engine::Mutation;
use crate::model::{AccessPointPatch, BssPath, MacAddress};
use crate::security;
use crate::uptime::Uptime;

struct Subscription {
    path: BssPath,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub(crate) struct SubscriptionManager {
    active: HashMap<MacAddress, Subscription>,
    /// Cancelled tasks not yet joined.
    retired: Vec<JoinHandle<()>>,
    tx: mpsc::Sender<Mutation>,
    uptime: Uptime,
    cancel: CancellationToken,
}

impl SubscriptionManager {
    /// Forwarders send into `tx` and stop when `cancel` (or their own
    /// child token) fires.
    pub(crate) fn new(tx: mpsc::Sender<Mutation>, uptime: Uptime, cancel: CancellationToken) -> Self {
        Self {
            active: HashMap::new(),
            retired: Vec::new(),
            tx,
            uptime,
            cancel,
        }
    }

    /// Start forwarding `changes` for `identity`, replacing any existing
    /// subscription for it.
    pub(crate) fn subscribe(&mut self, identity: MacAddress, path: BssPath, changes: ChangeStream) {
        let cancel = self.cancel.child_token();
        let handle = tokio::spawn(forward(
            identity.clone(),
            path.clone(),
            changes,
            self.tx.clone(),
            self.uptime.clone(),
            cancel.clone(),
        ));

        let subscription = Subscription {
            path,
            cancel,
            handle,
        };
        if let Some(previous) = self.active.insert(identity.clone(), subscription) {
            debug!(identity = %identity, old_path = %previous.path, "replacing BSS subscription");
            self.retire(previous);
        }
    }

    /// Cancel the subscription for `identity`. Returns `false` if there
    /// was none.
    pub(crate) fn unsubscribe(&mut self, identity: &MacAddress) -> bool {
        match self.active.remove(identity) {
            Some(subscription) => {
                self.retire(subscription);
                true
            }
            None => false,
        }
    }

    /// Cancel every subscription and wait for all forwarders to exit.
    pub(crate) async fn shutdown(&mut self) {
        let count = self.active.len();
        for (_, subscription) in self.active.drain() {
            subscription.cancel.cancel();
            self.retired.push(subscription.handle);
        }
        for handle in self.retired.drain(..) {
            let _ = handle.await;
        }
        debug!(count, "BSS subscriptions torn down");
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.active.len()
    }

    #[cfg(test)]
    pub(crate) fn path(&self, identity: &MacAddress) -> Option<&BssPath> {
        self.active.get(identity).map(|s| &s.path)
    }

    fn retire(&mut self, subscription: Subscription) {
        subscription.cancel.cancel();
        self.retired.retain(|h| !h.is_finished());
        self.retired.push(subscription.handle);
    }
}

async fn forward(
    identity: MacAddress,
    path: BssPath,
    mut changes: ChangeStream,
    tx: mpsc::Sender<Mutation>,
    uptime: Uptime,
    cancel: CancellationToken,
) {
    loop {
        let change = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            change = changes.next() => match change {
                Some(change) => change,
                None => {
                    debug!(path = %path, "BSS change stream ended");
                    break;
                }
            },
        };

        let patch = build_patch(&change, &uptime, &path).await;
        if patch.is_empty() {
            trace!(path = %path, "BSS change carries no tracked fields");
            continue;
        }

        let mutation = Mutation::BssChanged {
            identity: identity.clone(),
            path: path.clone(),
            patch,
        };
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            sent = tx.send(mutation) => if sent.is_err() { break },
        }
    }
}

/// Translate one BSS change set into a registry patch.
///
/// A failed uptime read drops only `last_seen`; the other fields still
/// go through.
async fn build_patch(change: &BssChanges, uptime: &Uptime, path: &BssPath) -> AccessPointPatch {
    let last_seen = match change.age {
        Some(age) => match uptime.seconds().await {
            Ok(now) => Some(now.saturating_add(u64::from(age))),
            Err(e) => {
                warn!(path = %path, error = %e, "dropping last-seen update");
                None
            }
        },
        None => None,
    };

    AccessPointPatch {
        frequency: change.frequency.map(u32::from),
        last_seen,
        wpa_flags: change.wpa.as_ref().map(security::decode),
        rsn_flags: change.rsn.as_ref().map(security::decode),
    }
}
