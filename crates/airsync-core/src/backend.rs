// ── Transport seam ──
//
// The engine never talks to the bus directly. Everything it needs from
// NetworkManager and wpa_supplicant goes through `WirelessBackend`, which
// the system-bus `Client` implements below.

use std::future::Future;

use airsync_api::{AccessPointEvent, AccessPointInfo, BssChanges, BssEvent, Client};
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};

use crate::model::{ApPath, BssPath};

type Result<T> = std::result::Result<T, airsync_api::Error>;

/// Property-change stream of one BSS object.
pub type ChangeStream = BoxStream<'static, BssChanges>;

/// Merged add/remove stream of both sources.
pub type LifecycleStream = BoxStream<'static, LifecycleEvent>;

/// Object lifecycle signal from either source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    AccessPointAdded(ApPath),
    AccessPointRemoved(ApPath),
    /// `bssid` carries the raw address when the signal's initial
    /// properties included it.
    BssAdded {
        path: BssPath,
        bssid: Option<Vec<u8>>,
    },
    BssRemoved(BssPath),
}

/// Access to the primary (NetworkManager) and secondary (wpa_supplicant)
/// object spaces of one wireless device.
///
/// Stream-returning methods subscribe eagerly: once the future resolves,
/// no later signal is missed.
pub trait WirelessBackend: Send + Sync + 'static {
    fn bss_paths(&self) -> impl Future<Output = Result<Vec<BssPath>>> + Send;

    fn bss_address(&self, path: &BssPath) -> impl Future<Output = Result<Vec<u8>>> + Send;

    fn bss_changes(&self, path: &BssPath) -> impl Future<Output = Result<ChangeStream>> + Send;

    fn access_point_paths(&self) -> impl Future<Output = Result<Vec<ApPath>>> + Send;

    fn access_point(&self, path: &ApPath) -> impl Future<Output = Result<AccessPointInfo>> + Send;

    fn lifecycle_events(&self) -> impl Future<Output = Result<LifecycleStream>> + Send;

    fn request_scan(&self) -> impl Future<Output = Result<()>> + Send;

    /// Returns the active-connection object path.
    fn activate_connection(&self, profile: &str) -> impl Future<Output = Result<String>> + Send;
}

impl WirelessBackend for Client {
    async fn bss_paths(&self) -> Result<Vec<BssPath>> {
        Ok(Client::bss_paths(self)
            .await?
            .into_iter()
            .map(BssPath::from)
            .collect())
    }

    async fn bss_address(&self, path: &BssPath) -> Result<Vec<u8>> {
        self.bssid(path.as_str()).await
    }

    async fn bss_changes(&self, path: &BssPath) -> Result<ChangeStream> {
        Ok(Client::bss_changes(self, path.as_str()).await?.boxed())
    }

    async fn access_point_paths(&self) -> Result<Vec<ApPath>> {
        Ok(Client::access_point_paths(self)
            .await?
            .into_iter()
            .map(ApPath::from)
            .collect())
    }

    async fn access_point(&self, path: &ApPath) -> Result<AccessPointInfo> {
        Client::access_point(self, path.as_str()).await
    }

    async fn lifecycle_events(&self) -> Result<LifecycleStream> {
        let access_points = self.access_point_events().await?.map(|event| match event {
            AccessPointEvent::Added(path) => LifecycleEvent::AccessPointAdded(path.into()),
            AccessPointEvent::Removed(path) => LifecycleEvent::AccessPointRemoved(path.into()),
        });
        let bss = self.bss_events().await?.map(|event| match event {
            BssEvent::Added { path, bssid } => LifecycleEvent::BssAdded {
                path: path.into(),
                bssid,
            },
            BssEvent::Removed(path) => LifecycleEvent::BssRemoved(path.into()),
        });
        Ok(stream::select(access_points, bss).boxed())
    }

    async fn request_scan(&self) -> Result<()> {
        Client::request_scan(self).await
    }

    async fn activate_connection(&self, profile: &str) -> Result<String> {
        Client::activate_connection(self, profile).await
    }
}
