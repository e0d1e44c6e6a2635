// ── System-bus client ──
//
// One `Client` is bound to one NetworkManager wireless device and one
// wpa_supplicant interface. Every call builds a short-lived proxy on the
// shared connection; proxies are cheap and hold no state worth caching.

use std::collections::HashMap;

use futures_util::{Stream, StreamExt, stream};
use tracing::{debug, warn};
use zbus::proxy::CacheProperties;
use zbus::zvariant::{ObjectPath, OwnedObjectPath};
use zbus::Connection;

use crate::error::Error;
use crate::network_manager::{AccessPointProxy, NetworkManagerProxy, WirelessDeviceProxy};
use crate::supplicant::{BssChanges, BssProxy, InterfaceProxy};

// ── Addressing ──────────────────────────────────────────────────────

/// How to find the NetworkManager wireless device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    /// Device object path, e.g. `/org/freedesktop/NetworkManager/Devices/3`.
    Path(String),
    /// Kernel interface name, e.g. `wlan0`.
    Interface(String),
}

// ── Signal payloads ─────────────────────────────────────────────────

/// Lifecycle signal from the NetworkManager wireless device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPointEvent {
    Added(String),
    Removed(String),
}

/// Lifecycle signal from the supplicant interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BssEvent {
    /// `bssid` is taken from the signal's initial properties when present.
    Added { path: String, bssid: Option<Vec<u8>> },
    Removed(String),
}

/// Full property bag of one NetworkManager access point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPointInfo {
    pub hw_address: String,
    pub ssid: Vec<u8>,
    pub frequency: u32,
    pub strength: u8,
    pub flags: u32,
    pub wpa_flags: u32,
    pub rsn_flags: u32,
    pub mode: u32,
    pub max_bitrate: u32,
    pub last_seen: i32,
}

// ── Client ──────────────────────────────────────────────────────────

/// Bus client for one wireless device and its supplicant interface.
#[derive(Clone)]
pub struct Client {
    conn: Connection,
    device: OwnedObjectPath,
    supplicant_interface: OwnedObjectPath,
}

impl Client {
    /// Connect to the system bus and resolve the wireless device.
    pub async fn connect(device: &DeviceSelector, supplicant_interface: &str) -> Result<Self, Error> {
        let conn = Connection::system().await?;
        Self::with_connection(conn, device, supplicant_interface).await
    }

    /// Bind to an existing connection (e.g. a session bus in integration setups).
    pub async fn with_connection(
        conn: Connection,
        device: &DeviceSelector,
        supplicant_interface: &str,
    ) -> Result<Self, Error> {
        let device = match device {
            DeviceSelector::Path(path) => owned_path(path)?,
            DeviceSelector::Interface(iface) => {
                let nm = NetworkManagerProxy::new(&conn).await?;
                nm.get_device_by_ip_iface(iface).await.map_err(|e| {
                    debug!(error = %e, interface = %iface, "device lookup failed");
                    Error::DeviceNotFound {
                        interface: iface.clone(),
                    }
                })?
            }
        };
        let supplicant_interface = owned_path(supplicant_interface)?;
        debug!(device = %device.as_str(), supplicant = %supplicant_interface.as_str(), "bus client ready");

        Ok(Self {
            conn,
            device,
            supplicant_interface,
        })
    }

    /// Object path of the bound NetworkManager device.
    pub fn device_path(&self) -> &str {
        self.device.as_str()
    }

    // ── NetworkManager ───────────────────────────────────────────────

    async fn wireless(&self) -> Result<WirelessDeviceProxy<'static>, Error> {
        Ok(WirelessDeviceProxy::builder(&self.conn)
            .path(self.device.clone())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?)
    }

    pub async fn access_point_paths(&self) -> Result<Vec<String>, Error> {
        let paths = self.wireless().await?.get_all_access_points().await?;
        Ok(paths.iter().map(|p| p.as_str().to_owned()).collect())
    }

    /// Read every property the engine needs from one access point.
    pub async fn access_point(&self, path: &str) -> Result<AccessPointInfo, Error> {
        let proxy = AccessPointProxy::builder(&self.conn)
            .path(object_path(path)?)?
            .build()
            .await?;

        let (hw_address, ssid, frequency, strength, flags) = futures_util::try_join!(
            proxy.hw_address(),
            proxy.ssid(),
            proxy.frequency(),
            proxy.strength(),
            proxy.flags(),
        )?;
        let (wpa_flags, rsn_flags, mode, max_bitrate, last_seen) = futures_util::try_join!(
            proxy.wpa_flags(),
            proxy.rsn_flags(),
            proxy.mode(),
            proxy.max_bitrate(),
            proxy.last_seen(),
        )?;

        Ok(AccessPointInfo {
            hw_address,
            ssid,
            frequency,
            strength,
            flags,
            wpa_flags,
            rsn_flags,
            mode,
            max_bitrate,
            last_seen,
        })
    }

    /// Subscribe to access point add/remove signals.
    ///
    /// The match rules are registered before this returns, so no signal
    /// emitted afterwards is missed.
    pub async fn access_point_events(
        &self,
    ) -> Result<impl Stream<Item = AccessPointEvent> + Send + 'static, Error> {
        let proxy = self.wireless().await?;
        let added = proxy
            .receive_access_point_added()
            .await?
            .filter_map(|signal| async move {
                match signal.args() {
                    Ok(args) => Some(AccessPointEvent::Added(args.access_point().as_str().to_owned())),
                    Err(e) => {
                        warn!(error = %e, "malformed AccessPointAdded signal");
                        None
                    }
                }
            });
        let removed = proxy
            .receive_access_point_removed()
            .await?
            .filter_map(|signal| async move {
                match signal.args() {
                    Ok(args) => {
                        Some(AccessPointEvent::Removed(args.access_point().as_str().to_owned()))
                    }
                    Err(e) => {
                        warn!(error = %e, "malformed AccessPointRemoved signal");
                        None
                    }
                }
            });
        Ok(stream::select(added, removed))
    }

    /// Fire-and-forget scan request.
    pub async fn request_scan(&self) -> Result<(), Error> {
        self.wireless().await?.request_scan(HashMap::new()).await?;
        Ok(())
    }

    /// Activate `connection` on this device, returning the active-connection path.
    pub async fn activate_connection(&self, connection: &str) -> Result<String, Error> {
        let nm = NetworkManagerProxy::new(&self.conn).await?;
        let active = nm
            .activate_connection(
                &object_path(connection)?,
                &self.device,
                &ObjectPath::from_static_str_unchecked("/"),
            )
            .await?;
        Ok(active.as_str().to_owned())
    }

    // ── wpa_supplicant ───────────────────────────────────────────────

    async fn interface(&self) -> Result<InterfaceProxy<'static>, Error> {
        Ok(InterfaceProxy::builder(&self.conn)
            .path(self.supplicant_interface.clone())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?)
    }

    async fn bss(&self, path: &str) -> Result<BssProxy<'static>, Error> {
        Ok(BssProxy::builder(&self.conn)
            .path(owned_path(path)?)?
            .cache_properties(CacheProperties::No)
            .build()
            .await?)
    }

    pub async fn bss_paths(&self) -> Result<Vec<String>, Error> {
        let paths = self.interface().await?.bsss().await?;
        Ok(paths.iter().map(|p| p.as_str().to_owned()).collect())
    }

    /// Raw BSSID bytes of one BSS.
    pub async fn bssid(&self, path: &str) -> Result<Vec<u8>, Error> {
        Ok(self.bss(path).await?.bssid().await?)
    }

    /// Subscribe to BSS add/remove signals on the supplicant interface.
    pub async fn bss_events(&self) -> Result<impl Stream<Item = BssEvent> + Send + 'static, Error> {
        let proxy = self.interface().await?;
        let added = proxy.receive_bss_added().await?.filter_map(|signal| async move {
            match signal.args() {
                Ok(args) => Some(BssEvent::Added {
                    path: args.path().as_str().to_owned(),
                    bssid: args.properties().bssid.clone(),
                }),
                Err(e) => {
                    warn!(error = %e, "malformed BSSAdded signal");
                    None
                }
            }
        });
        let removed = proxy.receive_bss_removed().await?.filter_map(|signal| async move {
            match signal.args() {
                Ok(args) => Some(BssEvent::Removed(args.path().as_str().to_owned())),
                Err(e) => {
                    warn!(error = %e, "malformed BSSRemoved signal");
                    None
                }
            }
        });
        Ok(stream::select(added, removed))
    }

    /// Subscribe to property changes of one BSS.
    ///
    /// The stream ends when the connection closes; dropping it removes
    /// the match rule.
    pub async fn bss_changes(
        &self,
        path: &str,
    ) -> Result<impl Stream<Item = BssChanges> + Send + 'static, Error> {
        let path_owned = path.to_owned();
        let changes = self
            .bss(path)
            .await?
            .receive_properties_changed()
            .await?
            .filter_map(move |signal| {
                let path = path_owned.clone();
                async move {
                    match signal.args() {
                        Ok(args) => Some(args.properties().clone()),
                        Err(e) => {
                            warn!(error = %e, path = %path, "malformed BSS PropertiesChanged signal");
                            None
                        }
                    }
                }
            });
        Ok(changes)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn object_path(path: &str) -> Result<ObjectPath<'_>, Error> {
    ObjectPath::try_from(path).map_err(|e| Error::InvalidPath {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

fn owned_path(path: &str) -> Result<OwnedObjectPath, Error> {
    object_path(path).map(OwnedObjectPath::from)
}
