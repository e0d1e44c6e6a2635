//! NetworkManager proxies: the primary source of access-point objects.

use std::collections::HashMap;

use zbus::proxy;
use zbus::zvariant::{ObjectPath, OwnedObjectPath, Value};

/// Root NetworkManager object.
#[proxy(
    interface = "org.freedesktop.NetworkManager",
    default_service = "org.freedesktop.NetworkManager",
    default_path = "/org/freedesktop/NetworkManager"
)]
pub trait NetworkManager {
    /// Activate a connection profile on a device.
    ///
    /// `specific_object` is `/` to let NetworkManager pick the access point.
    fn activate_connection(
        &self,
        connection: &ObjectPath<'_>,
        device: &ObjectPath<'_>,
        specific_object: &ObjectPath<'_>,
    ) -> zbus::Result<OwnedObjectPath>;

    /// Resolve a kernel interface name (e.g. `wlan0`) to its device object.
    fn get_device_by_ip_iface(&self, iface: &str) -> zbus::Result<OwnedObjectPath>;
}

/// Wireless specialization of a NetworkManager device.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Device.Wireless",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait WirelessDevice {
    /// All access points currently visible, including hidden ones.
    fn get_all_access_points(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    /// Ask the device to scan. Resolves once the request is acknowledged,
    /// not when results arrive.
    fn request_scan(&self, options: HashMap<&str, &Value<'_>>) -> zbus::Result<()>;

    #[zbus(signal)]
    fn access_point_added(&self, access_point: ObjectPath<'_>) -> zbus::Result<()>;

    #[zbus(signal)]
    fn access_point_removed(&self, access_point: ObjectPath<'_>) -> zbus::Result<()>;
}

/// A visible Wi-Fi network as NetworkManager sees it.
#[proxy(
    interface = "org.freedesktop.NetworkManager.AccessPoint",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait AccessPoint {
    /// NM80211ApFlags (bit 0 = privacy).
    #[zbus(property)]
    fn flags(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn wpa_flags(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn rsn_flags(&self) -> zbus::Result<u32>;

    /// SSID as raw bytes; not guaranteed to be UTF-8.
    #[zbus(property)]
    fn ssid(&self) -> zbus::Result<Vec<u8>>;

    /// MHz.
    #[zbus(property)]
    fn frequency(&self) -> zbus::Result<u32>;

    /// BSSID in `AA:BB:CC:DD:EE:FF` form.
    #[zbus(property)]
    fn hw_address(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn mode(&self) -> zbus::Result<u32>;

    /// Kbit/s.
    #[zbus(property)]
    fn max_bitrate(&self) -> zbus::Result<u32>;

    /// Percent.
    #[zbus(property)]
    fn strength(&self) -> zbus::Result<u8>;

    /// CLOCK_BOOTTIME seconds of the last scan hit, or -1.
    #[zbus(property)]
    fn last_seen(&self) -> zbus::Result<i32>;
}
