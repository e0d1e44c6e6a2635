//! wpa_supplicant proxies: the secondary source of BSS objects.
//!
//! Only the fields the reconciliation engine consumes are typed. Property
//! bags are decoded with `DeserializeDict`, which skips unknown keys, so
//! newer supplicant versions adding properties never break decoding.

use zbus::proxy;
use zbus::zvariant::{DeserializeDict, ObjectPath, OwnedObjectPath, Type};

/// Interface index 0, the only interface the engine watches.
pub const DEFAULT_INTERFACE_PATH: &str = "/fi/w1/wpa_supplicant1/Interfaces/0";

// ── Property bags ───────────────────────────────────────────────────

/// A `WPA` or `RSN` security dictionary as published by the supplicant.
///
/// Tokens are lowercase protocol names (`wpa-psk`, `ccmp`, ...). Absent
/// keys decode to empty/`None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, DeserializeDict, Type)]
#[zvariant(signature = "dict")]
pub struct SecurityInfo {
    #[zvariant(rename = "KeyMgmt")]
    pub key_mgmt: Option<Vec<String>>,
    #[zvariant(rename = "Pairwise")]
    pub pairwise: Option<Vec<String>>,
    #[zvariant(rename = "Group")]
    pub group: Option<String>,
}

/// Partial property set carried by a BSS `PropertiesChanged` signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, DeserializeDict, Type)]
#[zvariant(signature = "dict")]
pub struct BssChanges {
    /// Seconds since the BSS was last seen in a scan.
    #[zvariant(rename = "Age")]
    pub age: Option<u32>,
    /// MHz.
    #[zvariant(rename = "Frequency")]
    pub frequency: Option<u16>,
    #[zvariant(rename = "WPA")]
    pub wpa: Option<SecurityInfo>,
    #[zvariant(rename = "RSN")]
    pub rsn: Option<SecurityInfo>,
}

/// Initial properties delivered with `BSSAdded`.
#[derive(Debug, Clone, Default, DeserializeDict, Type)]
#[zvariant(signature = "dict")]
pub struct BssAddedProperties {
    #[zvariant(rename = "BSSID")]
    pub bssid: Option<Vec<u8>>,
}

// ── Proxies ─────────────────────────────────────────────────────────

/// A supplicant-controlled network interface.
#[proxy(
    interface = "fi.w1.wpa_supplicant1.Interface",
    default_service = "fi.w1.wpa_supplicant1"
)]
pub trait Interface {
    #[zbus(property, name = "BSSs")]
    fn bsss(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    #[zbus(signal, name = "BSSAdded")]
    fn bss_added(&self, path: ObjectPath<'_>, properties: BssAddedProperties) -> zbus::Result<()>;

    #[zbus(signal, name = "BSSRemoved")]
    fn bss_removed(&self, path: ObjectPath<'_>) -> zbus::Result<()>;
}

/// One Basic Service Set seen by the supplicant.
#[proxy(interface = "fi.w1.wpa_supplicant1.BSS", default_service = "fi.w1.wpa_supplicant1")]
pub trait Bss {
    #[zbus(property, name = "BSSID")]
    fn bssid(&self) -> zbus::Result<Vec<u8>>;

    #[zbus(signal)]
    fn properties_changed(&self, properties: BssChanges) -> zbus::Result<()>;
}
