// airsync-core: Reconciles NetworkManager access points with wpa_supplicant
// BSS objects into one live, immutable snapshot per wireless device.

pub mod backend;
pub mod bootstrap;
pub mod config;
mod convert;
pub mod device;
mod engine;
pub mod error;
mod index;
mod listener;
pub mod model;
pub mod security;
pub mod store;
pub mod stream;
mod subscription;
pub mod uptime;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{LifecycleEvent, WirelessBackend};
pub use bootstrap::BootstrapReport;
pub use config::{DeviceConfig, DeviceSelector};
pub use device::WifiDevice;
pub use error::CoreError;
pub use security::{KeyMgmt, SecurityFlags};
pub use store::{Registry, Snapshot};
pub use stream::{AccessPointFilter, SnapshotStream};

pub use model::{
    AccessPoint, AccessPointMode, AccessPointPatch, ApPath, Band, BssPath, MacAddress, Security,
};
