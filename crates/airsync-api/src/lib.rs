//! Typed D-Bus boundary for the two Wi-Fi sources `airsync` reconciles.
//!
//! - [`network_manager`]: NetworkManager access points (the primary source).
//! - [`supplicant`]: wpa_supplicant BSS objects (the secondary source).
//! - [`Client`]: one wireless device plus its supplicant interface on the
//!   system bus: object enumeration, property reads, signal streams, and the
//!   scan / activate remote calls.

pub mod client;
pub mod error;
pub mod network_manager;
pub mod supplicant;

pub use client::{AccessPointEvent, AccessPointInfo, BssEvent, Client, DeviceSelector};
pub use error::Error;
pub use supplicant::{BssChanges, SecurityInfo};
