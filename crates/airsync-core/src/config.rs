// ── Runtime device configuration ──
//
// Describes which device to watch and how to read the clock. Never
// touches disk: the CLI (via `airsync-config`) builds one and hands it in.

use std::path::PathBuf;
use std::time::Duration;

pub use airsync_api::DeviceSelector;
use airsync_api::supplicant::DEFAULT_INTERFACE_PATH;

use crate::error::CoreError;

/// Configuration for one reconciled wireless device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// NetworkManager wireless device to bind to.
    pub device: DeviceSelector,
    /// wpa_supplicant interface object path.
    pub supplicant_interface: String,
    /// Pseudo-file holding seconds since boot.
    pub uptime_path: PathBuf,
    /// Upper bound on a single uptime read.
    pub uptime_timeout: Duration,
    /// Capacity of the mutation channel feeding the event loop.
    pub mutation_buffer: usize,
}

impl DeviceConfig {
    pub fn new(device: DeviceSelector) -> Self {
        Self {
            device,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.mutation_buffer == 0 {
            return Err(CoreError::Config {
                message: "mutation_buffer must be at least 1".into(),
            });
        }
        if self.uptime_timeout.is_zero() {
            return Err(CoreError::Config {
                message: "uptime_timeout must be non-zero".into(),
            });
        }
        if !self.supplicant_interface.starts_with('/') {
            return Err(CoreError::Config {
                message: format!(
                    "supplicant_interface must be an object path, got '{}'",
                    self.supplicant_interface
                ),
            });
        }
        Ok(())
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device: DeviceSelector::Interface("wlan0".into()),
            supplicant_interface: DEFAULT_INTERFACE_PATH.into(),
            uptime_path: PathBuf::from("/proc/uptime"),
            uptime_timeout: Duration::from_millis(500),
            mutation_buffer: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(DeviceConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_buffer_is_rejected() {
        let config = DeviceConfig {
            mutation_buffer: 0,
            ..DeviceConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config { .. })));
    }

    #[test]
    fn relative_supplicant_path_is_rejected() {
        let config = DeviceConfig {
            supplicant_interface: "Interfaces/0".into(),
            ..DeviceConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
