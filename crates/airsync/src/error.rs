//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use airsync_config::ConfigError;
use airsync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Bus ──────────────────────────────────────────────────────────
    #[error("Could not talk to NetworkManager or wpa_supplicant")]
    #[diagnostic(
        code(airsync::bus),
        help(
            "Check that both services are running:\n\
             systemctl status NetworkManager wpa_supplicant"
        )
    )]
    Bus {
        #[source]
        source: airsync_api::Error,
    },

    #[error("Permission denied by the system bus")]
    #[diagnostic(
        code(airsync::permission),
        help("Scanning and activating connections may require polkit authorization.")
    )]
    PermissionDenied {
        #[source]
        source: airsync_api::Error,
    },

    #[error("No wireless device for interface '{interface}'")]
    #[diagnostic(
        code(airsync::device_not_found),
        help(
            "List devices with: nmcli device status\n\
             Then pass --interface <name> or --device <object path>."
        )
    )]
    DeviceNotFound { interface: String },

    // ── Requests ─────────────────────────────────────────────────────
    #[error("Scan request failed")]
    #[diagnostic(
        code(airsync::scan_failed),
        help("NetworkManager rejects scans issued too soon after the previous one; retry shortly.")
    )]
    ScanFailed {
        #[source]
        source: airsync_api::Error,
    },

    #[error("Could not activate connection '{profile}'")]
    #[diagnostic(
        code(airsync::activation_failed),
        help("List saved profiles with: nmcli -f NAME,DBUS-PATH connection show")
    )]
    ActivationFailed {
        profile: String,
        #[source]
        source: CoreError,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(airsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(airsync::config),
        help("Inspect the effective configuration with: airsync config show")
    )]
    Config(ConfigError),

    // ── Engine ───────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(airsync::core))]
    Core(CoreError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not serialize output: {0}")]
    #[diagnostic(code(airsync::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Bus { .. } => exit_code::CONNECTION,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

impl From<airsync_api::Error> for CliError {
    fn from(err: airsync_api::Error) -> Self {
        match err {
            airsync_api::Error::DeviceNotFound { interface } => Self::DeviceNotFound { interface },
            airsync_api::Error::InvalidPath { path, reason } => Self::Validation {
                field: "object path".into(),
                reason: format!("'{path}': {reason}"),
            },
            e if e.is_access_denied() => Self::PermissionDenied { source: e },
            e => Self::Bus { source: e },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport(e) => e.into(),
            CoreError::ScanRequest { source } if source.is_access_denied() => {
                Self::PermissionDenied { source }
            }
            CoreError::ScanRequest { source } => Self::ScanFailed { source },
            CoreError::Config { message } => Self::Validation {
                field: "device".into(),
                reason: message,
            },
            other => Self::Core(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_lookup_maps_to_not_found() {
        let err: CliError = CoreError::Transport(airsync_api::Error::DeviceNotFound {
            interface: "wlan7".into(),
        })
        .into();
        assert!(matches!(err, CliError::DeviceNotFound { ref interface } if interface == "wlan7"));
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err: CliError = ConfigError::Validation {
            field: "device.interface".into(),
            reason: "must not be empty".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
