//! Shared configuration for airsync tools.
//!
//! One TOML file plus `AIRSYNC_*` environment overrides, translated to
//! `airsync_core::DeviceConfig`. The CLI layers its own flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use airsync_core::{DeviceConfig, DeviceSelector};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub device: DeviceSection,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// Which device to watch and how.
#[derive(Debug, Deserialize, Serialize)]
pub struct DeviceSection {
    /// Kernel interface name, resolved through NetworkManager.
    #[serde(default = "default_interface")]
    pub interface: String,

    /// NetworkManager device object path. Wins over `interface`.
    pub path: Option<String>,

    #[serde(default = "default_supplicant_interface")]
    pub supplicant_interface: String,

    #[serde(default = "default_uptime_path")]
    pub uptime_path: PathBuf,

    #[serde(default = "default_uptime_timeout_ms")]
    pub uptime_timeout_ms: u64,

    #[serde(default = "default_mutation_buffer")]
    pub mutation_buffer: usize,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            path: None,
            supplicant_interface: default_supplicant_interface(),
            uptime_path: default_uptime_path(),
            uptime_timeout_ms: default_uptime_timeout_ms(),
            mutation_buffer: default_mutation_buffer(),
        }
    }
}

fn default_interface() -> String {
    "wlan0".into()
}
fn default_supplicant_interface() -> String {
    DeviceConfig::default().supplicant_interface
}
fn default_uptime_path() -> PathBuf {
    DeviceConfig::default().uptime_path
}
fn default_uptime_timeout_ms() -> u64 {
    500
}
fn default_mutation_buffer() -> usize {
    256
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "airsync", "airsync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("airsync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields defaults.
///
/// Nested keys use a double underscore: `AIRSYNC_DEVICE__INTERFACE=wlan1`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("AIRSYNC_").split("__"));

    Ok(figment.extract()?)
}

pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Render the effective configuration as TOML.
pub fn to_toml(config: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a validated `DeviceConfig` from the `[device]` table.
pub fn device_config(section: &DeviceSection) -> Result<DeviceConfig, ConfigError> {
    let device = match &section.path {
        Some(path) => DeviceSelector::Path(path.clone()),
        None if section.interface.trim().is_empty() => {
            return Err(ConfigError::Validation {
                field: "device.interface".into(),
                reason: "must not be empty".into(),
            });
        }
        None => DeviceSelector::Interface(section.interface.clone()),
    };

    let config = DeviceConfig {
        device,
        supplicant_interface: section.supplicant_interface.clone(),
        uptime_path: section.uptime_path.clone(),
        uptime_timeout: Duration::from_millis(section.uptime_timeout_ms),
        mutation_buffer: section.mutation_buffer,
    };
    config.validate().map_err(|e| ConfigError::Validation {
        field: "device".into(),
        reason: e.to_string(),
    })?;
    Ok(config)
}
