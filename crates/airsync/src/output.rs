//! Output formatting: table, JSON, plain.
//!
//! Renders access point lists in the format selected by `--output`.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use airsync_core::{AccessPoint, Band};
use airsync_core::security::key_management;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Status line on stderr, so stdout stays machine-readable.
pub fn status(message: &str, color: bool, quiet: bool) {
    if quiet {
        return;
    }
    let mut stderr = io::stderr().lock();
    if color {
        let _ = writeln!(stderr, "{}", message.cyan());
    } else {
        let _ = writeln!(stderr, "{message}");
    }
}

// ── Table row ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct AccessPointRow {
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "BSSID")]
    bssid: String,
    #[tabled(rename = "Band")]
    band: String,
    #[tabled(rename = "MHz")]
    frequency: u32,
    #[tabled(rename = "Signal")]
    strength: String,
    #[tabled(rename = "Security")]
    security: String,
    #[tabled(rename = "Key mgmt")]
    key_mgmt: String,
    #[tabled(rename = "Last seen")]
    last_seen: String,
}

impl From<&Arc<AccessPoint>> for AccessPointRow {
    fn from(ap: &Arc<AccessPoint>) -> Self {
        let methods: Vec<String> = key_management(ap.rsn_flags | ap.wpa_flags)
            .map(|m| m.to_string())
            .collect();
        Self {
            ssid: if ap.ssid.is_empty() {
                "(hidden)".into()
            } else {
                ap.ssid.clone()
            },
            bssid: ap.hw_address.to_string(),
            band: ap.band().map_or("-", Band::label).into(),
            frequency: ap.frequency,
            strength: format!("{}%", ap.strength),
            security: ap.security().label().into(),
            key_mgmt: if methods.is_empty() {
                "-".into()
            } else {
                methods.join(",")
            },
            last_seen: ap.last_seen.map_or_else(|| "-".into(), |s| format!("{s}s")),
        }
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render access points in the chosen format.
pub fn render_access_points(
    format: &OutputFormat,
    access_points: &[Arc<AccessPoint>],
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<AccessPointRow> = access_points.iter().map(AccessPointRow::from).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(access_points)?,
        OutputFormat::JsonCompact => serde_json::to_string(access_points)?,
        OutputFormat::Plain => access_points
            .iter()
            .map(|ap| ap.hw_address.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use airsync_core::{AccessPointMode, ApPath, MacAddress, SecurityFlags};

    fn ap() -> Arc<AccessPoint> {
        Arc::new(AccessPoint {
            path: ApPath::new("/org/freedesktop/NetworkManager/AccessPoint/1"),
            hw_address: MacAddress::new("aa:bb:cc:dd:ee:ff"),
            ssid: "Home".into(),
            frequency: 5180,
            strength: 80,
            flags: 1,
            wpa_flags: SecurityFlags::NONE,
            rsn_flags: SecurityFlags::KEY_MGMT_PSK | SecurityFlags::PAIR_CCMP,
            mode: AccessPointMode::Infrastructure,
            max_bitrate: 866_700,
            last_seen: Some(1234),
        })
    }

    #[test]
    fn table_has_one_row_per_access_point() {
        let out = render_access_points(&OutputFormat::Table, &[ap()]).unwrap_or_default();
        assert!(out.contains("Home"));
        assert!(out.contains("AA:BB:CC:DD:EE:FF"));
        assert!(out.contains("5GHz"));
        assert!(out.contains("WPA2"));
        assert!(out.contains("wpa-psk"));
        assert!(out.contains("1234s"));
    }

    #[test]
    fn plain_lists_bssids() {
        let out = render_access_points(&OutputFormat::Plain, &[ap(), ap()]).unwrap_or_default();
        assert_eq!(out, "AA:BB:CC:DD:EE:FF\nAA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render_access_points(&OutputFormat::JsonCompact, &[ap()]).unwrap_or_default();
        assert!(!out.contains('\n'));
        assert!(out.contains("\"ssid\":\"Home\""));
    }
}
