// ── Access point domain types ──

use serde::{Deserialize, Serialize};

use super::identity::{ApPath, MacAddress};
use crate::security::SecurityFlags;

/// NM80211ApFlags privacy bit.
const AP_FLAGS_PRIVACY: u32 = 0x1;

/// Operating mode reported by NetworkManager (`NM80211Mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AccessPointMode {
    Unknown,
    AdHoc,
    Infrastructure,
    Ap,
    Mesh,
}

impl From<u32> for AccessPointMode {
    fn from(raw: u32) -> Self {
        match raw {
            1 => Self::AdHoc,
            2 => Self::Infrastructure,
            3 => Self::Ap,
            4 => Self::Mesh,
            _ => Self::Unknown,
        }
    }
}

/// Radio band, derived from frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "2.4GHz")]
    TwoPointFour,
    #[serde(rename = "5GHz")]
    Five,
    #[serde(rename = "6GHz")]
    Six,
}

impl Band {
    pub fn from_frequency(mhz: u32) -> Option<Self> {
        match mhz {
            2400..=2500 => Some(Self::TwoPointFour),
            4900..=5925 => Some(Self::Five),
            5926..=7125 => Some(Self::Six),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TwoPointFour => "2.4GHz",
            Self::Five => "5GHz",
            Self::Six => "6GHz",
        }
    }
}

/// Coarse security summary, strongest method wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Security {
    Open,
    Wep,
    Wpa,
    Wpa2,
    Wpa2Enterprise,
    Wpa3,
    Owe,
}

impl Security {
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
            Self::Wpa2 => "WPA2",
            Self::Wpa2Enterprise => "WPA2-Enterprise",
            Self::Wpa3 => "WPA3",
            Self::Owe => "OWE",
        }
    }
}

/// One visible Wi-Fi network: NetworkManager's record, enriched with the
/// fields wpa_supplicant reports more accurately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub path: ApPath,
    pub hw_address: MacAddress,
    pub ssid: String,
    /// MHz.
    pub frequency: u32,
    /// Percent.
    pub strength: u8,
    pub flags: u32,
    pub wpa_flags: SecurityFlags,
    pub rsn_flags: SecurityFlags,
    pub mode: AccessPointMode,
    /// Kbit/s.
    pub max_bitrate: u32,
    /// Seconds since boot of the last scan hit, if ever seen.
    pub last_seen: Option<u64>,
}

impl AccessPoint {
    pub fn band(&self) -> Option<Band> {
        Band::from_frequency(self.frequency)
    }

    pub fn security(&self) -> Security {
        let rsn = self.rsn_flags;
        if rsn.intersects(SecurityFlags::KEY_MGMT_SAE) {
            Security::Wpa3
        } else if rsn.intersects(SecurityFlags::KEY_MGMT_OWE | SecurityFlags::KEY_MGMT_OWE_TM) {
            Security::Owe
        } else if rsn.intersects(
            SecurityFlags::KEY_MGMT_802_1X | SecurityFlags::KEY_MGMT_EAP_SUITE_B_192,
        ) {
            Security::Wpa2Enterprise
        } else if !rsn.is_empty() {
            Security::Wpa2
        } else if !self.wpa_flags.is_empty() {
            Security::Wpa
        } else if self.flags & AP_FLAGS_PRIVACY != 0 {
            Security::Wep
        } else {
            Security::Open
        }
    }

    pub fn is_secured(&self) -> bool {
        self.security() != Security::Open
    }
}

/// Field-level changes merged into an existing record.
///
/// Only `Some` fields are written; everything else is left as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessPointPatch {
    pub frequency: Option<u32>,
    pub last_seen: Option<u64>,
    pub wpa_flags: Option<SecurityFlags>,
    pub rsn_flags: Option<SecurityFlags>,
}

impl AccessPointPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, ap: &mut AccessPoint) {
        if let Some(frequency) = self.frequency {
            ap.frequency = frequency;
        }
        if let Some(last_seen) = self.last_seen {
            ap.last_seen = Some(last_seen);
        }
        if let Some(wpa) = self.wpa_flags {
            ap.wpa_flags = wpa;
        }
        if let Some(rsn) = self.rsn_flags {
            ap.rsn_flags = rsn;
        }
    }
}

#[cfg(test)]
pub(crate) fn sample(path: &str, mac: &str, ssid: &str) -> AccessPoint {
    AccessPoint {
        path: ApPath::from(path),
        hw_address: MacAddress::new(mac),
        ssid: ssid.to_owned(),
        frequency: 2412,
        strength: 70,
        flags: 0,
        wpa_flags: SecurityFlags::NONE,
        rsn_flags: SecurityFlags::NONE,
        mode: AccessPointMode::Infrastructure,
        max_bitrate: 54_000,
        last_seen: None,
    }
}
