// ── Security flag decoding ──
//
// Translates the supplicant's textual WPA/RSN dictionaries into the
// NetworkManager `NM80211ApSecurityFlags` bit layout, so values merged
// from either source compare equal against the same vocabulary.

use std::fmt;
use std::str::FromStr;

use airsync_api::SecurityInfo;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Bitmask over the NetworkManager 802.11 AP security flag vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityFlags(u32);

impl SecurityFlags {
    pub const NONE: Self = Self(0x0000);
    pub const PAIR_WEP40: Self = Self(0x0001);
    pub const PAIR_WEP104: Self = Self(0x0002);
    pub const PAIR_TKIP: Self = Self(0x0004);
    pub const PAIR_CCMP: Self = Self(0x0008);
    pub const GROUP_WEP40: Self = Self(0x0010);
    pub const GROUP_WEP104: Self = Self(0x0020);
    pub const GROUP_TKIP: Self = Self(0x0040);
    pub const GROUP_CCMP: Self = Self(0x0080);
    pub const KEY_MGMT_PSK: Self = Self(0x0100);
    pub const KEY_MGMT_802_1X: Self = Self(0x0200);
    pub const KEY_MGMT_SAE: Self = Self(0x0400);
    pub const KEY_MGMT_OWE: Self = Self(0x0800);
    pub const KEY_MGMT_OWE_TM: Self = Self(0x1000);
    pub const KEY_MGMT_EAP_SUITE_B_192: Self = Self(0x2000);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for SecurityFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for SecurityFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for SecurityFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

// ── Token vocabularies ──────────────────────────────────────────────

/// Key-management tokens the supplicant emits in `KeyMgmt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum KeyMgmt {
    WpaPsk,
    WpaEap,
    Sae,
    Owe,
    OweTm,
    #[strum(serialize = "wpa-eap-suite-b-192")]
    WpaEapSuiteB192,
}

impl KeyMgmt {
    pub const fn flag(self) -> SecurityFlags {
        match self {
            Self::WpaPsk => SecurityFlags::KEY_MGMT_PSK,
            Self::WpaEap => SecurityFlags::KEY_MGMT_802_1X,
            Self::Sae => SecurityFlags::KEY_MGMT_SAE,
            Self::Owe => SecurityFlags::KEY_MGMT_OWE,
            Self::OweTm => SecurityFlags::KEY_MGMT_OWE_TM,
            Self::WpaEapSuiteB192 => SecurityFlags::KEY_MGMT_EAP_SUITE_B_192,
        }
    }
}

/// Cipher tokens shared by `Pairwise` and `Group`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Cipher {
    Wep40,
    Wep104,
    Tkip,
    Ccmp,
}

impl Cipher {
    pub const fn pairwise_flag(self) -> SecurityFlags {
        match self {
            Self::Wep40 => SecurityFlags::PAIR_WEP40,
            Self::Wep104 => SecurityFlags::PAIR_WEP104,
            Self::Tkip => SecurityFlags::PAIR_TKIP,
            Self::Ccmp => SecurityFlags::PAIR_CCMP,
        }
    }

    pub const fn group_flag(self) -> SecurityFlags {
        match self {
            Self::Wep40 => SecurityFlags::GROUP_WEP40,
            Self::Wep104 => SecurityFlags::GROUP_WEP104,
            Self::Tkip => SecurityFlags::GROUP_TKIP,
            Self::Ccmp => SecurityFlags::GROUP_CCMP,
        }
    }
}

// ── Decoder ─────────────────────────────────────────────────────────

/// Decode one supplicant security dictionary into a flag mask.
///
/// Unrecognized tokens contribute nothing; absent keys contribute nothing.
pub fn decode(info: &SecurityInfo) -> SecurityFlags {
    let mut flags = SecurityFlags::NONE;

    for token in info.key_mgmt.iter().flatten() {
        if let Ok(km) = KeyMgmt::from_str(token) {
            flags |= km.flag();
        }
    }

    for token in info.pairwise.iter().flatten() {
        if let Ok(cipher) = Cipher::from_str(token) {
            flags |= cipher.pairwise_flag();
        }
    }

    if let Some(cipher) = info.group.as_deref().and_then(|t| Cipher::from_str(t).ok()) {
        flags |= cipher.group_flag();
    }

    flags
}

/// Every key-management method present in `flags`.
pub fn key_management(flags: SecurityFlags) -> impl Iterator<Item = KeyMgmt> {
    KeyMgmt::iter().filter(move |km| flags.contains(km.flag()))
}
