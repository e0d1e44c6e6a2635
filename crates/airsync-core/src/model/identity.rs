// ── Core identity types ──
//
// The two sources name their objects in separate path spaces that can
// collide textually. `ApPath` and `BssPath` keep them apart at compile
// time; `MacAddress` is the natural key that joins them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Object paths ────────────────────────────────────────────────────

macro_rules! object_path_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(path: impl Into<String>) -> Self {
                Self(path.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

object_path_type!(
    /// Object path of a NetworkManager access point (primary source).
    ApPath
);

object_path_type!(
    /// Object path of a wpa_supplicant BSS (secondary source).
    BssPath
);

// ── MacAddress ──────────────────────────────────────────────────────

/// Hardware address, normalized to uppercase colon-separated form
/// (`AA:BB:CC:DD:EE:FF`), which is how NetworkManager publishes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress(String);

impl MacAddress {
    /// Normalize a textual address. Accepts `:` or `-` separators in any case.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw.as_ref().trim().to_uppercase().replace('-', ":");
        Self(normalized)
    }

    /// Build from raw BSSID bytes. Returns `None` unless exactly 6 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let octets: &[u8; 6] = bytes.try_into().ok()?;
        let text = octets
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":");
        Some(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mac_from_bytes_is_uppercase_colon_hex() {
        let mac = MacAddress::from_bytes(&[0xaa, 0xbb, 0xcc, 0x0d, 0xee, 0xff]).unwrap();
        assert_eq!(mac.as_str(), "AA:BB:CC:0D:EE:FF");
    }

    #[test]
    fn mac_from_bytes_rejects_wrong_length() {
        assert!(MacAddress::from_bytes(&[1, 2, 3]).is_none());
        assert!(MacAddress::from_bytes(&[0; 8]).is_none());
    }

    #[test]
    fn mac_text_and_bytes_agree() {
        let from_text: MacAddress = "aa-bb-cc-dd-ee-ff".parse().unwrap();
        let from_bytes = MacAddress::from_bytes(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]).unwrap();
        assert_eq!(from_text, from_bytes);
    }

    #[test]
    fn path_types_display_raw_path() {
        let ap = ApPath::from("/org/freedesktop/NetworkManager/AccessPoint/4");
        assert_eq!(ap.to_string(), "/org/freedesktop/NetworkManager/AccessPoint/4");
        assert_eq!(BssPath::new("/bss/1").as_str(), "/bss/1");
    }
}
