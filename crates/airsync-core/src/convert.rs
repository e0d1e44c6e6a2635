// ── Bus payloads → domain records ──

use airsync_api::AccessPointInfo;

use crate::model::{AccessPoint, AccessPointMode, ApPath, MacAddress};
use crate::security::SecurityFlags;

/// Build a registry record from NetworkManager's property bag.
pub(crate) fn access_point(path: ApPath, info: AccessPointInfo) -> AccessPoint {
    AccessPoint {
        path,
        hw_address: MacAddress::new(&info.hw_address),
        ssid: String::from_utf8_lossy(&info.ssid).into_owned(),
        frequency: info.frequency,
        strength: info.strength,
        flags: info.flags,
        wpa_flags: SecurityFlags::from_bits(info.wpa_flags),
        rsn_flags: SecurityFlags::from_bits(info.rsn_flags),
        mode: AccessPointMode::from(info.mode),
        max_bitrate: info.max_bitrate,
        // -1 means "never seen"
        last_seen: u64::try_from(info.last_seen).ok(),
    }
}
