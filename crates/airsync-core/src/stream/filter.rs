// ── Snapshot filters ──
//
// Narrow a snapshot without touching the bus.

use std::sync::Arc;

use crate::model::{AccessPoint, Band};
use crate::store::Snapshot;

/// Predicate over access point records.
pub enum AccessPointFilter {
    All,
    /// Exact SSID match.
    Ssid(String),
    Band(Band),
    Secured,
    Open,
    /// Signal strength at or above this percentage.
    MinStrength(u8),
    Custom(Box<dyn Fn(&AccessPoint) -> bool + Send + Sync>),
}

impl AccessPointFilter {
    pub fn matches(&self, ap: &AccessPoint) -> bool {
        match self {
            Self::All => true,
            Self::Ssid(ssid) => ap.ssid == *ssid,
            Self::Band(band) => ap.band() == Some(*band),
            Self::Secured => ap.is_secured(),
            Self::Open => !ap.is_secured(),
            Self::MinStrength(min) => ap.strength >= *min,
            Self::Custom(f) => f(ap),
        }
    }

    /// Matching records, strongest signal first, ties broken by path.
    pub fn apply(&self, snapshot: &Snapshot) -> Vec<Arc<AccessPoint>> {
        let mut matched: Vec<_> = snapshot
            .values()
            .filter(|ap| self.matches(ap))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.strength.cmp(&a.strength).then_with(|| a.path.cmp(&b.path)));
        matched
    }
}
