// ── Domain model ──

mod access_point;
mod identity;

pub use access_point::{AccessPoint, AccessPointMode, AccessPointPatch, Band, Security};
pub use identity::{ApPath, BssPath, MacAddress};

#[cfg(test)]
pub(crate) use access_point::sample;
