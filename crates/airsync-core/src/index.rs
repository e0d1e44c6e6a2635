// ── Identity index ──
//
// Correlates the two object-path spaces through the hardware address.
// Each side gets its own bidirectional map; the sides are never merged
// and never removed in lockstep with each other. A lookup miss is an
// ordinary answer: the other source may not have announced the object
// yet, or may already have dropped it.

use std::collections::HashMap;
use std::hash::Hash;

use crate::model::{ApPath, BssPath, MacAddress};

/// One-to-one map kept consistent in both directions.
///
/// Every pair is inserted and removed as a unit: inserting `(k, v)`
/// first evicts any pair that already uses `k` or `v`.
#[derive(Debug, Clone)]
pub(crate) struct BiMap<K, V> {
    forward: HashMap<K, V>,
    reverse: HashMap<V, K>,
}

impl<K, V> Default for BiMap<K, V> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: HashMap::new(),
        }
    }
}

impl<K, V> BiMap<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone + Eq + Hash,
{
    pub(crate) fn insert(&mut self, key: K, value: V) {
        self.remove_by_key(&key);
        self.remove_by_value(&value);
        self.forward.insert(key.clone(), value.clone());
        self.reverse.insert(value, key);
    }

    /// Remove the pair for `key`. Absent keys are a no-op.
    pub(crate) fn remove_by_key(&mut self, key: &K) -> Option<V> {
        let value = self.forward.remove(key)?;
        self.reverse.remove(&value);
        Some(value)
    }

    /// Remove the pair for `value`. Absent values are a no-op.
    pub(crate) fn remove_by_value(&mut self, value: &V) -> Option<K> {
        let key = self.reverse.remove(value)?;
        self.forward.remove(&key);
        Some(key)
    }

    pub(crate) fn get_by_key(&self, key: &K) -> Option<&V> {
        self.forward.get(key)
    }

    pub(crate) fn get_by_value(&self, value: &V) -> Option<&K> {
        self.reverse.get(value)
    }

    pub(crate) fn len(&self) -> usize {
        self.forward.len()
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        self.forward.len() == self.reverse.len()
            && self
                .forward
                .iter()
                .all(|(k, v)| self.reverse.get(v) == Some(k))
    }
}

/// Path ↔ hardware address correlation for both sources.
#[derive(Debug, Default)]
pub(crate) struct IdentityIndex {
    bss: BiMap<BssPath, MacAddress>,
    ap: BiMap<ApPath, MacAddress>,
}

impl IdentityIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // ── Secondary source (BSS) ───────────────────────────────────────

    pub(crate) fn record_bss(&mut self, path: BssPath, identity: MacAddress) {
        self.bss.insert(path, identity);
    }

    pub(crate) fn remove_bss(&mut self, path: &BssPath) -> Option<MacAddress> {
        self.bss.remove_by_key(path)
    }

    pub(crate) fn identity_by_bss(&self, path: &BssPath) -> Option<&MacAddress> {
        self.bss.get_by_key(path)
    }

    pub(crate) fn bss_by_identity(&self, identity: &MacAddress) -> Option<&BssPath> {
        self.bss.get_by_value(identity)
    }

    // ── Primary source (access points) ───────────────────────────────

    pub(crate) fn record_ap(&mut self, path: ApPath, identity: MacAddress) {
        self.ap.insert(path, identity);
    }

    pub(crate) fn remove_ap(&mut self, path: &ApPath) -> Option<MacAddress> {
        self.ap.remove_by_key(path)
    }

    #[cfg(test)]
    pub(crate) fn identity_by_ap(&self, path: &ApPath) -> Option<&MacAddress> {
        self.ap.get_by_key(path)
    }

    pub(crate) fn ap_by_identity(&self, identity: &MacAddress) -> Option<&ApPath> {
        self.ap.get_by_value(identity)
    }

    pub(crate) fn bss_len(&self) -> usize {
        self.bss.len()
    }

    pub(crate) fn ap_len(&self) -> usize {
        self.ap.len()
    }

    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.bss.is_consistent() && self.ap.is_consistent()
    }
}
