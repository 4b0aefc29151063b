use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::reorder::move_in_place;

/// Session-scoped identity of one list item, independent of its index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn derived(seed: usize) -> Self {
        Self(format!("item-{seed}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for ItemKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeySource {
    Derived,
    External,
}

/// Key list of one list level, kept index-aligned with the items it tracks.
///
/// Derived keys come from a monotonic seed, so a key released by a delete is
/// never handed out again in the same session.
#[derive(Debug, Clone)]
pub struct ItemKeys {
    keys: Vec<ItemKey>,
    source: KeySource,
    next_seed: usize,
}

impl Default for ItemKeys {
    fn default() -> Self {
        Self::derived(0)
    }
}

impl ItemKeys {
    pub fn derived(len: usize) -> Self {
        Self {
            keys: (0..len).map(ItemKey::derived).collect(),
            source: KeySource::Derived,
            next_seed: len,
        }
    }

    pub fn external<I, K>(ids: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ItemKey>,
    {
        let mut list = Self::derived(0);
        list.replace_external(ids);
        list
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_external(&self) -> bool {
        self.source == KeySource::External
    }

    pub fn as_slice(&self) -> &[ItemKey] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemKey> {
        self.keys.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ItemKey> {
        self.keys.get(index)
    }

    pub fn position(&self, key: &ItemKey) -> Option<usize> {
        self.keys.iter().position(|candidate| candidate == key)
    }

    /// Appends a key that is not yet present in this list and returns it.
    pub fn push_fresh(&mut self) -> ItemKey {
        let mut key = ItemKey::derived(self.next_seed);
        self.next_seed += 1;
        while self.keys.contains(&key) {
            key = ItemKey::derived(self.next_seed);
            self.next_seed += 1;
        }
        self.keys.push(key.clone());
        key
    }

    pub fn remove(&mut self, index: usize) -> Option<ItemKey> {
        if index < self.keys.len() {
            Some(self.keys.remove(index))
        } else {
            None
        }
    }

    pub fn relocate(&mut self, from: usize, to: usize) -> bool {
        move_in_place(&mut self.keys, Some(from), Some(to))
    }

    /// Replaces the list with a new set of caller supplied IDs.
    pub fn replace_external<I, K>(&mut self, ids: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<ItemKey>,
    {
        self.keys = ids.into_iter().map(Into::into).collect();
        self.source = KeySource::External;
        self.next_seed = self.next_seed.max(self.keys.len());
        let duplicates = self.duplicates();
        if !duplicates.is_empty() {
            tracing::warn!(
                target: "blockedit::list",
                ?duplicates,
                "duplicate item IDs; drags resolve to the first occurrence"
            );
        }
    }

    /// Keys that occur more than once, each reported once in list order.
    pub fn duplicates(&self) -> Vec<&ItemKey> {
        let mut seen = IndexSet::new();
        let mut repeated = IndexSet::new();
        for key in &self.keys {
            if !seen.insert(key) {
                repeated.insert(key);
            }
        }
        repeated.into_iter().collect()
    }

    /// Re-derives the keys when the tracked collection changed shape outside
    /// the controller. Returns `true` when the keys were rebuilt.
    ///
    /// Rebuilt keys no longer follow the items they used to name; callers whose
    /// arrays change from outside should supply external IDs instead.
    pub fn sync(&mut self, len: usize) -> bool {
        if self.keys.len() == len {
            return false;
        }
        tracing::warn!(
            target: "blockedit::list",
            expected = self.keys.len(),
            actual = len,
            external = self.is_external(),
            "item count changed outside the controller; re-deriving keys"
        );
        let seed = self.next_seed;
        self.keys = (seed..seed + len).map(ItemKey::derived).collect();
        self.source = KeySource::Derived;
        self.next_seed = seed + len;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &ItemKeys) -> Vec<&str> {
        list.iter().map(ItemKey::as_str).collect()
    }

    #[test]
    fn derives_index_keys() {
        let list = ItemKeys::derived(3);
        assert_eq!(keys(&list), ["item-0", "item-1", "item-2"]);
        assert!(!list.is_external());
    }

    #[test]
    fn deleted_keys_are_not_reissued() {
        let mut list = ItemKeys::derived(2);
        list.remove(1);
        let fresh = list.push_fresh();
        assert_eq!(fresh.as_str(), "item-2");
        assert_eq!(keys(&list), ["item-0", "item-2"]);
    }

    #[test]
    fn relocate_keeps_keys_with_their_items() {
        let mut list = ItemKeys::derived(3);
        assert!(list.relocate(2, 0));
        assert_eq!(keys(&list), ["item-2", "item-0", "item-1"]);
        assert_eq!(list.position(&ItemKey::from("item-0")), Some(1));
    }

    #[test]
    fn fresh_keys_skip_external_collisions() {
        let mut list = ItemKeys::external(["item-1", "home"]);
        let fresh = list.push_fresh();
        assert_eq!(fresh.as_str(), "item-2");
        assert!(list.is_external());
    }

    #[test]
    fn sync_rebuilds_only_on_shape_change() {
        let mut list = ItemKeys::external(["a", "b"]);
        assert!(!list.sync(2));
        assert!(list.is_external());
        assert!(list.sync(3));
        assert_eq!(list.len(), 3);
        assert!(!list.is_external());
        let unique: std::collections::HashSet<_> = list.iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn repeated_external_ids_are_reported() {
        let list = ItemKeys::external(["a", "b", "a", "c", "b", "a"]);
        let repeated: Vec<&str> = list.duplicates().into_iter().map(ItemKey::as_str).collect();
        assert_eq!(repeated, ["a", "b"]);
        assert_eq!(list.position(&ItemKey::from("a")), Some(0));
        assert!(ItemKeys::external(["x", "y"]).duplicates().is_empty());
        assert!(ItemKeys::derived(4).duplicates().is_empty());
    }
}
