//! Durable local cart mirror.
//!
//! The snapshot is the fallback display source when the cart service is
//! unreachable or answers with nothing recognizable. It lives in a single
//! key of the environment's durable key-value store as a JSON list of
//! `{productId, cantidad}` entries, one per product.

use std::collections::HashMap;
use std::sync::Mutex;

use mercadito_core::{LocalSnapshotEntry, ProductId};

/// Storage key for the cart snapshot.
pub const CART_LOCAL_KEY: &str = "cartLocal";

/// The durable key-value collaborator (e.g. browser localStorage, a
/// settings file). Plain string entries; absence of a key is always a
/// valid state.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str);
    /// Remove a key; removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

/// In-memory [`KeyValueStore`] for tests and non-durable use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

/// The local cart snapshot over a durable key-value store.
///
/// All writers go through this type: updates are read-modify-write against
/// the backing key, entries are unique per product id, and a quantity that
/// drops to zero removes its entry. A corrupt stored value reads as an
/// empty snapshot, never as an error.
pub struct SnapshotStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    /// Wrap a key-value store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// All current entries. Corrupt or absent data reads as empty.
    #[must_use]
    pub fn read_all(&self) -> Vec<LocalSnapshotEntry> {
        self.store
            .get(CART_LOCAL_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Sum of quantities across all entries.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.read_all().iter().map(|e| e.quantity).sum()
    }

    /// Apply an additive or subtractive delta to a product's quantity.
    ///
    /// A new entry starts at `max(delta, 0)`; an existing one moves to
    /// `existing + delta` clamped at zero. Entries at zero are removed.
    pub fn add(&self, product_id: ProductId, delta: i32) {
        let mut entries = self.read_all();

        let quantity = match entries.iter().find(|e| e.product_id == product_id) {
            Some(entry) => i64::from(entry.quantity) + i64::from(delta),
            None => i64::from(delta),
        }
        .max(0);

        self.apply(&mut entries, product_id, u32::try_from(quantity).unwrap_or(u32::MAX));
    }

    /// Set a product's quantity outright. Zero removes the entry.
    pub fn set(&self, product_id: ProductId, quantity: u32) {
        let mut entries = self.read_all();
        self.apply(&mut entries, product_id, quantity);
    }

    /// Remove a product's entry.
    pub fn remove(&self, product_id: ProductId) {
        let mut entries = self.read_all();
        self.apply(&mut entries, product_id, 0);
    }

    /// Drop the whole snapshot (logout, explicit clear).
    pub fn clear(&self) {
        self.store.remove(CART_LOCAL_KEY);
    }

    // Updates replace in place so the stored ordering stays stable.
    fn apply(&self, entries: &mut Vec<LocalSnapshotEntry>, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            entries.retain(|e| e.product_id != product_id);
        } else if let Some(entry) = entries.iter_mut().find(|e| e.product_id == product_id) {
            entry.quantity = quantity;
        } else {
            entries.push(LocalSnapshotEntry {
                product_id,
                quantity,
            });
        }
        self.write(entries);
    }

    fn write(&self, entries: &[LocalSnapshotEntry]) {
        if let Ok(raw) = serde_json::to_string(entries) {
            self.store.set(CART_LOCAL_KEY, &raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SnapshotStore<MemoryStore> {
        SnapshotStore::new(MemoryStore::new())
    }

    #[test]
    fn test_add_creates_entry() {
        let snapshot = store();
        snapshot.add(ProductId::new(1), 2);
        assert_eq!(snapshot.read_all().len(), 1);
        assert_eq!(snapshot.count(), 2);
    }

    #[test]
    fn test_add_accumulates() {
        let snapshot = store();
        snapshot.add(ProductId::new(1), 2);
        snapshot.add(ProductId::new(1), 3);
        assert_eq!(snapshot.count(), 5);
        assert_eq!(snapshot.read_all().len(), 1);
    }

    #[test]
    fn test_add_zero_is_idempotent() {
        let snapshot = store();
        snapshot.add(ProductId::new(1), 4);
        let before = snapshot.read_all();
        snapshot.add(ProductId::new(1), 0);
        assert_eq!(snapshot.read_all(), before);
    }

    #[test]
    fn test_add_then_subtract_restores_absence() {
        let snapshot = store();
        snapshot.add(ProductId::new(9), 3);
        snapshot.add(ProductId::new(9), -3);
        assert!(snapshot.read_all().is_empty());
    }

    #[test]
    fn test_add_negative_on_absent_stores_nothing() {
        let snapshot = store();
        snapshot.add(ProductId::new(9), -2);
        assert!(snapshot.read_all().is_empty());
    }

    #[test]
    fn test_subtract_clamps_at_zero_and_removes() {
        let snapshot = store();
        snapshot.add(ProductId::new(1), 1);
        snapshot.add(ProductId::new(1), -5);
        assert!(snapshot.read_all().is_empty());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let snapshot = store();
        snapshot.add(ProductId::new(1), 2);
        snapshot.set(ProductId::new(1), 7);
        assert_eq!(snapshot.count(), 7);
        assert_eq!(snapshot.read_all().len(), 1);
    }

    #[test]
    fn test_update_preserves_entry_order() {
        let snapshot = store();
        snapshot.add(ProductId::new(1), 1);
        snapshot.add(ProductId::new(2), 1);
        snapshot.add(ProductId::new(3), 1);

        snapshot.add(ProductId::new(1), 4);
        snapshot.set(ProductId::new(2), 9);

        let ids: Vec<i64> = snapshot.read_all().iter().map(|e| e.product_id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_set_zero_removes() {
        let snapshot = store();
        snapshot.add(ProductId::new(1), 2);
        snapshot.set(ProductId::new(1), 0);
        assert!(snapshot.read_all().is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let snapshot = store();
        snapshot.add(ProductId::new(1), 2);
        snapshot.add(ProductId::new(2), 1);
        snapshot.remove(ProductId::new(1));
        assert_eq!(snapshot.read_all().len(), 1);
        snapshot.clear();
        assert!(snapshot.read_all().is_empty());
    }

    #[test]
    fn test_corrupt_stored_value_reads_as_empty() {
        let kv = MemoryStore::new();
        kv.set(CART_LOCAL_KEY, "{not json");
        let snapshot = SnapshotStore::new(kv);
        assert!(snapshot.read_all().is_empty());
        assert_eq!(snapshot.count(), 0);

        // and the store recovers on the next write
        snapshot.add(ProductId::new(3), 1);
        assert_eq!(snapshot.count(), 1);
    }

    #[test]
    fn test_persisted_wire_layout() {
        let kv = MemoryStore::new();
        let snapshot = SnapshotStore::new(kv);
        snapshot.add(ProductId::new(7), 2);

        let raw = snapshot.store.get(CART_LOCAL_KEY).expect("written");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value[0]["productId"], 7);
        assert_eq!(value[0]["cantidad"], 2);
    }
}
