use hashbrown::HashMap;

use crate::types::ContactId;

/// Folded key to ordered contact ids. Buckets are never left empty.
#[derive(Debug, Default, Clone)]
pub struct BucketIndex {
    buckets: HashMap<String, Vec<ContactId>>,
}

impl BucketIndex {
    /// Appends `id` to the bucket at `key`, creating it on demand.
    pub fn insert(&mut self, key: String, id: ContactId) {
        self.buckets.entry(key).or_default().push(id);
    }

    /// Removes `id` from the bucket at `key`, pruning the bucket when it empties.
    /// Returns false if `id` was not present under `key`.
    pub fn remove(&mut self, key: &str, id: ContactId) -> bool {
        let Some(ids) = self.buckets.get_mut(key) else {
            return false;
        };
        let Some(pos) = ids.iter().position(|x| *x == id) else {
            return false;
        };
        ids.remove(pos);
        if ids.is_empty() {
            self.buckets.remove(key);
        }
        true
    }

    /// Moves `id` between buckets; a no-op when the keys are equal.
    pub fn rekey(&mut self, old_key: &str, new_key: String, id: ContactId) {
        if old_key == new_key {
            return;
        }
        let removed = self.remove(old_key, id);
        debug_assert!(removed, "id {id} missing from bucket {old_key:?}");
        self.insert(new_key, id);
    }

    /// Ids under `key` in insertion order; empty when absent.
    pub fn get(&self, key: &str) -> &[ContactId] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Size of the bucket at `key`, 0 when absent.
    pub fn bucket_len(&self, key: &str) -> usize {
        self.get(key).len()
    }

    /// Keys of all non-empty buckets.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Sum of all bucket sizes.
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
