use std::collections::BTreeMap;

use bytes::Bytes;

use super::Storage;

/// Default in-memory backend.
#[derive(Default)]
pub struct MemoryStorage {
    entries: BTreeMap<Bytes, Bytes>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: Bytes, value: Bytes) {
        self.entries.insert(key, value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }

    fn contains(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }
}
