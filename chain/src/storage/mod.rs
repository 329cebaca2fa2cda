mod changeset;
mod memory;

pub mod keys;

pub use changeset::ChangeSet;
pub use memory::MemoryStorage;

use bytes::Bytes;

/// Backend contract for a chain's state store. Keys and values are opaque
/// byte sequences; namespacing (keys module) and change-set staging are
/// layered on top. The shipped backend is in-memory, the contract is
/// backend-agnostic.
pub trait Storage: Send + Sync {
    fn get(&self, key: &[u8]) -> Option<Bytes>;

    fn put(&mut self, key: Bytes, value: Bytes);

    fn delete(&mut self, key: &[u8]);

    fn contains(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}
