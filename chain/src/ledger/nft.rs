use bytes::Bytes;

use vela_common::crypto::Hash;

use crate::{
    state::{StateAccess, StateReader},
    storage::keys,
};

/// Content payload of instance `id` in `token`.
pub fn get<S: StateReader + ?Sized>(state: &S, token: &Hash, id: u64) -> Option<Bytes> {
    state.read(&keys::nft_content(token, id))
}

/// Register content for a freshly generated instance id.
pub fn create<S: StateAccess + ?Sized>(state: &mut S, token: &Hash, id: u64, data: Bytes) {
    state.write(keys::nft_content(token, id), data);
}

/// Remove the content entry. Returns whether a removal occurred.
pub fn destroy<S: StateAccess + ?Sized>(state: &mut S, token: &Hash, id: u64) -> bool {
    let key = keys::nft_content(token, id);
    if !state.has(&key) {
        return false;
    }
    state.remove(&key);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DirectState;
    use crate::storage::MemoryStorage;
    use vela_common::crypto::hash;

    #[test]
    fn test_create_get_destroy() {
        let mut store = MemoryStorage::new();
        let mut state = DirectState::new(&mut store);
        let token = hash(b"relic");

        create(&mut state, &token, 1, Bytes::from_static(b"x"));
        assert_eq!(get(&state, &token, 1), Some(Bytes::from_static(b"x")));

        assert!(destroy(&mut state, &token, 1));
        assert_eq!(get(&state, &token, 1), None);
        // second destroy reports nothing to remove
        assert!(!destroy(&mut state, &token, 1));
    }

    #[test]
    fn test_instances_are_independent() {
        let mut store = MemoryStorage::new();
        let mut state = DirectState::new(&mut store);
        let token = hash(b"relic");

        create(&mut state, &token, 1, Bytes::from_static(b"x"));
        create(&mut state, &token, 2, Bytes::from_static(b"y"));
        assert!(destroy(&mut state, &token, 1));
        assert_eq!(get(&state, &token, 2), Some(Bytes::from_static(b"y")));
    }
}
