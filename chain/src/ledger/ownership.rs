use std::collections::BTreeSet;

use bytes::Bytes;

use vela_common::{
    crypto::{Address, Hash},
    error::LedgerError,
    serializer::Serializer,
};

use crate::{
    state::{StateAccess, StateReader},
    storage::keys,
};

use super::decode;

/// Instance ids owned by `address` in `token`.
pub fn get<S: StateReader + ?Sized>(state: &S, token: &Hash, address: &Address) -> BTreeSet<u64> {
    state
        .read(&keys::ownership(token, address))
        .and_then(|bytes| decode(&bytes, "ownership"))
        .unwrap_or_default()
}

/// Current owner of instance `id` in `token`, if any.
pub fn owner_of<S: StateReader + ?Sized>(state: &S, token: &Hash, id: u64) -> Option<Address> {
    state
        .read(&keys::owner_of(token, id))
        .and_then(|bytes| decode(&bytes, "owner index"))
}

/// Assign `id` to `address`. The forward set and the reverse index are
/// written in the same operation, so they never diverge.
pub fn give<S: StateAccess + ?Sized>(
    state: &mut S,
    token: &Hash,
    address: &Address,
    id: u64,
) -> Result<(), LedgerError> {
    if owner_of(state, token, id).is_some() {
        return Err(LedgerError::AlreadyOwned(id));
    }
    let mut owned = get(state, token, address);
    owned.insert(id);
    state.write(
        keys::ownership(token, address),
        Bytes::from(owned.to_bytes()),
    );
    state.write(keys::owner_of(token, id), Bytes::from(address.to_bytes()));
    Ok(())
}

/// Remove `id` from `address`. Fails unless `address` is the current
/// owner.
pub fn take<S: StateAccess + ?Sized>(
    state: &mut S,
    token: &Hash,
    address: &Address,
    id: u64,
) -> Result<(), LedgerError> {
    match owner_of(state, token, id) {
        Some(owner) if owner == *address => {}
        _ => return Err(LedgerError::NotOwner(id)),
    }
    let mut owned = get(state, token, address);
    owned.remove(&id);
    let key = keys::ownership(token, address);
    if owned.is_empty() {
        state.remove(&key);
    } else {
        state.write(key, Bytes::from(owned.to_bytes()));
    }
    state.remove(&keys::owner_of(token, id));
    Ok(())
}
