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

/// Balance of `address` in `token`; an absent entry means zero.
pub fn get<S: StateReader + ?Sized>(state: &S, token: &Hash, address: &Address) -> u64 {
    state
        .read(&keys::balance(token, address))
        .and_then(|bytes| decode(&bytes, "balance"))
        .unwrap_or(0)
}

pub fn add<S: StateAccess + ?Sized>(
    state: &mut S,
    token: &Hash,
    address: &Address,
    amount: u64,
) -> Result<(), LedgerError> {
    let current = get(state, token, address);
    let updated = current.checked_add(amount).ok_or(LedgerError::Overflow)?;
    state.write(
        keys::balance(token, address),
        Bytes::from(updated.to_bytes()),
    );
    Ok(())
}

pub fn subtract<S: StateAccess + ?Sized>(
    state: &mut S,
    token: &Hash,
    address: &Address,
    amount: u64,
) -> Result<(), LedgerError> {
    let current = get(state, token, address);
    if current < amount {
        return Err(LedgerError::Insufficient {
            need: amount,
            have: current,
        });
    }
    let updated = current - amount;
    let key = keys::balance(token, address);
    if updated == 0 {
        // absent key means zero
        state.remove(&key);
    } else {
        state.write(key, Bytes::from(updated.to_bytes()));
    }
    Ok(())
}
