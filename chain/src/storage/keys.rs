// Key namespaces for the per-chain state store, one byte-prefix per
// concern. All ledger entries for a token live under its token hash so a
// chain's sheets never collide.

use bytes::Bytes;
use vela_common::crypto::{Address, Hash};

const BALANCE: &[u8] = b"bal:";
const OWNERSHIP: &[u8] = b"own:";
const OWNER_OF: &[u8] = b"owr:";
const SUPPLY: &[u8] = b"sup:";
const NFT_CONTENT: &[u8] = b"nft:";

fn build(prefix: &[u8], parts: &[&[u8]]) -> Bytes {
    let total = prefix.len() + parts.iter().map(|part| part.len()).sum::<usize>();
    let mut key = Vec::with_capacity(total);
    key.extend_from_slice(prefix);
    for part in parts {
        key.extend_from_slice(part);
    }
    Bytes::from(key)
}

/// Fungible balance of `address` in `token`.
pub fn balance(token: &Hash, address: &Address) -> Bytes {
    build(BALANCE, &[token.as_bytes(), address.as_bytes()])
}

/// Set of non-fungible instance ids owned by `address` in `token`.
pub fn ownership(token: &Hash, address: &Address) -> Bytes {
    build(OWNERSHIP, &[token.as_bytes(), address.as_bytes()])
}

/// Reverse index: current owner of instance `id` in `token`.
pub fn owner_of(token: &Hash, id: u64) -> Bytes {
    build(OWNER_OF, &[token.as_bytes(), &id.to_be_bytes()])
}

/// Capped-supply sheet of `token`.
pub fn supply(token: &Hash) -> Bytes {
    build(SUPPLY, &[token.as_bytes()])
}

/// Content payload of instance `id` in `token`.
pub fn nft_content(token: &Hash, id: u64) -> Bytes {
    build(NFT_CONTENT, &[token.as_bytes(), &id.to_be_bytes()])
}
