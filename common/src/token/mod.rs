mod flags;

pub use flags::*;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::crypto::{hash, Hash};

/// Token contract consumed by the engine. The engine never inspects a
/// token's script or metadata; it only needs identity, capability flags,
/// the supply cap and a source of fresh non-fungible instance ids.
pub trait Token: Send + Sync {
    fn id(&self) -> &Hash;

    fn symbol(&self) -> &str;

    fn flags(&self) -> TokenFlags;

    /// Supply cap; only meaningful when the CAPPED flag is set.
    fn max_supply(&self) -> u64;

    /// Fresh instance identifier. Monotonic per token and never reused,
    /// including across chain rollbacks.
    fn generate_id(&self) -> u64;

    fn is_fungible(&self) -> bool {
        self.flags().contains(TokenFlag::FUNGIBLE)
    }

    fn is_capped(&self) -> bool {
        self.flags().contains(TokenFlag::CAPPED)
    }

    fn is_transferable(&self) -> bool {
        self.flags().contains(TokenFlag::TRANSFERABLE)
    }

    fn is_burnable(&self) -> bool {
        self.flags().contains(TokenFlag::BURNABLE)
    }
}

/// Standalone token definition, enough for collaborators that do not carry
/// their own token registry.
pub struct TokenDef {
    id: Hash,
    symbol: String,
    flags: TokenFlags,
    max_supply: u64,
    next_id: AtomicU64,
}

impl TokenDef {
    pub fn new(symbol: &str, flags: TokenFlags, max_supply: u64) -> Self {
        TokenDef {
            id: hash(symbol.as_bytes()),
            symbol: symbol.to_owned(),
            flags,
            max_supply,
            next_id: AtomicU64::new(0),
        }
    }

    /// Capped fungible token when a cap is given, uncapped otherwise.
    pub fn fungible(symbol: &str, max_supply: Option<u64>) -> Self {
        let mut flags = TokenFlags::default()
            .with(TokenFlag::FUNGIBLE)
            .with(TokenFlag::TRANSFERABLE)
            .with(TokenFlag::BURNABLE);
        if max_supply.is_some() {
            flags = flags.with(TokenFlag::CAPPED);
        }
        Self::new(symbol, flags, max_supply.unwrap_or(0))
    }

    pub fn non_fungible(symbol: &str) -> Self {
        let flags = TokenFlags::default().with(TokenFlag::TRANSFERABLE);
        Self::new(symbol, flags, 0)
    }
}

impl Token for TokenDef {
    fn id(&self) -> &Hash {
        &self.id
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn flags(&self) -> TokenFlags {
        self.flags
    }

    fn max_supply(&self) -> u64 {
        self.max_supply
    }

    fn generate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}
