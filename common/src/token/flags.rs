// Token capability flags - u8 bitmask
// A token is fungible XOR non-fungible: the FUNGIBLE bit decides, the
// remaining bits qualify what the engine lets the token do.

use serde::{Deserialize, Serialize};

#[allow(non_snake_case)]
pub mod TokenFlag {
    /// Balances are divisible amounts; without it the token is an NFT
    pub const FUNGIBLE: u8 = 1 << 0; // 1

    /// Supply is bounded by max_supply and tracked by a supply sheet
    pub const CAPPED: u8 = 1 << 1; // 2

    /// Holders may move balances between accounts
    pub const TRANSFERABLE: u8 = 1 << 2; // 4

    /// Circulating supply may be reduced
    pub const BURNABLE: u8 = 1 << 3; // 8
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct TokenFlags(u8);

impl TokenFlags {
    pub const fn new(bits: u8) -> Self {
        TokenFlags(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn contains(&self, flag: u8) -> bool {
        self.0 & flag == flag
    }

    pub const fn with(self, flag: u8) -> Self {
        TokenFlags(self.0 | flag)
    }
}
