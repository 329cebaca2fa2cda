// Chain name rules
// A chain name is part of the chain identity: its address is the hash of
// the (lowercase) name, and children are registered under it in the parent.
pub const CHAIN_NAME_MIN_LENGTH: usize = 3;
// Exclusive upper bound: valid names are 3 to 19 characters
pub const CHAIN_NAME_MAX_LENGTH: usize = 20;

// Root chains have no parent and start their block log at this height
pub const GENESIS_HEIGHT: u64 = 0;
