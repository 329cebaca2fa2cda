use vela_common::crypto::Address;

use crate::block::Block;

/// Query/notify surface of the multi-chain registry. The engine only ever
/// asks whether a chain is registered and reports accepted blocks; the
/// registry itself lives outside the core and is injected per chain,
/// never reached through a process-wide singleton.
pub trait Nexus: Send + Sync {
    fn contains_chain(&self, chain: &Address) -> bool;

    /// Called after a block has been committed and is visible to readers.
    fn plugin_trigger_block(&self, chain: &Address, block: &Block);
}

/// Stand-in registry: accepts every chain, drops notifications.
pub struct NullNexus;

impl Nexus for NullNexus {
    fn contains_chain(&self, _chain: &Address) -> bool {
        true
    }

    fn plugin_trigger_block(&self, _chain: &Address, _block: &Block) {}
}
