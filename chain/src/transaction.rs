use vela_common::crypto::Hash;

use crate::{block::Block, chain::Chain, state::ApplyState};

/// Opaque script executor. The engine never looks inside a transaction:
/// it asks whether the transaction admits itself against committed chain
/// state, then lets it mutate the staged state of the block being applied.
/// Ordering within a block is significant and preserved.
pub trait Transaction: Send + Sync {
    /// Stable content hash, usable as a map key for the whole lifetime of
    /// the transaction.
    fn hash(&self) -> &Hash;

    /// Admission check against committed chain state. A false vote rejects
    /// the containing block before anything executes.
    fn is_valid(&self, chain: &Chain) -> bool;

    /// Apply effects through the staged state. Every mutation goes through
    /// the block change-set carried by `state`, so a later rollback of the
    /// block reverses all of them. Returning false discards the whole
    /// block without mutation.
    fn execute(&self, state: &mut ApplyState<'_>, block: &Block) -> bool;
}
