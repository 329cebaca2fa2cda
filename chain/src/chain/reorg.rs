// Chain reorganization: rewinding a suffix of blocks by undoing their
// change-sets, and merging a longer remote run by rewinding past the fork
// point and re-executing the remote blocks locally.

use std::sync::Arc;

use vela_common::crypto::Hash;

use crate::{block::Block, error::ChainError, storage::ChangeSet};

use super::{Chain, ChainStore};

/// One block of a merge batch, paired with the change-set the sender
/// committed it with. The engine never trusts the supplied change-set:
/// merged blocks are re-validated and re-executed locally.
pub struct MergeEntry {
    pub block: Arc<Block>,
    pub changes: ChangeSet,
}

impl MergeEntry {
    pub fn new(block: Arc<Block>, changes: ChangeSet) -> Self {
        MergeEntry { block, changes }
    }
}

impl Chain {
    /// Rewind the chain until `target` is the tip. Every undone block has
    /// its change-set reversed, so balances, ownerships, supplies and raw
    /// KV state all step back with the log. The target itself is kept;
    /// deleting up to the current tip is a no-op.
    pub fn delete_blocks(&self, target: &Hash) -> Result<(), ChainError> {
        let _guard = self.ingest_lock();
        self.delete_blocks_unlocked(target)
    }

    pub(super) fn delete_blocks_unlocked(&self, target: &Hash) -> Result<(), ChainError> {
        if !self.contains_block(target) {
            return Err(ChainError::BlockNotFound(*target));
        }
        let mut removed = 0u64;
        loop {
            let mut store = self.store_write();
            match store.log.last_block() {
                Some(tip) if tip.get_hash() == target => break,
                Some(_) => {}
                None => break,
            }
            let ChainStore { storage, log } = &mut *store;
            if let Some((block, mut changes)) = log.pop() {
                // undo ordering is the reverse of commit ordering
                changes.undo(storage.as_mut())?;
                debug!(
                    "block {} at height {} rewound",
                    block.get_hash(),
                    block.get_height()
                );
                removed += 1;
            }
        }
        if removed > 0 {
            warn!("blocks rewound: {}, new tip: {}", removed, target);
        }
        Ok(())
    }

    /// Merge a remote run of consecutive blocks. The run must reach
    /// strictly beyond the local tip (`Ok(false)` otherwise). Where the
    /// run agrees with the local log it is skipped; at the first
    /// divergence the local chain rewinds past the fork point and the
    /// rest of the run goes through the regular add path.
    pub fn merge_blocks(&self, entries: Vec<MergeEntry>) -> Result<bool, ChainError> {
        if !self.nexus.contains_chain(&self.address) {
            return Err(ChainError::UnknownChain(self.address));
        }
        let _guard = self.ingest_lock();

        if entries.is_empty() {
            return Err(ChainError::EmptyMerge);
        }
        let first_height = entries[0].block.get_height();
        for (offset, entry) in entries.iter().enumerate() {
            if entry.block.get_height() != first_height + offset as u64 {
                return Err(ChainError::BrokenMergeSequence);
            }
        }
        if first_height + entries.len() as u64 <= self.block_height() {
            debug!(
                "merge of {} blocks from height {} is too short for a chain of {} blocks",
                entries.len(),
                first_height,
                self.block_height()
            );
            return Ok(false);
        }

        let mut index = 0;
        while index < entries.len() {
            let block = &entries[index].block;
            match self.find_block_by_height(block.get_height()) {
                Some(local) if local.get_hash() == block.get_hash() => {
                    // prefix agreement, the local block stands
                    index += 1;
                }
                Some(local) => {
                    warn!(
                        "divergence at height {}: local {}, remote {}",
                        block.get_height(),
                        local.get_hash(),
                        block.get_hash()
                    );
                    if block.get_height() == 0 {
                        // divergent genesis: the whole log goes
                        self.reset_unlocked()?;
                    } else {
                        self.delete_blocks_unlocked(local.get_previous_hash())?;
                    }
                    // resume from the same entry, now beyond the tip
                }
                None => {
                    if !self.add_block_unlocked(block.clone())? {
                        return Err(ChainError::MergeBlockRejected(*block.get_hash()));
                    }
                    index += 1;
                }
            }
        }
        Ok(true)
    }

    fn reset_unlocked(&self) -> Result<(), ChainError> {
        loop {
            let mut store = self.store_write();
            let ChainStore { storage, log } = &mut *store;
            match log.pop() {
                Some((block, mut changes)) => {
                    changes.undo(storage.as_mut())?;
                    debug!(
                        "block {} at height {} rewound",
                        block.get_hash(),
                        block.get_height()
                    );
                }
                None => return Ok(()),
            }
        }
    }
}
