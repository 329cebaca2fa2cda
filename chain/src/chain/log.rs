use std::{collections::HashMap, sync::Arc};

use vela_common::crypto::Hash;

use crate::{block::Block, storage::ChangeSet, transaction::Transaction};

/// Ordered block log plus its lookup indexes. Each accepted block keeps
/// the change-set it was committed with, which is what a rewind undoes.
/// Heights are dense: the block at height h sits at index h.
pub(crate) struct BlockLog {
    blocks: Vec<(Arc<Block>, ChangeSet)>,
    heights: HashMap<Hash, u64>,
    // tx hash -> (containing block hash, transaction)
    transactions: HashMap<Hash, (Hash, Arc<dyn Transaction>)>,
}

impl BlockLog {
    pub fn new() -> Self {
        BlockLog {
            blocks: Vec::new(),
            heights: HashMap::new(),
            transactions: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn last_block(&self) -> Option<&Arc<Block>> {
        self.blocks.last().map(|(block, _)| block)
    }

    pub fn get_by_height(&self, height: u64) -> Option<&Arc<Block>> {
        self.blocks
            .get(height as usize)
            .map(|(block, _)| block)
    }

    pub fn get_by_hash(&self, hash: &Hash) -> Option<&Arc<Block>> {
        self.heights
            .get(hash)
            .and_then(|height| self.get_by_height(*height))
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.heights.contains_key(hash)
    }

    pub fn get_transaction(&self, hash: &Hash) -> Option<&Arc<dyn Transaction>> {
        self.transactions.get(hash).map(|(_, tx)| tx)
    }

    pub fn get_transaction_block(&self, hash: &Hash) -> Option<&Arc<Block>> {
        self.transactions
            .get(hash)
            .and_then(|(block_hash, _)| self.get_by_hash(block_hash))
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Arc<Block>> {
        self.blocks.iter().map(|(block, _)| block)
    }

    /// Append an accepted block together with its applied change-set.
    pub fn push(&mut self, block: Arc<Block>, changes: ChangeSet) {
        debug_assert_eq!(block.get_height(), self.blocks.len() as u64);
        self.heights.insert(*block.get_hash(), block.get_height());
        for tx in block.get_transactions() {
            self.transactions
                .insert(*tx.hash(), (*block.get_hash(), tx.clone()));
        }
        self.blocks.push((block, changes));
    }

    /// Drop the tip, returning it with its change-set for undoing.
    pub fn pop(&mut self) -> Option<(Arc<Block>, ChangeSet)> {
        let (block, changes) = self.blocks.pop()?;
        self.heights.remove(block.get_hash());
        for tx in block.get_transactions() {
            self.transactions.remove(tx.hash());
        }
        Some((block, changes))
    }
}
