use std::{
    fmt::{Display, Error, Formatter},
    sync::Arc,
};

use vela_common::{
    crypto::Hash,
    event::{EventSink, NullSink},
};

use crate::transaction::Transaction;

/// Immutable batch of transactions with height and hash linkage. The
/// attached sink receives every event produced while the block executes.
pub struct Block {
    height: u64,
    hash: Hash,
    previous_hash: Hash,
    transactions: Vec<Arc<dyn Transaction>>,
    notify: Arc<dyn EventSink>,
}

impl Block {
    pub fn new(
        height: u64,
        hash: Hash,
        previous_hash: Hash,
        transactions: Vec<Arc<dyn Transaction>>,
    ) -> Self {
        Self::with_notify(height, hash, previous_hash, transactions, Arc::new(NullSink))
    }

    pub fn with_notify(
        height: u64,
        hash: Hash,
        previous_hash: Hash,
        transactions: Vec<Arc<dyn Transaction>>,
        notify: Arc<dyn EventSink>,
    ) -> Self {
        Block {
            height,
            hash,
            previous_hash,
            transactions,
            notify,
        }
    }

    pub fn get_height(&self) -> u64 {
        self.height
    }

    pub fn get_hash(&self) -> &Hash {
        &self.hash
    }

    pub fn get_previous_hash(&self) -> &Hash {
        &self.previous_hash
    }

    pub fn get_transactions(&self) -> &Vec<Arc<dyn Transaction>> {
        &self.transactions
    }

    pub fn get_txs_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn get_notify(&self) -> &Arc<dyn EventSink> {
        &self.notify
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(
            f,
            "Block[height: {}, hash: {}, previous: {}, txs: {}]",
            self.height,
            self.hash,
            self.previous_hash,
            self.transactions.len()
        )
    }
}
