mod log;
mod name;
mod reorg;

pub use name::is_valid_name;
pub use reorg::MergeEntry;

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak},
};

use bytes::Bytes;
use indexmap::IndexMap;

use vela_common::{
    config::GENESIS_HEIGHT,
    crypto::{hash, Address, Hash},
    error::LedgerError,
    event::NullSink,
    token::Token,
};

use crate::{
    block::Block,
    contract::{ContractVm, VmValue},
    error::ChainError,
    ledger::{self, supply::SupplyData},
    nexus::Nexus,
    state::{ApplyState, DirectState, StoreView},
    storage::{ChangeSet, MemoryStorage, Storage},
    transaction::Transaction,
};

use self::log::BlockLog;

// Everything a write-lock snapshot covers: the KV state and the block log
// move together, so commits and rewinds are all-or-nothing for readers.
struct ChainStore {
    storage: Box<dyn Storage>,
    log: BlockLog,
}

struct ParentLink {
    chain: Weak<Chain>,
    block: Hash,
}

/// One ledger in the chain tree. A chain owns its state store, block log
/// and token sheets; a parent owns its children, children keep weak
/// back-references. Identity (name, address, owner, parent linkage) is
/// fixed at construction.
pub struct Chain {
    name: String,
    address: Address,
    owner: Address,
    // target address for call scripts built by invoke_contract
    contract: Address,
    parent: Option<ParentLink>,
    nexus: Arc<dyn Nexus>,
    vm: Arc<dyn ContractVm>,
    // serializes block ingestion; readers go through `store` only
    ingest: Mutex<()>,
    store: RwLock<ChainStore>,
    children: RwLock<IndexMap<String, Arc<Chain>>>,
}

impl Chain {
    /// Root chain over the default in-memory backend.
    pub fn new(
        nexus: Arc<dyn Nexus>,
        vm: Arc<dyn ContractVm>,
        name: &str,
        owner: Address,
        contract: Address,
    ) -> Result<Arc<Chain>, ChainError> {
        Self::with_storage(nexus, vm, name, owner, contract, Box::new(MemoryStorage::new()))
    }

    /// Root chain over a caller-provided backend.
    pub fn with_storage(
        nexus: Arc<dyn Nexus>,
        vm: Arc<dyn ContractVm>,
        name: &str,
        owner: Address,
        contract: Address,
        storage: Box<dyn Storage>,
    ) -> Result<Arc<Chain>, ChainError> {
        Self::build(nexus, vm, name, owner, contract, None, storage)
    }

    /// Child chain anchored at `parent_block`, registered in the parent
    /// under its name. The nexus and VM handles are inherited.
    pub fn new_child(
        parent: &Arc<Chain>,
        name: &str,
        owner: Address,
        contract: Address,
        parent_block: &Hash,
    ) -> Result<Arc<Chain>, ChainError> {
        if !parent.contains_block(parent_block) {
            return Err(ChainError::ParentBlockNotFound(*parent_block));
        }
        // hold the children lock across the uniqueness check and insert
        let mut children = parent.children_write();
        if children.contains_key(name) {
            return Err(ChainError::DuplicateChild(name.to_owned()));
        }
        let link = ParentLink {
            chain: Arc::downgrade(parent),
            block: *parent_block,
        };
        let chain = Self::build(
            parent.nexus.clone(),
            parent.vm.clone(),
            name,
            owner,
            contract,
            Some(link),
            Box::new(MemoryStorage::new()),
        )?;
        children.insert(name.to_owned(), chain.clone());
        debug!("child chain {} registered under {}", name, parent.name);
        Ok(chain)
    }

    fn build(
        nexus: Arc<dyn Nexus>,
        vm: Arc<dyn ContractVm>,
        name: &str,
        owner: Address,
        contract: Address,
        parent: Option<ParentLink>,
        storage: Box<dyn Storage>,
    ) -> Result<Arc<Chain>, ChainError> {
        if !is_valid_name(name) {
            return Err(ChainError::InvalidName(name.to_owned()));
        }
        if owner.is_null() {
            return Err(ChainError::NullAddress);
        }
        Ok(Arc::new(Chain {
            name: name.to_owned(),
            address: Address::from_hash(hash(name.as_bytes())),
            owner,
            contract,
            parent,
            nexus,
            vm,
            ingest: Mutex::new(()),
            store: RwLock::new(ChainStore {
                storage,
                log: BlockLog::new(),
            }),
            children: RwLock::new(IndexMap::new()),
        }))
    }

    // ===== Identity =====

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_address(&self) -> &Address {
        &self.address
    }

    pub fn get_owner(&self) -> &Address {
        &self.owner
    }

    pub fn get_contract(&self) -> &Address {
        &self.contract
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn get_parent(&self) -> Option<Arc<Chain>> {
        self.parent.as_ref().and_then(|link| link.chain.upgrade())
    }

    /// Hash of the parent block this chain is anchored at.
    pub fn get_parent_block(&self) -> Option<&Hash> {
        self.parent.as_ref().map(|link| &link.block)
    }

    // ===== Chain tree =====

    pub fn get_child(&self, name: &str) -> Option<Arc<Chain>> {
        self.children_read().get(name).cloned()
    }

    pub fn get_children(&self) -> Vec<Arc<Chain>> {
        self.children_read().values().cloned().collect()
    }

    /// Depth-first search over this subtree (self included), first match
    /// wins.
    pub fn find_child_chain(
        self: &Arc<Self>,
        address: &Address,
    ) -> Result<Option<Arc<Chain>>, ChainError> {
        if address.is_null() {
            return Err(ChainError::NullAddress);
        }
        Ok(self.find_child_inner(address))
    }

    fn find_child_inner(self: &Arc<Self>, address: &Address) -> Option<Arc<Chain>> {
        if self.address == *address {
            return Some(self.clone());
        }
        let children = self.children_read();
        for child in children.values() {
            if let Some(found) = child.find_child_inner(address) {
                return Some(found);
            }
        }
        None
    }

    /// Follow parent links to the chain with no parent.
    pub fn get_root(self: &Arc<Self>) -> Arc<Chain> {
        let mut current = self.clone();
        while let Some(parent) = current.get_parent() {
            current = parent;
        }
        current
    }

    // ===== Block log queries =====

    pub fn block_height(&self) -> u64 {
        self.store_read().log.len() as u64
    }

    pub fn last_block(&self) -> Option<Arc<Block>> {
        self.store_read().log.last_block().cloned()
    }

    pub fn contains_block(&self, hash: &Hash) -> bool {
        self.store_read().log.contains(hash)
    }

    pub fn find_block_by_hash(&self, hash: &Hash) -> Option<Arc<Block>> {
        self.store_read().log.get_by_hash(hash).cloned()
    }

    pub fn find_block_by_height(&self, height: u64) -> Option<Arc<Block>> {
        self.store_read().log.get_by_height(height).cloned()
    }

    pub fn find_transaction_by_hash(&self, hash: &Hash) -> Option<Arc<dyn Transaction>> {
        self.store_read().log.get_transaction(hash).cloned()
    }

    pub fn find_transaction_block(&self, tx: &dyn Transaction) -> Option<Arc<Block>> {
        self.store_read().log.get_transaction_block(tx.hash()).cloned()
    }

    /// Snapshot of the block log in height order.
    pub fn get_blocks(&self) -> Vec<Arc<Block>> {
        self.store_read().log.blocks().cloned().collect()
    }

    pub fn transaction_count(&self) -> usize {
        self.store_read().log.transaction_count()
    }

    // ===== Ledger queries (committed state) =====

    pub fn get_token_balance(&self, token: &Hash, address: &Address) -> u64 {
        let store = self.store_read();
        ledger::balance::get(&StoreView::new(store.storage.as_ref()), token, address)
    }

    pub fn get_owned_tokens(&self, token: &Hash, address: &Address) -> BTreeSet<u64> {
        let store = self.store_read();
        ledger::ownership::get(&StoreView::new(store.storage.as_ref()), token, address)
    }

    pub fn get_nft(&self, token: &Hash, id: u64) -> Option<Bytes> {
        let store = self.store_read();
        ledger::nft::get(&StoreView::new(store.storage.as_ref()), token, id)
    }

    pub fn get_supply(&self, token: &Hash) -> Option<SupplyData> {
        let store = self.store_read();
        ledger::supply::get(&StoreView::new(store.storage.as_ref()), token)
    }

    // ===== Mutations =====

    /// Validate, execute and commit a block on top of the current tip.
    /// Linkage, validation and execution failures reject the block with
    /// `Ok(false)` and leave the chain untouched; `Err` is reserved for
    /// invariant and argument violations.
    pub fn add_block(&self, block: Arc<Block>) -> Result<bool, ChainError> {
        if !self.nexus.contains_chain(&self.address) {
            return Err(ChainError::UnknownChain(self.address));
        }
        let _guard = self.ingest_lock();
        self.add_block_unlocked(block)
    }

    fn add_block_unlocked(&self, block: Arc<Block>) -> Result<bool, ChainError> {
        // 1. linkage against the current tip; an empty chain only accepts
        // a genesis at height 0
        {
            let store = self.store_read();
            match store.log.last_block() {
                Some(last) => {
                    if block.get_height() != last.get_height() + 1 {
                        warn!(
                            "block {} rejected: height {} does not extend tip {}",
                            block.get_hash(),
                            block.get_height(),
                            last.get_height()
                        );
                        return Ok(false);
                    }
                    if block.get_previous_hash() != last.get_hash() {
                        warn!(
                            "block {} rejected: previous hash {} does not match tip {}",
                            block.get_hash(),
                            block.get_previous_hash(),
                            last.get_hash()
                        );
                        return Ok(false);
                    }
                }
                None => {
                    if block.get_height() != GENESIS_HEIGHT {
                        warn!(
                            "block {} rejected: genesis must start at height {}",
                            block.get_hash(),
                            GENESIS_HEIGHT
                        );
                        return Ok(false);
                    }
                }
            }
        }

        // 2. every transaction must admit itself before anything executes
        for tx in block.get_transactions() {
            if !tx.is_valid(self) {
                debug!(
                    "block {} rejected: transaction {} failed validation",
                    block.get_hash(),
                    tx.hash()
                );
                return Ok(false);
            }
        }

        // 3-4. execute against a fresh change-set; a failure drops the
        // change-set unapplied, so nothing leaks
        let mut changes = ChangeSet::new();
        {
            let sink = block.get_notify().clone();
            let mut state = ApplyState::new(self, &mut changes, sink.as_ref());
            for tx in block.get_transactions() {
                if !tx.execute(&mut state, &block) {
                    debug!(
                        "block {} rejected: transaction {} failed to execute",
                        block.get_hash(),
                        tx.hash()
                    );
                    return Ok(false);
                }
            }
        }

        // 5. commit under the write lock: the block's mutations and its
        // index entries become visible together
        {
            let mut store = self.store_write();
            let ChainStore { storage, log } = &mut *store;
            changes.apply(storage.as_mut())?;
            log.push(block.clone(), changes);
        }
        debug!(
            "block {} accepted at height {} with {} txs",
            block.get_hash(),
            block.get_height(),
            block.get_txs_count()
        );
        self.nexus.plugin_trigger_block(&self.address, &block);
        Ok(true)
    }

    /// Create the supply sheet for a capped token. Explicit creation is a
    /// root-chain operation; child sheets materialize lazily by borrowing.
    /// A sheet that already exists is left untouched.
    pub fn init_supply_sheet(&self, token: &dyn Token) -> Result<(), ChainError> {
        if !self.is_root() {
            return Err(ChainError::NotRoot);
        }
        if !token.is_capped() {
            return Err(LedgerError::NotCapped(token.symbol().to_owned()).into());
        }
        let mut store = self.store_write();
        let ChainStore { storage, .. } = &mut *store;
        let mut state = DirectState::new(storage.as_mut());
        if ledger::supply::get(&state, token.id()).is_none() {
            ledger::supply::init(
                &mut state,
                token.id(),
                &SupplyData::new_root(token.max_supply()),
            );
            debug!("supply sheet for {} created on {}", token.symbol(), self.name);
        }
        Ok(())
    }

    /// Out-of-band NFT content registration, bypassing the block path.
    /// Content created while a block executes goes through the staged
    /// state instead, so it stays reversible.
    pub fn create_nft(&self, token: &dyn Token, data: Bytes) -> Result<u64, ChainError> {
        if token.is_fungible() {
            return Err(LedgerError::NotNonFungible(token.symbol().to_owned()).into());
        }
        let id = token.generate_id();
        let mut store = self.store_write();
        let ChainStore { storage, .. } = &mut *store;
        let mut state = DirectState::new(storage.as_mut());
        ledger::nft::create(&mut state, token.id(), id, data);
        Ok(id)
    }

    /// Out-of-band NFT content removal. Returns whether an entry was
    /// removed.
    pub fn destroy_nft(&self, token: &dyn Token, id: u64) -> Result<bool, ChainError> {
        if token.is_fungible() {
            return Err(LedgerError::NotNonFungible(token.symbol().to_owned()).into());
        }
        let mut store = self.store_write();
        let ChainStore { storage, .. } = &mut *store;
        let mut state = DirectState::new(storage.as_mut());
        Ok(ledger::nft::destroy(&mut state, token.id(), id))
    }

    /// Synchronous read-only contract call: build a call script against
    /// the bound contract, run it over a throwaway change-set and return
    /// the top of the result stack. The change-set is dropped unapplied.
    pub fn invoke_contract(&self, method: &str, args: &[VmValue]) -> Result<VmValue, ChainError> {
        let script = self.vm.build_call(&self.contract, method, args)?;
        let mut changes = ChangeSet::new();
        let sink = NullSink;
        let mut state = ApplyState::new(self, &mut changes, &sink);
        let mut stack = self.vm.execute(&script, &mut state)?;
        stack.pop().ok_or(ChainError::EmptyVmStack)
    }

    // ===== Internal =====

    pub(crate) fn read_storage(&self, key: &[u8]) -> Option<Bytes> {
        self.store_read().storage.get(key)
    }

    fn ingest_lock(&self) -> MutexGuard<'_, ()> {
        self.ingest.lock().expect("chain ingest lock poisoned")
    }

    fn store_read(&self) -> RwLockReadGuard<'_, ChainStore> {
        self.store.read().expect("chain store lock poisoned")
    }

    fn store_write(&self) -> RwLockWriteGuard<'_, ChainStore> {
        self.store.write().expect("chain store lock poisoned")
    }

    fn children_read(&self) -> RwLockReadGuard<'_, IndexMap<String, Arc<Chain>>> {
        self.children.read().expect("chain children lock poisoned")
    }

    fn children_write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Arc<Chain>>> {
        self.children.write().expect("chain children lock poisoned")
    }
}
