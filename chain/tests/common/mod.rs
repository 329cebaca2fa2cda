// Shared fixtures for the end-to-end chain scenarios: a recording nexus,
// a scripted VM, an event collector and a handful of scripted
// transactions.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use bytes::Bytes;

use vela_chain::{
    block::Block,
    chain::Chain,
    contract::{ContractVm, VmStack, VmValue},
    nexus::Nexus,
    state::ApplyState,
    storage::{MemoryStorage, Storage},
    transaction::Transaction,
};
use vela_common::{
    crypto::{hash, Address, Hash},
    event::{ChainEvent, EventSink},
    token::{Token, TokenDef},
};

pub fn addr(tag: &str) -> Address {
    Address::from_hash(hash(tag.as_bytes()))
}

pub fn tag_hash(tag: &str) -> Hash {
    hash(tag.as_bytes())
}

/// Nexus stub that records plugin notifications. By default it accepts
/// every chain; `rejecting()` builds one that knows no chain at all, for
/// exercising the unknown-chain guard.
pub struct TestNexus {
    accept: bool,
    pub triggered: Mutex<Vec<(Address, Hash)>>,
}

impl TestNexus {
    pub fn new() -> Self {
        TestNexus {
            accept: true,
            triggered: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        TestNexus {
            accept: false,
            triggered: Mutex::new(Vec::new()),
        }
    }
}

impl Default for TestNexus {
    fn default() -> Self {
        Self::new()
    }
}

impl Nexus for TestNexus {
    fn contains_chain(&self, _chain: &Address) -> bool {
        self.accept
    }

    fn plugin_trigger_block(&self, chain: &Address, block: &Block) {
        self.triggered
            .lock()
            .unwrap()
            .push((*chain, *block.get_hash()));
    }
}

/// VM stub: "scripts" are the method name bytes, execution pushes a
/// canned value per method.
pub struct StubVm {
    pub results: Mutex<Vec<(String, VmValue)>>,
}

impl StubVm {
    pub fn returning(method: &str, value: VmValue) -> Self {
        StubVm {
            results: Mutex::new(vec![(method.to_owned(), value)]),
        }
    }
}

impl ContractVm for StubVm {
    fn build_call(&self, target: &Address, method: &str, _args: &[VmValue]) -> anyhow::Result<Bytes> {
        let mut script = target.as_bytes().to_vec();
        script.extend_from_slice(method.as_bytes());
        Ok(Bytes::from(script))
    }

    fn execute(&self, script: &[u8], _state: &mut ApplyState<'_>) -> anyhow::Result<VmStack> {
        let mut stack = VmStack::new();
        let results = self.results.lock().unwrap();
        for (method, value) in results.iter() {
            if script.ends_with(method.as_bytes()) {
                stack.push(value.clone());
                return Ok(stack);
            }
        }
        Err(anyhow!("unknown method"))
    }
}

/// Backend that stays observable from the outside: tests keep a handle on
/// the inner store and inspect raw KV state across reorgs.
#[derive(Clone, Default)]
pub struct SharedStorage {
    inner: Arc<Mutex<MemoryStorage>>,
}

impl SharedStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw_get(&self, key: &[u8]) -> Option<Bytes> {
        self.inner.lock().unwrap().get(key)
    }

    pub fn raw_len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

impl Storage for SharedStorage {
    fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.inner.lock().unwrap().get(key)
    }

    fn put(&mut self, key: Bytes, value: Bytes) {
        self.inner.lock().unwrap().put(key, value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.inner.lock().unwrap().delete(key);
    }

    fn contains(&self, key: &[u8]) -> bool {
        self.inner.lock().unwrap().contains(key)
    }
}

/// Sink collecting every emitted event.
#[derive(Default)]
pub struct CollectSink {
    pub events: Mutex<Vec<ChainEvent>>,
}

impl EventSink for CollectSink {
    fn notify(&self, event: ChainEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ===== Scripted transactions =====

pub struct MintTx {
    hash: Hash,
    token: Arc<TokenDef>,
    to: Address,
    amount: u64,
}

impl MintTx {
    pub fn new(tag: &str, token: Arc<TokenDef>, to: Address, amount: u64) -> Arc<dyn Transaction> {
        Arc::new(MintTx {
            hash: tag_hash(tag),
            token,
            to,
            amount,
        })
    }
}

impl Transaction for MintTx {
    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn is_valid(&self, _chain: &Chain) -> bool {
        self.amount > 0
    }

    fn execute(&self, state: &mut ApplyState<'_>, _block: &Block) -> bool {
        state
            .mint_tokens(self.token.as_ref(), &self.to, self.amount)
            .is_ok()
    }
}

pub struct TransferTx {
    hash: Hash,
    token: Arc<TokenDef>,
    from: Address,
    to: Address,
    amount: u64,
}

impl TransferTx {
    pub fn new(
        tag: &str,
        token: Arc<TokenDef>,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Arc<dyn Transaction> {
        Arc::new(TransferTx {
            hash: tag_hash(tag),
            token,
            from,
            to,
            amount,
        })
    }
}

impl Transaction for TransferTx {
    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn is_valid(&self, _chain: &Chain) -> bool {
        self.amount > 0
    }

    fn execute(&self, state: &mut ApplyState<'_>, _block: &Block) -> bool {
        state
            .transfer_tokens(self.token.as_ref(), &self.from, &self.to, self.amount)
            .is_ok()
    }
}

pub struct BurnTx {
    hash: Hash,
    token: Arc<TokenDef>,
    from: Address,
    amount: u64,
}

impl BurnTx {
    pub fn new(
        tag: &str,
        token: Arc<TokenDef>,
        from: Address,
        amount: u64,
    ) -> Arc<dyn Transaction> {
        Arc::new(BurnTx {
            hash: tag_hash(tag),
            token,
            from,
            amount,
        })
    }
}

impl Transaction for BurnTx {
    fn hash(&self) -> &Hash {
        &self.hash
    }

    // admission looks at committed state only
    fn is_valid(&self, chain: &Chain) -> bool {
        chain.get_token_balance(self.token.id(), &self.from) >= self.amount
    }

    fn execute(&self, state: &mut ApplyState<'_>, _block: &Block) -> bool {
        state
            .burn_tokens(self.token.as_ref(), &self.from, self.amount)
            .is_ok()
    }
}

/// Creates an NFT instance and hands it to `to` in one step.
pub struct CreateNftTx {
    hash: Hash,
    token: Arc<TokenDef>,
    to: Address,
    data: Bytes,
}

impl CreateNftTx {
    pub fn new(tag: &str, token: Arc<TokenDef>, to: Address, data: &'static [u8]) -> Arc<dyn Transaction> {
        Arc::new(CreateNftTx {
            hash: tag_hash(tag),
            token,
            to,
            data: Bytes::from_static(data),
        })
    }
}

impl Transaction for CreateNftTx {
    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn is_valid(&self, _chain: &Chain) -> bool {
        true
    }

    fn execute(&self, state: &mut ApplyState<'_>, _block: &Block) -> bool {
        let id = match state.create_nft(self.token.as_ref(), self.data.clone()) {
            Ok(id) => id,
            Err(_) => return false,
        };
        state.give_token(self.token.as_ref(), &self.to, id).is_ok()
    }
}

/// Hands an already-created NFT instance to `to`.
pub struct GiveNftTx {
    hash: Hash,
    token: Arc<TokenDef>,
    to: Address,
    id: u64,
}

impl GiveNftTx {
    pub fn new(tag: &str, token: Arc<TokenDef>, to: Address, id: u64) -> Arc<dyn Transaction> {
        Arc::new(GiveNftTx {
            hash: tag_hash(tag),
            token,
            to,
            id,
        })
    }
}

impl Transaction for GiveNftTx {
    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn is_valid(&self, _chain: &Chain) -> bool {
        true
    }

    fn execute(&self, state: &mut ApplyState<'_>, _block: &Block) -> bool {
        state
            .give_token(self.token.as_ref(), &self.to, self.id)
            .is_ok()
    }
}

/// Moves an NFT instance from its current owner to `to`.
pub struct MoveNftTx {
    hash: Hash,
    token: Arc<TokenDef>,
    from: Address,
    to: Address,
    id: u64,
}

impl MoveNftTx {
    pub fn new(
        tag: &str,
        token: Arc<TokenDef>,
        from: Address,
        to: Address,
        id: u64,
    ) -> Arc<dyn Transaction> {
        Arc::new(MoveNftTx {
            hash: tag_hash(tag),
            token,
            from,
            to,
            id,
        })
    }
}

impl Transaction for MoveNftTx {
    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn is_valid(&self, _chain: &Chain) -> bool {
        true
    }

    fn execute(&self, state: &mut ApplyState<'_>, _block: &Block) -> bool {
        if state.owner_of(self.token.id(), self.id) != Some(self.from.clone()) {
            return false;
        }
        if state
            .take_token(self.token.as_ref(), &self.from, self.id)
            .is_err()
        {
            return false;
        }
        state.give_token(self.token.as_ref(), &self.to, self.id).is_ok()
    }
}

/// Writes one raw KV entry through the staged state.
pub struct PutTx {
    hash: Hash,
    key: Bytes,
    value: Bytes,
}

impl PutTx {
    pub fn new(tag: &str, key: &'static [u8], value: &'static [u8]) -> Arc<dyn Transaction> {
        Arc::new(PutTx {
            hash: tag_hash(tag),
            key: Bytes::from_static(key),
            value: Bytes::from_static(value),
        })
    }
}

impl Transaction for PutTx {
    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn is_valid(&self, _chain: &Chain) -> bool {
        true
    }

    fn execute(&self, state: &mut ApplyState<'_>, _block: &Block) -> bool {
        use vela_chain::state::StateAccess;
        state.write(self.key.clone(), self.value.clone());
        true
    }
}

/// Passes validation, fails execution.
pub struct FailingTx {
    hash: Hash,
}

impl FailingTx {
    pub fn new(tag: &str) -> Arc<dyn Transaction> {
        Arc::new(FailingTx {
            hash: tag_hash(tag),
        })
    }
}

impl Transaction for FailingTx {
    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn is_valid(&self, _chain: &Chain) -> bool {
        true
    }

    fn execute(&self, _state: &mut ApplyState<'_>, _block: &Block) -> bool {
        false
    }
}

/// Fails validation outright.
pub struct InvalidTx {
    hash: Hash,
}

impl InvalidTx {
    pub fn new(tag: &str) -> Arc<dyn Transaction> {
        Arc::new(InvalidTx {
            hash: tag_hash(tag),
        })
    }
}

impl Transaction for InvalidTx {
    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn is_valid(&self, _chain: &Chain) -> bool {
        false
    }

    fn execute(&self, _state: &mut ApplyState<'_>, _block: &Block) -> bool {
        true
    }
}

// ===== Builders =====

/// Block whose hash is derived from the tag, linked on top of `previous`.
pub fn make_block(
    height: u64,
    previous: &Hash,
    tag: &str,
    transactions: Vec<Arc<dyn Transaction>>,
) -> Arc<Block> {
    Arc::new(Block::new(
        height,
        tag_hash(tag),
        previous.clone(),
        transactions,
    ))
}

pub fn make_block_with_sink(
    height: u64,
    previous: &Hash,
    tag: &str,
    transactions: Vec<Arc<dyn Transaction>>,
    sink: Arc<dyn EventSink>,
) -> Arc<Block> {
    Arc::new(Block::with_notify(
        height,
        tag_hash(tag),
        previous.clone(),
        transactions,
        sink,
    ))
}

/// Root chain named `main` with a stub VM answering `get_version`.
pub fn make_root_chain() -> Arc<Chain> {
    let nexus = Arc::new(TestNexus::default());
    let vm = Arc::new(StubVm::returning("get_version", VmValue::Number(3)));
    Chain::new(nexus, vm, "main", addr("owner"), addr("main_contract")).unwrap()
}

/// Same root chain, over a backend the test keeps a handle on.
pub fn make_root_chain_over(storage: SharedStorage) -> Arc<Chain> {
    let nexus = Arc::new(TestNexus::default());
    let vm = Arc::new(StubVm::returning("get_version", VmValue::Number(3)));
    Chain::with_storage(
        nexus,
        vm,
        "main",
        addr("owner"),
        addr("main_contract"),
        Box::new(storage),
    )
    .unwrap()
}
