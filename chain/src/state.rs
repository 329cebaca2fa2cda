use std::collections::BTreeSet;

use bytes::Bytes;

use vela_common::{
    crypto::{Address, Hash},
    error::LedgerError,
    event::{ChainEvent, EventKind, EventSink},
    serializer::{Serializer, Writer},
    token::Token,
};

use crate::{
    chain::Chain,
    error::ChainError,
    ledger::{self, supply::SupplyData},
    storage::{ChangeSet, Storage},
};

/// Read surface over a chain state store.
pub trait StateReader {
    fn read(&self, key: &[u8]) -> Option<Bytes>;

    fn has(&self, key: &[u8]) -> bool {
        self.read(key).is_some()
    }
}

/// Read/write surface. Implemented by the direct store view (intra-engine
/// use) and by the staged view that backs transaction execution.
pub trait StateAccess: StateReader {
    fn write(&mut self, key: Bytes, value: Bytes);

    fn remove(&mut self, key: &[u8]);
}

/// Read-only view over a backing store.
pub struct StoreView<'a> {
    store: &'a dyn Storage,
}

impl<'a> StoreView<'a> {
    pub fn new(store: &'a dyn Storage) -> Self {
        StoreView { store }
    }
}

impl StateReader for StoreView<'_> {
    fn read(&self, key: &[u8]) -> Option<Bytes> {
        self.store.get(key)
    }
}

/// Unstaged view, mutating the backing store in place. Reserved for
/// intra-engine paths such as explicit sheet initialization; block
/// execution never sees one.
pub struct DirectState<'a> {
    store: &'a mut dyn Storage,
}

impl<'a> DirectState<'a> {
    pub fn new(store: &'a mut dyn Storage) -> Self {
        DirectState { store }
    }
}

impl StateReader for DirectState<'_> {
    fn read(&self, key: &[u8]) -> Option<Bytes> {
        self.store.get(key)
    }
}

impl StateAccess for DirectState<'_> {
    fn write(&mut self, key: Bytes, value: Bytes) {
        self.store.put(key, value);
    }

    fn remove(&mut self, key: &[u8]) {
        self.store.delete(key);
    }
}

/// Execution context handed to transactions while their block is applied.
/// Reads see committed chain state overlaid with the block's staged
/// changes; every write lands in the change-set, which is what makes the
/// block reversible as one unit. Ledger helpers emit the matching chain
/// event to the block sink.
pub struct ApplyState<'a> {
    chain: &'a Chain,
    changes: &'a mut ChangeSet,
    sink: &'a dyn EventSink,
}

impl<'a> ApplyState<'a> {
    pub(crate) fn new(chain: &'a Chain, changes: &'a mut ChangeSet, sink: &'a dyn EventSink) -> Self {
        ApplyState {
            chain,
            changes,
            sink,
        }
    }

    pub fn chain(&self) -> &Chain {
        self.chain
    }

    pub fn emit(&self, event: ChainEvent) {
        trace!("event {} for {}", event.kind, event.address);
        self.sink.notify(event);
    }

    // ===== Staged ledger reads =====

    pub fn get_token_balance(&self, token: &Hash, address: &Address) -> u64 {
        ledger::balance::get(self, token, address)
    }

    pub fn get_owned_tokens(&self, token: &Hash, address: &Address) -> BTreeSet<u64> {
        ledger::ownership::get(self, token, address)
    }

    pub fn owner_of(&self, token: &Hash, id: u64) -> Option<Address> {
        ledger::ownership::owner_of(self, token, id)
    }

    pub fn get_nft(&self, token: &Hash, id: u64) -> Option<Bytes> {
        ledger::nft::get(self, token, id)
    }

    pub fn get_supply(&self, token: &Hash) -> Option<SupplyData> {
        ledger::supply::get(self, token)
    }

    // ===== Fungible operations =====

    pub fn mint_tokens(
        &mut self,
        token: &dyn Token,
        to: &Address,
        amount: u64,
    ) -> Result<(), ChainError> {
        if to.is_null() {
            return Err(ChainError::NullAddress);
        }
        if !token.is_fungible() {
            return Err(LedgerError::NotFungible(token.symbol().to_owned()).into());
        }
        if token.is_capped() {
            let root = self.chain.is_root();
            let mut sheet = self.supply_sheet(token)?;
            ledger::supply::mint(self, token.id(), &mut sheet, root, amount)?;
        }
        ledger::balance::add(self, token.id(), to, amount)?;
        self.emit(ChainEvent::new(
            EventKind::TokenMint,
            *to,
            token_event_data(token.id(), amount),
        ));
        Ok(())
    }

    pub fn burn_tokens(
        &mut self,
        token: &dyn Token,
        from: &Address,
        amount: u64,
    ) -> Result<(), ChainError> {
        if from.is_null() {
            return Err(ChainError::NullAddress);
        }
        if !token.is_fungible() {
            return Err(LedgerError::NotFungible(token.symbol().to_owned()).into());
        }
        if !token.is_burnable() {
            return Err(LedgerError::NotBurnable(token.symbol().to_owned()).into());
        }
        ledger::balance::subtract(self, token.id(), from, amount)?;
        if token.is_capped() {
            let root = self.chain.is_root();
            let mut sheet = self.supply_sheet(token)?;
            ledger::supply::burn(self, token.id(), &mut sheet, root, amount)?;
        }
        self.emit(ChainEvent::new(
            EventKind::TokenBurn,
            *from,
            token_event_data(token.id(), amount),
        ));
        Ok(())
    }

    pub fn transfer_tokens(
        &mut self,
        token: &dyn Token,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), ChainError> {
        if from.is_null() || to.is_null() {
            return Err(ChainError::NullAddress);
        }
        if !token.is_fungible() {
            return Err(LedgerError::NotFungible(token.symbol().to_owned()).into());
        }
        if !token.is_transferable() {
            return Err(LedgerError::NotTransferable(token.symbol().to_owned()).into());
        }
        ledger::balance::subtract(self, token.id(), from, amount)?;
        ledger::balance::add(self, token.id(), to, amount)?;
        let data = token_event_data(token.id(), amount);
        self.emit(ChainEvent::new(EventKind::TokenSend, *from, data.clone()));
        self.emit(ChainEvent::new(EventKind::TokenReceive, *to, data));
        Ok(())
    }

    // ===== Non-fungible operations =====

    pub fn give_token(
        &mut self,
        token: &dyn Token,
        to: &Address,
        id: u64,
    ) -> Result<(), ChainError> {
        if to.is_null() {
            return Err(ChainError::NullAddress);
        }
        if token.is_fungible() {
            return Err(LedgerError::NotNonFungible(token.symbol().to_owned()).into());
        }
        ledger::ownership::give(self, token.id(), to, id)?;
        self.emit(ChainEvent::new(
            EventKind::TokenReceive,
            *to,
            token_event_data(token.id(), id),
        ));
        Ok(())
    }

    pub fn take_token(
        &mut self,
        token: &dyn Token,
        from: &Address,
        id: u64,
    ) -> Result<(), ChainError> {
        if from.is_null() {
            return Err(ChainError::NullAddress);
        }
        if token.is_fungible() {
            return Err(LedgerError::NotNonFungible(token.symbol().to_owned()).into());
        }
        ledger::ownership::take(self, token.id(), from, id)?;
        self.emit(ChainEvent::new(
            EventKind::TokenSend,
            *from,
            token_event_data(token.id(), id),
        ));
        Ok(())
    }

    pub fn create_nft(&mut self, token: &dyn Token, data: Bytes) -> Result<u64, ChainError> {
        if token.is_fungible() {
            return Err(LedgerError::NotNonFungible(token.symbol().to_owned()).into());
        }
        let id = token.generate_id();
        ledger::nft::create(self, token.id(), id, data);
        self.emit(ChainEvent::new(
            EventKind::NftCreate,
            *self.chain.get_owner(),
            token_event_data(token.id(), id),
        ));
        Ok(id)
    }

    pub fn destroy_nft(&mut self, token: &dyn Token, id: u64) -> Result<bool, ChainError> {
        if token.is_fungible() {
            return Err(LedgerError::NotNonFungible(token.symbol().to_owned()).into());
        }
        let removed = ledger::nft::destroy(self, token.id(), id);
        if removed {
            self.emit(ChainEvent::new(
                EventKind::NftDestroy,
                *self.chain.get_owner(),
                token_event_data(token.id(), id),
            ));
        }
        Ok(removed)
    }

    // Materialize the supply sheet for `token` on first access: fresh at
    // the root, borrowed from the parent's current local balance at a
    // child. The borrow snapshot is taken exactly once, through the weak
    // parent link.
    fn supply_sheet(&mut self, token: &dyn Token) -> Result<SupplyData, ChainError> {
        if let Some(sheet) = ledger::supply::get(self, token.id()) {
            return Ok(sheet);
        }
        if !token.is_capped() {
            return Err(LedgerError::NotCapped(token.symbol().to_owned()).into());
        }
        let sheet = if self.chain.is_root() {
            SupplyData::new_root(token.max_supply())
        } else {
            let parent = self.chain.get_parent().ok_or(ChainError::ParentChainGone)?;
            let parent_local = parent
                .get_supply(token.id())
                .map(|sheet| sheet.local_balance)
                .unwrap_or(0);
            debug!(
                "supply sheet for {} materialized on {}: borrowing {} from parent {}",
                token.symbol(),
                self.chain.get_name(),
                parent_local,
                parent.get_name()
            );
            SupplyData::new_borrowed(parent_local, token.max_supply())
        };
        ledger::supply::init(self, token.id(), &sheet);
        Ok(sheet)
    }
}

impl StateReader for ApplyState<'_> {
    fn read(&self, key: &[u8]) -> Option<Bytes> {
        match self.changes.pending(key) {
            Some(pending) => pending.cloned(),
            None => self.chain.read_storage(key),
        }
    }
}

impl StateAccess for ApplyState<'_> {
    fn write(&mut self, key: Bytes, value: Bytes) {
        let prior = if self.changes.is_touched(&key) {
            None
        } else {
            self.chain.read_storage(&key)
        };
        self.changes.stage(key, prior, Some(value));
    }

    fn remove(&mut self, key: &[u8]) {
        let prior = if self.changes.is_touched(key) {
            None
        } else {
            self.chain.read_storage(key)
        };
        self.changes
            .stage(Bytes::copy_from_slice(key), prior, None);
    }
}

fn token_event_data(token: &Hash, value: u64) -> Bytes {
    let mut writer = Writer::with_capacity(40);
    token.write(&mut writer);
    writer.write_u64(&value);
    Bytes::from(writer.bytes())
}
