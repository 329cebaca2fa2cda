use bytes::Bytes;

use vela_common::{
    crypto::Hash,
    error::LedgerError,
    serializer::{Reader, ReaderError, Serializer, Writer},
};

use crate::{
    state::{StateAccess, StateReader},
    storage::keys,
};

use super::decode;

/// Capped-supply bookkeeping for one token on one chain.
///
/// At the root, `local_balance` tracks what has been issued and moves with
/// `circulating`; at a child, it is the allotment borrowed from the parent
/// at materialization time and stays fixed. The invariant
/// `circulating <= local_balance <= max_supply` holds after every
/// operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupplyData {
    pub local_balance: u64,
    pub circulating: u64,
    pub max_supply: u64,
}

impl SupplyData {
    pub fn new_root(max_supply: u64) -> Self {
        SupplyData {
            local_balance: 0,
            circulating: 0,
            max_supply,
        }
    }

    /// Child sheet: the borrowed allotment is the parent's local balance
    /// at the time of materialization.
    pub fn new_borrowed(parent_local: u64, max_supply: u64) -> Self {
        SupplyData {
            local_balance: parent_local,
            circulating: 0,
            max_supply,
        }
    }
}

impl Serializer for SupplyData {
    fn write(&self, writer: &mut Writer) {
        writer.write_u64(&self.local_balance);
        writer.write_u64(&self.circulating);
        writer.write_u64(&self.max_supply);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let data = SupplyData {
            local_balance: reader.read_u64()?,
            circulating: reader.read_u64()?,
            max_supply: reader.read_u64()?,
        };
        if data.circulating > data.local_balance || data.local_balance > data.max_supply {
            return Err(ReaderError::InvalidValue);
        }
        Ok(data)
    }

    fn size(&self) -> usize {
        24
    }
}

pub fn get<S: StateReader + ?Sized>(state: &S, token: &Hash) -> Option<SupplyData> {
    state
        .read(&keys::supply(token))
        .and_then(|bytes| decode(&bytes, "supply"))
}

pub fn init<S: StateAccess + ?Sized>(state: &mut S, token: &Hash, data: &SupplyData) {
    state.write(keys::supply(token), Bytes::from(data.to_bytes()));
}

/// Increase the circulating supply. Root chains issue against the cap and
/// grow their local balance with it; child chains re-issue out of the
/// borrowed allotment.
pub fn mint<S: StateAccess + ?Sized>(
    state: &mut S,
    token: &Hash,
    sheet: &mut SupplyData,
    root: bool,
    amount: u64,
) -> Result<(), LedgerError> {
    if root {
        let available = sheet.max_supply - sheet.circulating;
        if amount > available {
            return Err(LedgerError::SupplyExceeded {
                requested: amount,
                available,
            });
        }
        sheet.local_balance += amount;
        sheet.circulating += amount;
    } else {
        let available = sheet.local_balance - sheet.circulating;
        if amount > available {
            return Err(LedgerError::SupplyExceeded {
                requested: amount,
                available,
            });
        }
        sheet.circulating += amount;
    }
    init(state, token, sheet);
    Ok(())
}

/// Reduce the circulating supply. At the root the local balance shrinks
/// with it, returning headroom under the cap.
pub fn burn<S: StateAccess + ?Sized>(
    state: &mut S,
    token: &Hash,
    sheet: &mut SupplyData,
    root: bool,
    amount: u64,
) -> Result<(), LedgerError> {
    if amount > sheet.circulating {
        return Err(LedgerError::SupplyUnderflow {
            requested: amount,
            circulating: sheet.circulating,
        });
    }
    sheet.circulating -= amount;
    if root {
        sheet.local_balance -= amount;
    }
    init(state, token, sheet);
    Ok(())
}
