use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Balance overflow")]
    Overflow,

    #[error("Insufficient balance: need {need}, have {have}")]
    Insufficient { need: u64, have: u64 },

    #[error("Supply exceeded: requested {requested}, available {available}")]
    SupplyExceeded { requested: u64, available: u64 },

    #[error("Supply underflow: burning {requested}, circulating {circulating}")]
    SupplyUnderflow { requested: u64, circulating: u64 },

    #[error("Token instance {0} already has an owner")]
    AlreadyOwned(u64),

    #[error("Token instance {0} is not owned by the given address")]
    NotOwner(u64),

    #[error("Token {0} is not fungible")]
    NotFungible(String),

    #[error("Token {0} is not non-fungible")]
    NotNonFungible(String),

    #[error("Token {0} has no capped supply")]
    NotCapped(String),

    #[error("Token {0} is not transferable")]
    NotTransferable(String),

    #[error("Token {0} is not burnable")]
    NotBurnable(String),
}
