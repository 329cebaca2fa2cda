use thiserror::Error;
use vela_common::{
    crypto::{Address, Hash},
    error::LedgerError,
};

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Invalid chain name '{0}'")]
    InvalidName(String),

    #[error("Null address not allowed")]
    NullAddress,

    #[error("A child chain named '{0}' is already registered")]
    DuplicateChild(String),

    #[error("Parent block {0} not found on the parent chain")]
    ParentBlockNotFound(Hash),

    #[error("Parent chain is no longer alive")]
    ParentChainGone,

    #[error("Chain {0} is unknown to the nexus")]
    UnknownChain(Address),

    #[error("Operation requires the root chain")]
    NotRoot,

    #[error("Block {0} not found")]
    BlockNotFound(Hash),

    #[error("Change-set is spent")]
    ChangeSetSpent,

    #[error("Change-set was not applied")]
    ChangeSetNotApplied,

    #[error("Merge batch is empty")]
    EmptyMerge,

    #[error("Merge batch heights are not consecutive")]
    BrokenMergeSequence,

    #[error("Merged block {0} was rejected")]
    MergeBlockRejected(Hash),

    #[error("Contract invocation left an empty stack")]
    EmptyVmStack,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Contract execution failed: {0}")]
    Vm(#[from] anyhow::Error),
}
