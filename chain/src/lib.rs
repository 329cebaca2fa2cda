// Vela chain engine
// Per-chain ledger: block log with height/hash indexes, reversible
// change-set state store, token sheets and parent/child chain tree.

#[macro_use]
extern crate log;

pub mod block;
pub mod chain;
pub mod contract;
pub mod error;
pub mod ledger;
pub mod nexus;
pub mod state;
pub mod storage;
pub mod transaction;
