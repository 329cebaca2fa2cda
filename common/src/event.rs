use bytes::Bytes;
use strum::Display;

use crate::crypto::Address;

/// What happened, from the point of view of external observers. The engine
/// emits these through the sink attached to the block being executed; it
/// never interprets them.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum EventKind {
    TokenMint,
    TokenBurn,
    TokenSend,
    TokenReceive,
    NftCreate,
    NftDestroy,
    /// Collaborator-defined event, tagged by an opaque discriminant
    Custom(u16),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainEvent {
    pub kind: EventKind,
    pub address: Address,
    pub data: Bytes,
}

impl ChainEvent {
    pub fn new(kind: EventKind, address: Address, data: Bytes) -> Self {
        ChainEvent {
            kind,
            address,
            data,
        }
    }
}

/// Injected notification target. Blocks carry one; the engine forwards
/// every event produced while executing their transactions.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: ChainEvent);
}

/// Sink that drops everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _event: ChainEvent) {}
}
