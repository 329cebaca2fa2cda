// Token sheets: per-token ledgers stored in the chain KV store. Every
// operation is generic over the state surface, so the same code runs
// against the committed store (intra-engine use) and against the staged
// view of a block being executed. Routing execution-time mutations through
// the staged view is what makes the sheets reversible under reorg.

pub mod balance;
pub mod nft;
pub mod ownership;
pub mod supply;

use vela_common::serializer::Serializer;

// A sheet entry that fails to decode is treated as absent. The engine is
// the only writer of these encodings, so this only fires on a corrupted
// backend.
fn decode<T: Serializer>(bytes: &[u8], what: &str) -> Option<T> {
    match T::from_bytes(bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            error!("corrupted {} entry: {}", what, err);
            None
        }
    }
}
