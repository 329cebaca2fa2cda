use bytes::Bytes;
use indexmap::IndexMap;

use crate::error::ChainError;

use super::Storage;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ChangeSetStatus {
    Staged,
    Applied,
    Spent,
}

#[derive(Clone, Debug)]
struct ChangeEntry {
    // value in the backing store before the first touch; None = absent
    prior: Option<Bytes>,
    // staged value; None = deletion
    next: Option<Bytes>,
}

/// Staged batch of KV mutations for one block. Entries keep insertion
/// order: `apply` flushes them in order, `undo` restores the recorded
/// prior values in reverse order, so apply followed by undo leaves the
/// backing store untouched.
#[derive(Debug, Default)]
pub struct ChangeSet {
    entries: IndexMap<Bytes, ChangeEntry>,
    status: ChangeSetStatus,
}

impl Default for ChangeSetStatus {
    fn default() -> Self {
        ChangeSetStatus::Staged
    }
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Staged view of a key.
    /// Returns None if the key was never touched, Some(None) if it is
    /// staged for deletion, Some(Some(value)) if a write is pending.
    pub fn pending(&self, key: &[u8]) -> Option<Option<&Bytes>> {
        self.entries.get(key).map(|entry| entry.next.as_ref())
    }

    pub fn is_touched(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Buffer a write (or a deletion when `next` is None). The prior value
    /// is recorded on the first touch only; later stagings of the same key
    /// update the pending value and keep the original prior.
    pub fn stage(&mut self, key: Bytes, prior: Option<Bytes>, next: Option<Bytes>) {
        match self.entries.entry(key) {
            indexmap::map::Entry::Occupied(mut entry) => {
                entry.get_mut().next = next;
            }
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(ChangeEntry { prior, next });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_applied(&self) -> bool {
        self.status == ChangeSetStatus::Applied
    }

    pub fn is_spent(&self) -> bool {
        self.status == ChangeSetStatus::Spent
    }

    /// Flush the buffered mutations to the backing store in insertion
    /// order. A second apply is a no-op; applying a spent set is an error.
    pub fn apply(&mut self, store: &mut dyn Storage) -> Result<(), ChainError> {
        match self.status {
            ChangeSetStatus::Spent => Err(ChainError::ChangeSetSpent),
            ChangeSetStatus::Applied => Ok(()),
            ChangeSetStatus::Staged => {
                for (key, entry) in &self.entries {
                    match &entry.next {
                        Some(value) => store.put(key.clone(), value.clone()),
                        None => store.delete(key),
                    }
                }
                self.status = ChangeSetStatus::Applied;
                Ok(())
            }
        }
    }

    /// Restore the recorded prior values in reverse insertion order and
    /// mark the set spent. Requires a prior apply.
    pub fn undo(&mut self, store: &mut dyn Storage) -> Result<(), ChainError> {
        if self.status != ChangeSetStatus::Applied {
            return Err(ChainError::ChangeSetNotApplied);
        }
        for (key, entry) in self.entries.iter().rev() {
            match &entry.prior {
                Some(value) => store.put(key.clone(), value.clone()),
                None => store.delete(key),
            }
        }
        self.status = ChangeSetStatus::Spent;
        Ok(())
    }
}
