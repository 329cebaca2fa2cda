use anyhow::Result;
use bytes::Bytes;

use vela_common::crypto::Address;

use crate::state::ApplyState;

/// Host-side value produced by a script run. The VM can only leave these
/// kinds on its stack, so the conversion back to the host is total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VmValue {
    Number(i64),
    Bytes(Bytes),
    Address(Address),
    Bool(bool),
    Array(Vec<VmValue>),
}

/// Result stack left behind by a script run.
#[derive(Debug, Default)]
pub struct VmStack {
    values: Vec<VmValue>,
}

impl VmStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: VmValue) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Option<VmValue> {
        self.values.pop()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Script VM seam. Implementations build call-scripts for a bound
/// contract and execute them against the staged state of a chain; the
/// engine treats scripts as opaque bytes.
pub trait ContractVm: Send + Sync {
    /// Build a script invoking `method` on the contract bound at `target`.
    fn build_call(&self, target: &Address, method: &str, args: &[VmValue]) -> Result<Bytes>;

    /// Run a script against the staged chain state and return the stack it
    /// left behind.
    fn execute(&self, script: &[u8], state: &mut ApplyState<'_>) -> Result<VmStack>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_is_lifo() {
        let mut stack = VmStack::new();
        stack.push(VmValue::Number(1));
        stack.push(VmValue::Bool(true));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(VmValue::Bool(true)));
        assert_eq!(stack.pop(), Some(VmValue::Number(1)));
        assert_eq!(stack.pop(), None);
    }
}
