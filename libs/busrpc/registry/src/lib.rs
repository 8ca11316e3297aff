//! The function signature table shared by the client and server engines:
//! maps a function-id to its expected call and return argument-type
//! sequences, and validates inbound/outbound argument lists against it.

use busrpc_types::{DataType, FunctionId};

/// Expected call/return argument-type sequences for one registered
/// function. Tags only, never values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionSignature {
    pub call_types: Vec<DataType>,
    pub return_types: Vec<DataType>,
}

/// Thread-safe map from `function_id` to its signature, backed by `scc`'s
/// lock-free hash map so lookups never contend with registration under
/// the engines' own bookkeeping lock.
#[derive(Debug, Default)]
pub struct Registry {
    signatures: scc::HashMap<FunctionId, FunctionSignature>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `function_id`, replacing any prior entry (idempotent).
    /// `function_id == 0` is rejected by the caller before this is reached
    /// (the client/server engines validate that at the API boundary).
    pub fn register(&self, function_id: FunctionId, call_types: Vec<DataType>, return_types: Vec<DataType>) {
        let signature = FunctionSignature { call_types, return_types };
        let _ = self.signatures.remove(&function_id);
        let _ = self.signatures.insert(function_id, signature);
    }

    pub fn unregister(&self, function_id: FunctionId) {
        let _ = self.signatures.remove(&function_id);
    }

    #[must_use]
    pub fn lookup(&self, function_id: FunctionId) -> Option<FunctionSignature> {
        self.signatures.read(&function_id, |_, signature| signature.clone())
    }

    /// True when `tags` exactly matches the registered call-argument types
    /// for `function_id`. Used by the client to reject a send locally and
    /// by the server to accept or drop an inbound request.
    #[must_use]
    pub fn matches_call(&self, function_id: FunctionId, tags: &[DataType]) -> bool {
        self.lookup(function_id).is_some_and(|signature| signature.call_types == tags)
    }

    /// True when `tags` exactly matches the registered return-argument
    /// types for `function_id`. Used by the client to accept or drop an
    /// inbound result and by the server to validate an outbound one.
    #[must_use]
    pub fn matches_return(&self, function_id: FunctionId, tags: &[DataType]) -> bool {
        self.lookup(function_id).is_some_and(|signature| signature.return_types == tags)
    }
}

#[cfg(test)]
mod tests {
    use busrpc_types::{DataType, FunctionId};

    use super::*;

    #[test]
    fn register_replaces_prior_entry() {
        let registry = Registry::new();
        registry.register(FunctionId(1), vec![DataType::Int32], vec![DataType::Bool8]);
        registry.register(FunctionId(1), vec![DataType::Int64], vec![DataType::Float64]);

        let signature = registry.lookup(FunctionId(1)).expect("present");
        assert_eq!(signature.call_types, vec![DataType::Int64]);
        assert_eq!(signature.return_types, vec![DataType::Float64]);
    }

    #[test]
    fn unregister_removes_the_entry() {
        let registry = Registry::new();
        registry.register(FunctionId(1), vec![], vec![]);
        registry.unregister(FunctionId(1));
        assert!(registry.lookup(FunctionId(1)).is_none());
    }

    #[test]
    fn matches_call_rejects_wrong_shape() {
        let registry = Registry::new();
        registry.register(FunctionId(1), vec![DataType::Int32, DataType::Int32, DataType::Int32Array, DataType::Int64], vec![]);
        assert!(!registry.matches_call(FunctionId(1), &[DataType::Int32, DataType::Int32]));
    }
}
