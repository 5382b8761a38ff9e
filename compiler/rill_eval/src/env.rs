//! Lexical and pinned environments.

use rustc_hash::FxHashMap;

use rill_ir::{ExtIdent, VCObjectHash};
use rill_values::Value;

/// The lexical environment.
///
/// Clone-on-extend: closures capture a snapshot at lambda creation, so
/// extension never disturbs an enclosing scope.
#[derive(Clone, Default, Debug)]
pub struct Env {
    bindings: FxHashMap<ExtIdent, Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn lookup(&self, ident: &ExtIdent) -> Option<&Value> {
        self.bindings.get(ident)
    }

    #[inline]
    pub fn insert(&mut self, ident: ExtIdent, value: Value) {
        self.bindings.insert(ident, value);
    }

    /// A copy of this environment with one extra binding.
    #[must_use]
    pub fn extended(&self, ident: ExtIdent, value: Value) -> Self {
        let mut next = self.clone();
        next.insert(ident, value);
        next
    }
}

/// The pinned environment: content hash → value of the referenced global.
#[derive(Clone, Default, Debug)]
pub struct PinnedEnv {
    bindings: FxHashMap<VCObjectHash, Value>,
}

impl PinnedEnv {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, hash: &VCObjectHash) -> Option<&Value> {
        self.bindings.get(hash)
    }

    #[inline]
    pub fn insert(&mut self, hash: VCObjectHash, value: Value) {
        self.bindings.insert(hash, value);
    }
}
