//! The implicit (reader-scoped) environment.
//!
//! `let ?x = v in body` binds `x` here for the dynamic extent of `body`.
//! Callees see the caller's bindings unless they rebind; the map is
//! clone-on-extend, so extension never disturbs an outer scope.

use rustc_hash::FxHashMap;

use rill_ir::ExtIdent;

use crate::value::Value;

#[derive(Clone, Default, Debug)]
pub struct ImplicitEnv {
    bindings: FxHashMap<ExtIdent, Value>,
}

impl ImplicitEnv {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn lookup(&self, ident: &ExtIdent) -> Option<&Value> {
        self.bindings.get(ident)
    }

    /// A copy of this environment with one extra binding.
    #[must_use]
    pub fn extended(&self, ident: ExtIdent, value: Value) -> Self {
        let mut next = self.clone();
        next.bindings.insert(ident, value);
        next
    }
}
