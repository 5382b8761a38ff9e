//! Version-controlled objects and their dependency relation.

use std::collections::{BTreeMap, BTreeSet};

use rill_ir::{Expr, Ident, TypeScheme, VCObjectHash};

use crate::encode::Encoder;

/// An object under version control.
#[derive(Clone, PartialEq, Debug)]
pub enum VCObject {
    /// An ordinary script function with its inferred scheme.
    Function { expr: Expr, scheme: TypeScheme },
    /// A test function; schemes are not stored for tests.
    TestFunction { expr: Expr },
    /// A module: a name-to-hash export table.
    Module {
        exports: BTreeMap<Ident, VCObjectHash>,
    },
    /// An enum definition with its closed constructor set.
    Enum {
        name: Ident,
        constructors: BTreeSet<Ident>,
    },
}

impl VCObject {
    /// The content address of this object.
    ///
    /// Computed over the canonical encoding; see the crate docs for what
    /// the encoding normalizes away.
    pub fn content_hash(&self) -> VCObjectHash {
        let mut enc = Encoder::new();
        enc.object(self);
        crate::digest(enc.bytes())
    }
}

/// How a stored object relates to its predecessor revision.
///
/// Predicates annotate the provenance graph between revisions; they never
/// participate in the hash of the object itself.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum VCObjectPred {
    /// First revision of this object.
    Init,
    CompatibleWithPred(VCObjectHash),
    IncompatibleWithPred(VCObjectHash, Vec<String>),
    MarkedBreakingWithPred(VCObjectHash),
    CloneOf(VCObjectHash),
    /// The cloned source has since been removed.
    CloneOfRemoved(VCObjectHash),
    /// The cloned source could not be located.
    CloneOfNotFound(VCObjectHash),
}

/// The set of hashes that must be resolvable before `obj` can be evaluated.
///
/// Modules depend on their exports; functions depend on the
/// pinned-reference closure of their body. Builtin and local references
/// never contribute. Enums are self-contained.
pub fn dependencies(obj: &VCObject) -> BTreeSet<VCObjectHash> {
    match obj {
        VCObject::Function { expr, .. } | VCObject::TestFunction { expr } => {
            let mut deps = BTreeSet::new();
            expr.visit_pinned(&mut |p| {
                if let Some(h) = p.dependency() {
                    deps.insert(h);
                }
            });
            deps
        }
        VCObject::Module { exports } => exports.values().copied().collect(),
        VCObject::Enum { .. } => BTreeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_ir::{Pinned, Type};

    fn h(b: u8) -> VCObjectHash {
        VCObjectHash::new([b; 32])
    }

    fn fun(expr: Expr) -> VCObject {
        VCObject::Function {
            expr,
            scheme: TypeScheme::mono(Type::Int),
        }
    }

    #[test]
    fn function_dependencies_are_the_versioned_closure() {
        let expr = Expr::Op {
            pinned: Pinned::Builtin(h(1)),
            op: "+".into(),
            lhs: Box::new(Expr::Var {
                pinned: Pinned::UnderVC(h(2)),
                ident: rill_ir::ExtIdent::name("shared"),
            }),
            rhs: Box::new(Expr::Enum {
                pinned: Pinned::UnderVC(h(3)),
                name: "status".into(),
                tag: "ok".into(),
            }),
        };
        let deps = dependencies(&fun(expr));
        assert_eq!(deps, [h(2), h(3)].into());
    }

    #[test]
    fn module_dependencies_are_its_exports() {
        let obj = VCObject::Module {
            exports: [("a".to_string(), h(4)), ("b".to_string(), h(5))].into(),
        };
        assert_eq!(dependencies(&obj), [h(4), h(5)].into());
    }

    #[test]
    fn enum_has_no_dependencies() {
        let obj = VCObject::Enum {
            name: "bool".into(),
            constructors: ["true".to_string(), "false".to_string()].into(),
        };
        assert!(dependencies(&obj).is_empty());
    }
}
