//! Identifiers and resolution tags.

use crate::hash::VCObjectHash;
use std::fmt;

/// A plain source identifier.
pub type Ident = String;

/// An extended identifier: either an ordinary name or an implicit-parameter
/// label (`?name`).
///
/// The two namespaces never collide: `x` and `?x` are distinct keys in every
/// environment.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExtIdent {
    /// An ordinary lexical name.
    Name(Ident),
    /// An implicit-parameter label, written `?name` in source.
    Implicit(Ident),
}

impl ExtIdent {
    pub fn name(s: impl Into<Ident>) -> Self {
        ExtIdent::Name(s.into())
    }

    pub fn implicit(s: impl Into<Ident>) -> Self {
        ExtIdent::Implicit(s.into())
    }
}

impl fmt::Display for ExtIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtIdent::Name(n) => write!(f, "{n}"),
            ExtIdent::Implicit(n) => write!(f, "?{n}"),
        }
    }
}

/// How a referenced symbol was resolved during elaboration.
///
/// Only `UnderVC` references count as dependencies of a version-controlled
/// object; builtins are ambient and locals are bound within the expression.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Pinned {
    /// Bound locally (lambda parameter, let binding, implicit label).
    Local,
    /// A prelude builtin, addressed by its deterministic hash.
    Builtin(VCObjectHash),
    /// An object under version control, addressed by its content hash.
    UnderVC(VCObjectHash),
}

impl Pinned {
    /// The resolved hash, if any. Both pinned variants carry one.
    #[inline]
    pub fn hash(&self) -> Option<VCObjectHash> {
        match self {
            Pinned::Local => None,
            Pinned::Builtin(h) | Pinned::UnderVC(h) => Some(*h),
        }
    }

    /// The hash this reference contributes to a dependency set.
    #[inline]
    pub fn dependency(&self) -> Option<VCObjectHash> {
        match self {
            Pinned::UnderVC(h) => Some(*h),
            Pinned::Local | Pinned::Builtin(_) => None,
        }
    }
}
