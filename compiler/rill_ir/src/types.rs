//! Surface type terms.
//!
//! A conventional ML type language: base scalars, enums (nominal, with a
//! closed constructor set), arrows, arrays, optionals, and tuples. Unit is
//! the empty tuple.

use std::collections::BTreeSet;
use std::fmt;

use crate::ident::Ident;

/// A monomorphic type term.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Type {
    Int,
    Double,
    Text,
    Time,
    Word16,
    Word32,
    Word64,
    /// A nominal enum with its full constructor set.
    Enum {
        name: Ident,
        constructors: BTreeSet<Ident>,
    },
    /// A function type `a → b`.
    Arrow(Box<Type>, Box<Type>),
    Array(Box<Type>),
    Optional(Box<Type>),
    /// A tuple; the empty tuple is unit.
    Tuple(Vec<Type>),
    /// A type variable, only meaningful under a `TypeScheme` binder.
    Var(Ident),
}

impl Type {
    /// The unit type.
    pub fn unit() -> Type {
        Type::Tuple(Vec::new())
    }

    pub fn arrow(from: Type, to: Type) -> Type {
        Type::Arrow(Box::new(from), Box::new(to))
    }

    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn optional(inner: Type) -> Type {
        Type::Optional(Box::new(inner))
    }

    /// The builtin `bool` enum type.
    pub fn bool_enum() -> Type {
        Type::Enum {
            name: "bool".into(),
            constructors: ["true".to_string(), "false".to_string()].into(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Double => write!(f, "double"),
            Type::Text => write!(f, "text"),
            Type::Time => write!(f, "time"),
            Type::Word16 => write!(f, "word16"),
            Type::Word32 => write!(f, "word32"),
            Type::Word64 => write!(f, "word64"),
            Type::Enum { name, .. } => write!(f, "{name}"),
            Type::Arrow(a, b) => {
                if matches!(**a, Type::Arrow(..)) {
                    write!(f, "({a}) → {b}")
                } else {
                    write!(f, "{a} → {b}")
                }
            }
            Type::Array(e) => write!(f, "array of {e}"),
            Type::Optional(e) => write!(f, "option of {e}"),
            Type::Tuple(ts) => {
                write!(f, "(")?;
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")
            }
            Type::Var(v) => write!(f, "'{v}"),
        }
    }
}

/// A polymorphic type: universally quantified variables over a body.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeScheme {
    pub vars: Vec<Ident>,
    pub body: Type,
}

impl TypeScheme {
    /// A scheme with no quantified variables.
    pub fn mono(body: Type) -> Self {
        TypeScheme {
            vars: Vec::new(),
            body,
        }
    }
}

impl fmt::Display for TypeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.vars.is_empty() {
            write!(f, "forall")?;
            for v in &self.vars {
                write!(f, " '{v}")?;
            }
            write!(f, ". ")?;
        }
        write!(f, "{}", self.body)
    }
}
