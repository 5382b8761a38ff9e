//! The tagged runtime value representation.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rill_ir::{Type, VCObjectHash};

use crate::errors::EvalResult;
use crate::implicit::ImplicitEnv;

/// A runtime value.
///
/// Equality is structural on every variant except functions: two function
/// values are never equal, by language contract. The `Display` impl is the
/// canonical pretty form, observable through string interpolation.
#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Double(f64),
    Word16(u16),
    Word32(u32),
    Word64(u64),
    /// Seconds since the standard epoch.
    EpochTime(i64),
    Text(String),
    /// A constructor of the enum whose definition hashes to the owner.
    Enum(VCObjectHash, String),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
    /// `Some v`.
    One(Box<Value>),
    /// `None`.
    Empty,
    Fun(FunValue),
    /// A runtime type witness, used to dispatch polymorphic numeric
    /// literals.
    TypeRep(Type),
    /// A host-extension value.
    Custom(CustomValue),
}

impl Value {
    /// The boolean constructors, owned by the builtin `bool` enum.
    pub fn bool(b: bool) -> Value {
        Value::Enum(
            rill_vc::bool_enum_hash(),
            if b { "true" } else { "false" }.to_string(),
        )
    }

    pub fn one(v: Value) -> Value {
        Value::One(Box::new(v))
    }

    pub fn text(s: impl Into<String>) -> Value {
        Value::Text(s.into())
    }

    /// Read this value as a boolean, if it is the builtin bool enum.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Enum(h, tag) if *h == rill_vc::bool_enum_hash() => match tag.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Short tag for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Word16(_) => "word16",
            Value::Word32(_) => "word32",
            Value::Word64(_) => "word64",
            Value::EpochTime(_) => "time",
            Value::Text(_) => "text",
            Value::Enum(..) => "enum",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
            Value::One(_) | Value::Empty => "option",
            Value::Fun(_) => "function",
            Value::TypeRep(_) => "type rep",
            Value::Custom(_) => "custom",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Word16(a), Value::Word16(b)) => a == b,
            (Value::Word32(a), Value::Word32(b)) => a == b,
            (Value::Word64(a), Value::Word64(b)) => a == b,
            (Value::EpochTime(a), Value::EpochTime(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Enum(h1, t1), Value::Enum(h2, t2)) => h1 == h2 && t1 == t2,
            (Value::Array(a), Value::Array(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::One(a), Value::One(b)) => a == b,
            (Value::Empty, Value::Empty) => true,
            // Language contract: functions are never equal, not even to
            // themselves.
            (Value::Fun(_), Value::Fun(_)) => false,
            (Value::TypeRep(a), Value::TypeRep(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Double(d) => fmt_double(*d, f),
            Value::Word16(w) => write!(f, "0x{w:x}"),
            Value::Word32(w) => write!(f, "0x{w:x}"),
            Value::Word64(w) => write!(f, "0x{w:x}"),
            Value::EpochTime(s) => write!(f, "{s}s"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Enum(_, tag) => write!(f, "#{tag}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Value::One(v) => write!(f, "Some {v}"),
            Value::Empty => write!(f, "None"),
            Value::Fun(_) => write!(f, "<<function>>"),
            Value::TypeRep(t) => write!(f, "{t}"),
            Value::Custom(c) => write!(f, "{c}"),
        }
    }
}

/// Doubles always carry a decimal point so they stay distinguishable from
/// ints in the pretty form.
fn fmt_double(d: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if d.is_finite() && d.fract() == 0.0 && d.abs() < 1e15 {
        write!(f, "{d:.1}")
    } else {
        write!(f, "{d}")
    }
}

/// A function value: a callable closure over the implicit environment.
///
/// The implicit environment is the *caller's*, supplied at application
/// time: implicit parameters are dynamically scoped.
#[derive(Clone)]
pub struct FunValue(Arc<dyn Fn(&ImplicitEnv, Value) -> EvalResult + Send + Sync>);

impl FunValue {
    pub fn new(f: impl Fn(&ImplicitEnv, Value) -> EvalResult + Send + Sync + 'static) -> Self {
        FunValue(Arc::new(f))
    }

    #[inline]
    pub fn call(&self, ienv: &ImplicitEnv, arg: Value) -> EvalResult {
        (self.0)(ienv, arg)
    }
}

impl fmt::Debug for FunValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<<function>>")
    }
}

/// Host extension values.
///
/// Implementors provide their own equality; `as_any` lets hosts downcast
/// back to the concrete type.
pub trait CustomAny: fmt::Debug + fmt::Display + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_dyn(&self, other: &dyn CustomAny) -> bool;
}

#[derive(Clone, Debug)]
pub struct CustomValue(pub Arc<dyn CustomAny>);

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_dyn(&*other.0)
    }
}

impl fmt::Display for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
