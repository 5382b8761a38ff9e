//! Bidirectional conversion between host types and runtime values.
//!
//! Three relations:
//!
//! - `ToValue`: infallible host → value conversion.
//! - `TryToValue`: fallible host → value conversion, for host integers
//!   that must range-check. Every `ToValue` type is trivially
//!   `TryToValue`.
//! - `FromValue`: value → host conversion; a shape mismatch is a
//!   `CastError` naming the offending value and the target type.
//!
//! `ToType` describes the value-level type of a host type, used when
//! exporting host functions through the prelude.
//!
//! Host functions are wrapped rather than implemented directly on closure
//! types (the argument and result parameters would be unconstrained):
//! `host_fn` for pure functions, `fallible_fn` for functions that can
//! fail, and `implicit_fn` for functions that read a labelled implicit
//! parameter from the caller's environment. Nesting `host_fn` gives
//! curried multi-argument functions.

use std::marker::PhantomData;

use rill_ir::{ExtIdent, Type};

use crate::errors::{cast_failure, EvalError};
use crate::value::{FunValue, Value};

/// Infallible conversion of a host value into a runtime value.
pub trait ToValue {
    fn to_value(self) -> Value;
}

/// Fallible conversion of a host value into a runtime value.
pub trait TryToValue {
    fn try_to_value(self) -> Result<Value, EvalError>;
}

impl<T: ToValue> TryToValue for T {
    #[inline]
    fn try_to_value(self) -> Result<Value, EvalError> {
        Ok(self.to_value())
    }
}

/// Conversion of a runtime value back into a host value.
pub trait FromValue: Sized {
    fn from_value(v: Value) -> Result<Self, EvalError>;
}

/// The value-level type of a host type.
pub trait ToType {
    fn to_type() -> Type;
}

/// Epoch time in seconds, the host-side face of time values.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct CTime(pub i64);

/// A host-side sum, encoded structurally as a pair of optionals with
/// exactly one side populated.
#[derive(Clone, PartialEq, Debug)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

// ── Scalars ─────────────────────────────────────────────────────

macro_rules! scalar_cast {
    ($ty:ty, $variant:ident, $name:literal, $tag:expr) => {
        impl ToValue for $ty {
            #[inline]
            fn to_value(self) -> Value {
                Value::$variant(self)
            }
        }
        impl FromValue for $ty {
            fn from_value(v: Value) -> Result<Self, EvalError> {
                match v {
                    Value::$variant(x) => Ok(x),
                    other => Err(cast_failure(&other, $name)),
                }
            }
        }
        impl ToType for $ty {
            fn to_type() -> Type {
                $tag
            }
        }
    };
}

scalar_cast!(i64, Int, "int", Type::Int);
scalar_cast!(f64, Double, "double", Type::Double);
scalar_cast!(u16, Word16, "word16", Type::Word16);
scalar_cast!(u32, Word32, "word32", Type::Word32);
scalar_cast!(u64, Word64, "word64", Type::Word64);
scalar_cast!(String, Text, "text", Type::Text);

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::bool(self)
    }
}

impl FromValue for bool {
    fn from_value(v: Value) -> Result<Self, EvalError> {
        v.as_bool().ok_or_else(|| cast_failure(&v, "bool"))
    }
}

impl ToType for bool {
    fn to_type() -> Type {
        Type::bool_enum()
    }
}

impl ToValue for CTime {
    #[inline]
    fn to_value(self) -> Value {
        Value::EpochTime(self.0)
    }
}

impl FromValue for CTime {
    fn from_value(v: Value) -> Result<Self, EvalError> {
        match v {
            Value::EpochTime(s) => Ok(CTime(s)),
            other => Err(cast_failure(&other, "time")),
        }
    }
}

impl ToType for CTime {
    fn to_type() -> Type {
        Type::Time
    }
}

/// Host-sized integers range-check against `i64` in both directions.
impl TryToValue for usize {
    fn try_to_value(self) -> Result<Value, EvalError> {
        match i64::try_from(self) {
            Ok(n) => Ok(Value::Int(n)),
            Err(_) => Err(EvalError::CastError(format!(
                "{self} is out of range for int"
            ))),
        }
    }
}

impl FromValue for usize {
    fn from_value(v: Value) -> Result<Self, EvalError> {
        match v {
            Value::Int(n) => usize::try_from(n).map_err(|_| {
                EvalError::CastError(format!("{n} is out of range for a host-sized int"))
            }),
            other => Err(cast_failure(&other, "int")),
        }
    }
}

impl ToType for usize {
    fn to_type() -> Type {
        Type::Int
    }
}

// Identity casts let polymorphic host functions take values untouched.
impl ToValue for Value {
    #[inline]
    fn to_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    #[inline]
    fn from_value(v: Value) -> Result<Self, EvalError> {
        Ok(v)
    }
}

// ── Unit, tuples, options, sums, arrays ─────────────────────────

impl ToValue for () {
    fn to_value(self) -> Value {
        Value::Tuple(Vec::new())
    }
}

impl FromValue for () {
    fn from_value(v: Value) -> Result<Self, EvalError> {
        match v {
            Value::Tuple(items) if items.is_empty() => Ok(()),
            other => Err(cast_failure(&other, "()")),
        }
    }
}

impl ToType for () {
    fn to_type() -> Type {
        Type::unit()
    }
}

impl<A: ToValue, B: ToValue> ToValue for (A, B) {
    fn to_value(self) -> Value {
        Value::Tuple(vec![self.0.to_value(), self.1.to_value()])
    }
}

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
    fn from_value(v: Value) -> Result<Self, EvalError> {
        match v {
            Value::Tuple(items) => match <[Value; 2]>::try_from(items) {
                Ok([a, b]) => Ok((A::from_value(a)?, B::from_value(b)?)),
                Err(items) => Err(cast_failure(&Value::Tuple(items), "a pair")),
            },
            other => Err(cast_failure(&other, "a pair")),
        }
    }
}

impl<A: ToType, B: ToType> ToType for (A, B) {
    fn to_type() -> Type {
        Type::Tuple(vec![A::to_type(), B::to_type()])
    }
}

impl<A: ToValue, B: ToValue, C: ToValue> ToValue for (A, B, C) {
    fn to_value(self) -> Value {
        Value::Tuple(vec![
            self.0.to_value(),
            self.1.to_value(),
            self.2.to_value(),
        ])
    }
}

impl<A: FromValue, B: FromValue, C: FromValue> FromValue for (A, B, C) {
    fn from_value(v: Value) -> Result<Self, EvalError> {
        match v {
            Value::Tuple(items) => match <[Value; 3]>::try_from(items) {
                Ok([a, b, c]) => Ok((
                    A::from_value(a)?,
                    B::from_value(b)?,
                    C::from_value(c)?,
                )),
                Err(items) => Err(cast_failure(&Value::Tuple(items), "a triple")),
            },
            other => Err(cast_failure(&other, "a triple")),
        }
    }
}

impl<A: ToType, B: ToType, C: ToType> ToType for (A, B, C) {
    fn to_type() -> Type {
        Type::Tuple(vec![A::to_type(), B::to_type(), C::to_type()])
    }
}

impl<A: ToValue> ToValue for Option<A> {
    fn to_value(self) -> Value {
        match self {
            Some(a) => Value::One(Box::new(a.to_value())),
            None => Value::Empty,
        }
    }
}

impl<A: FromValue> FromValue for Option<A> {
    fn from_value(v: Value) -> Result<Self, EvalError> {
        match v {
            Value::One(inner) => Ok(Some(A::from_value(*inner)?)),
            Value::Empty => Ok(None),
            other => Err(cast_failure(&other, "an optional")),
        }
    }
}

impl<A: ToType> ToType for Option<A> {
    fn to_type() -> Type {
        Type::optional(A::to_type())
    }
}

impl<L: ToValue, R: ToValue> ToValue for Either<L, R> {
    fn to_value(self) -> Value {
        match self {
            Either::Left(l) => Value::Tuple(vec![Value::One(Box::new(l.to_value())), Value::Empty]),
            Either::Right(r) => {
                Value::Tuple(vec![Value::Empty, Value::One(Box::new(r.to_value()))])
            }
        }
    }
}

impl<L: FromValue, R: FromValue> FromValue for Either<L, R> {
    fn from_value(v: Value) -> Result<Self, EvalError> {
        if let Value::Tuple(items) = &v {
            if items.len() == 2 {
                match (&items[0], &items[1]) {
                    (Value::One(l), Value::Empty) => {
                        return Ok(Either::Left(L::from_value((**l).clone())?));
                    }
                    (Value::Empty, Value::One(r)) => {
                        return Ok(Either::Right(R::from_value((**r).clone())?));
                    }
                    _ => {}
                }
            }
        }
        Err(cast_failure(&v, "a sum"))
    }
}

impl<L: ToType, R: ToType> ToType for Either<L, R> {
    fn to_type() -> Type {
        Type::Tuple(vec![
            Type::optional(L::to_type()),
            Type::optional(R::to_type()),
        ])
    }
}

impl<A: ToValue> ToValue for Vec<A> {
    fn to_value(self) -> Value {
        Value::Array(self.into_iter().map(ToValue::to_value).collect())
    }
}

impl<A: FromValue> FromValue for Vec<A> {
    fn from_value(v: Value) -> Result<Self, EvalError> {
        match v {
            Value::Array(items) => items.into_iter().map(A::from_value).collect(),
            other => Err(cast_failure(&other, "an array")),
        }
    }
}

impl<A: ToType> ToType for Vec<A> {
    fn to_type() -> Type {
        Type::array(A::to_type())
    }
}

// ── Host functions ──────────────────────────────────────────────

/// A pure host function exported as a language function.
pub struct HostFun<A, R, F> {
    f: F,
    _marker: PhantomData<fn(A) -> R>,
}

/// Wrap `f` for export. Nest calls for curried multi-argument functions:
/// `host_fn(|x: i64| host_fn(move |y: i64| x + y))`.
pub fn host_fn<A, R, F: Fn(A) -> R>(f: F) -> HostFun<A, R, F> {
    HostFun {
        f,
        _marker: PhantomData,
    }
}

impl<A, R, F> ToValue for HostFun<A, R, F>
where
    A: FromValue + 'static,
    R: ToValue + 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    fn to_value(self) -> Value {
        let f = self.f;
        Value::Fun(FunValue::new(move |_ienv, arg| {
            Ok(f(A::from_value(arg)?).to_value())
        }))
    }
}

impl<A: ToType, R: ToType, F> ToType for HostFun<A, R, F> {
    fn to_type() -> Type {
        Type::arrow(A::to_type(), R::to_type())
    }
}

/// A host function that can fail with an evaluation error.
pub struct FallibleFun<A, R, F> {
    f: F,
    _marker: PhantomData<fn(A) -> R>,
}

pub fn fallible_fn<A, R, F: Fn(A) -> Result<R, EvalError>>(f: F) -> FallibleFun<A, R, F> {
    FallibleFun {
        f,
        _marker: PhantomData,
    }
}

impl<A, R, F> ToValue for FallibleFun<A, R, F>
where
    A: FromValue + 'static,
    R: ToValue + 'static,
    F: Fn(A) -> Result<R, EvalError> + Send + Sync + 'static,
{
    fn to_value(self) -> Value {
        let f = self.f;
        Value::Fun(FunValue::new(move |_ienv, arg| {
            Ok(f(A::from_value(arg)?)?.to_value())
        }))
    }
}

impl<A: ToType, R: ToType, F> ToType for FallibleFun<A, R, F> {
    fn to_type() -> Type {
        Type::arrow(A::to_type(), R::to_type())
    }
}

/// A host function that reads a labelled implicit parameter.
///
/// The produced function value, on invocation, looks the label up in the
/// *caller's* implicit environment, coerces it to `T`, and delegates.
/// A missing label is `NotFoundInImplicitEnv`.
pub struct ImplicitFun<T, A, R, F> {
    label: String,
    f: F,
    _marker: PhantomData<fn(T, A) -> R>,
}

pub fn implicit_fn<T, A, R, F: Fn(T, A) -> R>(
    label: impl Into<String>,
    f: F,
) -> ImplicitFun<T, A, R, F> {
    ImplicitFun {
        label: label.into(),
        f,
        _marker: PhantomData,
    }
}

impl<T, A, R, F> ToValue for ImplicitFun<T, A, R, F>
where
    T: FromValue + 'static,
    A: FromValue + 'static,
    R: ToValue + 'static,
    F: Fn(T, A) -> R + Send + Sync + 'static,
{
    fn to_value(self) -> Value {
        let ImplicitFun { label, f, .. } = self;
        Value::Fun(FunValue::new(move |ienv, arg| {
            let key = ExtIdent::Implicit(label.clone());
            let raw = ienv
                .lookup(&key)
                .cloned()
                .ok_or_else(|| EvalError::NotFoundInImplicitEnv(label.clone()))?;
            let t = T::from_value(raw)?;
            let a = A::from_value(arg)?;
            Ok(f(t, a).to_value())
        }))
    }
}

impl<T, A: ToType, R: ToType, F> ToType for ImplicitFun<T, A, R, F> {
    fn to_type() -> Type {
        Type::arrow(A::to_type(), R::to_type())
    }
}
