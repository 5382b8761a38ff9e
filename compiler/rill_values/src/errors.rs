//! Evaluation error kinds.
//!
//! All four kinds short-circuit the current evaluation; there is no
//! recovery inside the evaluator. The host surfaces the message.

use std::fmt;

use crate::value::Value;

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, EvalError>;

/// Why an evaluation aborted.
#[derive(Clone, PartialEq, Debug)]
pub enum EvalError {
    /// A shape or tag mismatch, or a missing binding.
    RuntimeError(String),
    /// An `assert` condition evaluated to `#false`.
    AssertionFailed,
    /// A host interop coercion failed.
    CastError(String),
    /// The cast bridge looked up an implicit parameter that the caller
    /// never bound.
    NotFoundInImplicitEnv(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::RuntimeError(msg) => write!(f, "runtime error: {msg}"),
            EvalError::AssertionFailed => write!(f, "assertion failed"),
            EvalError::CastError(msg) => write!(f, "cast error: {msg}"),
            EvalError::NotFoundInImplicitEnv(name) => {
                write!(f, "?{name} not found in the implicit environment")
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Build a `RuntimeError` with the given message.
#[cold]
pub fn runtime_error(msg: impl Into<String>) -> EvalError {
    EvalError::RuntimeError(msg.into())
}

/// Build a `CastError` naming the offending value and the target type.
#[cold]
pub fn cast_failure(value: &Value, target: &str) -> EvalError {
    EvalError::CastError(format!("cannot cast {value} to {target}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_kind() {
        assert_eq!(
            runtime_error("unbound variable: x").to_string(),
            "runtime error: unbound variable: x"
        );
        assert_eq!(EvalError::AssertionFailed.to_string(), "assertion failed");
        assert_eq!(
            EvalError::NotFoundInImplicitEnv("now".into()).to_string(),
            "?now not found in the implicit environment"
        );
    }

    #[test]
    fn cast_failure_names_value_and_target() {
        let err = cast_failure(&Value::Int(3), "text");
        assert_eq!(err, EvalError::CastError("cannot cast 3 to text".into()));
    }
}
