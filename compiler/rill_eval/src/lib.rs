//! Rill Eval - the tree-walking interpreter and the prelude.
//!
//! # Architecture
//!
//! Evaluation runs under three environments:
//!
//! - the *lexical* environment (`Env`), extended by lambda parameters,
//!   `let`, and pattern bindings; closures capture a snapshot of it;
//! - the *pinned* environment (`PinnedEnv`), mapping content hashes to the
//!   values of pre-elaborated globals (operators, prelude functions);
//! - the *implicit* environment (`ImplicitEnv`, from `rill_values`),
//!   dynamically scoped and rebound by `let ?x = ...`.
//!
//! Arithmetic, comparison, array, text, and time operations are not
//! primitive: the prelude installs them into the pinned environment as
//! ordinary function values, and the evaluator reaches them through the
//! operator/variable mechanism.
//!
//! # Re-exports
//!
//! Value types from `rill_values` are re-exported for convenience.

mod env;
mod interpreter;
pub mod prelude;

pub use env::{Env, PinnedEnv};
pub use interpreter::{match_pat, Interpreter};
pub use prelude::{Module, ModuleMap, Prelude};

pub use rill_values::{EvalError, EvalResult, FunValue, ImplicitEnv, Value};
