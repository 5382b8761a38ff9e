//! The parse/infer contract and its host hooks.
//!
//! Parsing and inference are an external collaborator: the server only
//! depends on this trait. A successful parse yields an elaborated
//! expression and scheme (opaque to the server) plus the hover ranges;
//! a failed parse yields diagnostics.
//!
//! Every parse attempt is bracketed by the `before_parse`/`after_parse`
//! hooks with a fresh `(uuid, timestamp)` stamp, giving the host a place
//! to record metrics or transform diagnostics.

use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use tower_lsp::lsp_types::Diagnostic;
use uuid::Uuid;

use rill_eval::ModuleMap;
use rill_ir::{Expr, Type, TypeScheme};

use crate::hover::HoverEntry;

/// A successfully parsed and inferred script.
#[derive(Clone, Debug)]
pub struct InferredScript {
    pub expr: Expr,
    pub scheme: TypeScheme,
    pub hover: Vec<HoverEntry>,
}

/// What one parse attempt produced.
pub type ParseOutcome = Result<InferredScript, Vec<Diagnostic>>;

/// The external parse+infer collaborator.
pub trait ParseAndInfer: Send + Sync + 'static {
    /// Parse and infer `source` against the prelude. `idents` are
    /// host-supplied names the parser treats as formal parameters of the
    /// script; `validate_input` rejects disallowed input types for the
    /// current host context.
    fn parse_and_infer(
        &self,
        prelude: &ModuleMap,
        idents: &[Option<String>],
        source: &str,
        validate_input: &dyn Fn(&Type) -> Result<(), String>,
    ) -> ParseOutcome;
}

impl ParseAndInfer for Arc<dyn ParseAndInfer> {
    fn parse_and_infer(
        &self,
        prelude: &ModuleMap,
        idents: &[Option<String>],
        source: &str,
        validate_input: &dyn Fn(&Type) -> Result<(), String>,
    ) -> ParseOutcome {
        (**self).parse_and_infer(prelude, idents, source, validate_input)
    }
}

/// Identity of one parse attempt, handed to both hooks.
#[derive(Clone, Copy, Debug)]
pub struct ParseStamp {
    pub uuid: Uuid,
    pub at: SystemTime,
}

impl ParseStamp {
    /// A fresh stamp; the UUID is unique per parse attempt.
    pub fn new() -> Self {
        ParseStamp {
            uuid: Uuid::new_v4(),
            at: SystemTime::now(),
        }
    }
}

impl Default for ParseStamp {
    fn default() -> Self {
        Self::new()
    }
}

/// Host-supplied hooks consulted around every parse attempt.
pub struct Hooks {
    /// Identifiers the host injects as script parameters; consulted once
    /// per parse and during completion.
    pub get_idents: Box<dyn Fn() -> Vec<Option<String>> + Send + Sync>,
    /// Rejects disallowed input types for the current host context.
    pub validate_input: Box<dyn Fn(&Type) -> Result<(), String> + Send + Sync>,
    pub before_parse: Box<dyn Fn(&ParseStamp) + Send + Sync>,
    pub after_parse: Box<dyn Fn(&ParseStamp, ParseOutcome) -> ParseOutcome + Send + Sync>,
}

impl Default for Hooks {
    fn default() -> Self {
        Hooks {
            get_idents: Box::new(Vec::new),
            validate_input: Box::new(|_| Ok(())),
            before_parse: Box::new(|_| {}),
            after_parse: Box::new(|_, outcome| outcome),
        }
    }
}

/// One bracketed parse attempt: stamp, hooks, pipeline.
pub fn run_parse<P: ParseAndInfer>(
    pipeline: &P,
    hooks: &Hooks,
    prelude: &ModuleMap,
    source: &str,
) -> ParseOutcome {
    let stamp = ParseStamp::new();
    (hooks.before_parse)(&stamp);
    let idents = (hooks.get_idents)();
    let outcome = pipeline.parse_and_infer(prelude, &idents, source, hooks.validate_input.as_ref());
    (hooks.after_parse)(&stamp, outcome)
}

static PIPELINE: OnceLock<Arc<dyn ParseAndInfer>> = OnceLock::new();

/// Register the process-wide parse backend. Returns `false` if one was
/// already registered.
pub fn register_pipeline(pipeline: impl ParseAndInfer) -> bool {
    PIPELINE.set(Arc::new(pipeline)).is_ok()
}

/// The registered parse backend, if any.
pub fn registered_pipeline() -> Option<Arc<dyn ParseAndInfer>> {
    PIPELINE.get().cloned()
}
