//! Expression evaluation.
//!
//! `eval` handles every expression kind exhaustively, no catch-all. The
//! kind drives the dispatch; recursion threads the lexical and implicit
//! environments while the pinned environment is shared behind the
//! interpreter handle.

use std::sync::Arc;

use rill_ir::{Expr, ExtIdent, Ident, Pat, Pinned, StrChunk, Type};
use rill_values::{runtime_error, EvalError, EvalResult, FunValue, ImplicitEnv, Value};

use crate::env::{Env, PinnedEnv};

/// The evaluator: a cheap handle over the shared pinned environment.
#[derive(Clone)]
pub struct Interpreter {
    pinned: Arc<PinnedEnv>,
}

impl Interpreter {
    pub fn new(pinned: PinnedEnv) -> Self {
        Interpreter {
            pinned: Arc::new(pinned),
        }
    }

    pub fn with_shared(pinned: Arc<PinnedEnv>) -> Self {
        Interpreter { pinned }
    }

    /// Evaluate `expr` under the given environments.
    ///
    /// Deterministic: the result is a function of the three environments
    /// and the expression alone.
    pub fn eval(&self, env: &Env, ienv: &ImplicitEnv, expr: &Expr) -> EvalResult {
        match expr {
            // A numeric constant is polymorphic; inference decides its
            // type and the decision arrives as a runtime witness.
            Expr::LInt(n) => {
                let n = *n;
                Ok(Value::Fun(FunValue::new(move |_ienv, rep| match rep {
                    Value::TypeRep(Type::Int) => Ok(Value::Int(n)),
                    Value::TypeRep(Type::Double) => Ok(Value::Double(n as f64)),
                    _ => Err(runtime_error("Invalid runtime rep for numeric constant")),
                })))
            }
            Expr::LDouble(d) => Ok(Value::Double(*d)),
            Expr::LHex(w) => Ok(Value::Word64(*w)),
            Expr::LText(s) => Ok(Value::Text(s.clone())),
            Expr::InterpolatedString(chunks) => {
                let mut out = String::new();
                for chunk in chunks {
                    match chunk {
                        StrChunk::Lit(s) => out.push_str(s),
                        StrChunk::Expr(e) => {
                            let v = self.eval(env, ienv, e)?;
                            out.push_str(&v.to_string());
                        }
                    }
                }
                Ok(Value::Text(out))
            }
            Expr::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for e in items {
                    out.push(self.eval(env, ienv, e)?);
                }
                Ok(Value::Array(out))
            }
            Expr::ArrayComp {
                body,
                sources,
                cond,
            } => {
                let mut out = Vec::new();
                self.comprehend(env, ienv, body, sources, cond.as_deref(), &mut out)?;
                Ok(Value::Array(out))
            }
            Expr::Enum { pinned, tag, .. } => match pinned.hash() {
                Some(h) => Ok(Value::Enum(h, tag.clone())),
                None => Err(runtime_error("All enums must be pinned")),
            },
            Expr::Var { pinned, ident } => match pinned {
                Pinned::Builtin(h) | Pinned::UnderVC(h) => {
                    self.pinned.get(h).cloned().ok_or_else(|| {
                        runtime_error(format!(
                            "could not find {ident} ({h}) in the pinned environment"
                        ))
                    })
                }
                Pinned::Local => match ident {
                    ExtIdent::Name(_) => env
                        .lookup(ident)
                        .cloned()
                        .ok_or_else(|| runtime_error(format!("unbound variable: {ident}"))),
                    ExtIdent::Implicit(_) => ienv.lookup(ident).cloned().ok_or_else(|| {
                        runtime_error(format!("unbound implicit parameter: {ident}"))
                    }),
                },
            },
            Expr::TypeRep(t) => Ok(Value::TypeRep(t.clone())),
            Expr::Op {
                pinned,
                op,
                lhs,
                rhs,
            } => {
                let f = self.pinned_fun(pinned, op)?;
                let l = self.eval(env, ienv, lhs)?;
                match f.call(ienv, l)? {
                    Value::Fun(g) => {
                        let r = self.eval(env, ienv, rhs)?;
                        g.call(ienv, r)
                    }
                    other => Err(runtime_error(format!(
                        "operator {op} is not curried: applied once it produced {}",
                        other.kind()
                    ))),
                }
            }
            Expr::PreOp { pinned, op, rhs } => {
                let f = self.pinned_fun(pinned, op)?;
                let r = self.eval(env, ienv, rhs)?;
                f.call(ienv, r)
            }
            Expr::Lam { params, body } => {
                if params.is_empty() {
                    self.eval(env, ienv, body)
                } else {
                    Ok(close_lambda(
                        self.clone(),
                        env.clone(),
                        params.clone().into(),
                        0,
                        Arc::new((**body).clone()),
                    ))
                }
            }
            Expr::App { f, arg } => {
                let fv = self.eval(env, ienv, f)?;
                match fv {
                    Value::Fun(g) => {
                        let a = self.eval(env, ienv, arg)?;
                        g.call(ienv, a)
                    }
                    other => Err(runtime_error(format!(
                        "cannot apply a value of kind {}",
                        other.kind()
                    ))),
                }
            }
            Expr::Let {
                binding,
                value,
                body,
            } => {
                let v = self.eval(env, ienv, value)?;
                match binding {
                    ExtIdent::Name(_) => {
                        let env2 = env.extended(binding.clone(), v);
                        self.eval(&env2, ienv, body)
                    }
                    ExtIdent::Implicit(_) => {
                        let ienv2 = ienv.extended(binding.clone(), v);
                        self.eval(env, &ienv2, body)
                    }
                }
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => match self.eval_bool(env, ienv, cond, "if condition")? {
                true => self.eval(env, ienv, then_branch),
                false => self.eval(env, ienv, else_branch),
            },
            Expr::Tuple(items) => {
                let mut out = Vec::with_capacity(items.len());
                for e in items {
                    out.push(self.eval(env, ienv, e)?);
                }
                Ok(Value::Tuple(out))
            }
            Expr::One(e) => Ok(Value::One(Box::new(self.eval(env, ienv, e)?))),
            Expr::Empty => Ok(Value::Empty),
            Expr::Assert { cond, body } => {
                if self.eval_bool(env, ienv, cond, "assert condition")? {
                    self.eval(env, ienv, body)
                } else {
                    Err(EvalError::AssertionFailed)
                }
            }
            Expr::Case { scrutinee, arms } => {
                let v = self.eval(env, ienv, scrutinee)?;
                for (pat, body) in arms {
                    if let Some(binds) = match_pat(pat, &v) {
                        let mut env2 = env.clone();
                        for (ident, value) in binds {
                            env2.insert(ident, value);
                        }
                        return self.eval(&env2, ienv, body);
                    }
                }
                Err(runtime_error("non-exhaustive patterns in case"))
            }
            // Transparent wrappers evaluate their inner expression.
            Expr::Bracketed(inner) => self.eval(env, ienv, inner),
            Expr::CommentAbove { inner, .. }
            | Expr::CommentAfter { inner, .. }
            | Expr::CommentBelow { inner, .. }
            | Expr::RenameModule { inner, .. }
            | Expr::OpenModule { inner, .. } => self.eval(env, ienv, inner),
        }
    }

    /// Resolve a pinned operator reference to its function value.
    fn pinned_fun(&self, pinned: &Pinned, op: &str) -> Result<FunValue, EvalError> {
        let h = pinned
            .hash()
            .ok_or_else(|| runtime_error(format!("operator {op} is not pinned")))?;
        match self.pinned.get(&h) {
            Some(Value::Fun(f)) => Ok(f.clone()),
            Some(other) => Err(runtime_error(format!(
                "operator {op} resolved to a non-function value of kind {}",
                other.kind()
            ))),
            None => Err(runtime_error(format!(
                "could not find operator {op} ({h}) in the pinned environment"
            ))),
        }
    }

    fn eval_bool(
        &self,
        env: &Env,
        ienv: &ImplicitEnv,
        cond: &Expr,
        what: &str,
    ) -> Result<bool, EvalError> {
        let v = self.eval(env, ienv, cond)?;
        v.as_bool()
            .ok_or_else(|| runtime_error(format!("{what} must be a bool, got {}", v.kind())))
    }

    /// Nested generators, innermost last; the optional filter applies to
    /// each fully bound combination.
    fn comprehend(
        &self,
        env: &Env,
        ienv: &ImplicitEnv,
        body: &Expr,
        sources: &[(Ident, Expr)],
        cond: Option<&Expr>,
        out: &mut Vec<Value>,
    ) -> Result<(), EvalError> {
        let Some(((name, src), rest)) = sources.split_first() else {
            if let Some(c) = cond {
                if !self.eval_bool(env, ienv, c, "comprehension filter")? {
                    return Ok(());
                }
            }
            out.push(self.eval(env, ienv, body)?);
            return Ok(());
        };
        match self.eval(env, ienv, src)? {
            Value::Array(items) => {
                for item in items {
                    let env2 = env.extended(ExtIdent::Name(name.clone()), item);
                    self.comprehend(&env2, ienv, body, rest, cond, out)?;
                }
                Ok(())
            }
            other => Err(runtime_error(format!(
                "comprehension source must be an array, got {}",
                other.kind()
            ))),
        }
    }
}

/// Build the curried closure chain for a lambda.
///
/// Each application extends the captured lexical snapshot; the implicit
/// environment is the caller's at application time, not the definition
/// site's.
fn close_lambda(
    interp: Interpreter,
    env: Env,
    params: Arc<[Option<Ident>]>,
    idx: usize,
    body: Arc<Expr>,
) -> Value {
    Value::Fun(FunValue::new(move |ienv, arg| {
        let mut env2 = env.clone();
        if let Some(name) = &params[idx] {
            env2.insert(ExtIdent::Name(name.clone()), arg);
        }
        if idx + 1 == params.len() {
            interp.eval(&env2, ienv, &body)
        } else {
            Ok(close_lambda(
                interp.clone(),
                env2,
                params.clone(),
                idx + 1,
                body.clone(),
            ))
        }
    }))
}

/// Match a value against a pattern, producing the bindings on success.
///
/// Patterns are linear, so bindings merge without collision checks.
pub fn match_pat(pat: &Pat, value: &Value) -> Option<Vec<(ExtIdent, Value)>> {
    match (pat, value) {
        (Pat::Wild, _) => Some(Vec::new()),
        (Pat::Var(name), v) => Some(vec![(ExtIdent::Name(name.clone()), v.clone())]),
        (Pat::LInt(n), Value::Int(m)) if n == m => Some(Vec::new()),
        (Pat::LDouble(d), Value::Double(x)) if d == x => Some(Vec::new()),
        (Pat::LHex(w), Value::Word16(x)) if *w == u64::from(*x) => Some(Vec::new()),
        (Pat::LHex(w), Value::Word32(x)) if *w == u64::from(*x) => Some(Vec::new()),
        (Pat::LHex(w), Value::Word64(x)) if w == x => Some(Vec::new()),
        (Pat::LText(s), Value::Text(t)) if s == t => Some(Vec::new()),
        (Pat::Enum { hash, tag }, Value::Enum(h, t)) if hash == h && tag == t => Some(Vec::new()),
        (Pat::One(inner), Value::One(v)) => match_pat(inner, v),
        (Pat::Empty, Value::Empty) => Some(Vec::new()),
        (Pat::Tuple(ps), Value::Tuple(vs)) if ps.len() == vs.len() => {
            let mut binds = Vec::new();
            for (p, v) in ps.iter().zip(vs) {
                binds.extend(match_pat(p, v)?);
            }
            Some(binds)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Prelude;
    use rill_ir::Type;

    fn run(prelude: &Prelude, expr: &Expr) -> EvalResult {
        prelude
            .interpreter()
            .eval(&Env::new(), &ImplicitEnv::new(), expr)
    }

    fn run_with_implicits(prelude: &Prelude, ienv: &ImplicitEnv, expr: &Expr) -> EvalResult {
        prelude.interpreter().eval(&Env::new(), ienv, expr)
    }

    fn op(prelude: &Prelude, name: &str, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Op {
            pinned: Pinned::Builtin(prelude.op(name).unwrap()),
            op: name.into(),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    fn base_var(prelude: &Prelude, name: &str) -> Expr {
        Expr::Var {
            pinned: Pinned::Builtin(prelude.export_hash("Base", name)),
            ident: ExtIdent::name(name),
        }
    }

    fn bool_enum(tag: &str) -> Expr {
        Expr::Enum {
            pinned: Pinned::Builtin(rill_vc::bool_enum_hash()),
            name: "bool".into(),
            tag: tag.into(),
        }
    }

    fn lam(params: &[&str], body: Expr) -> Expr {
        Expr::Lam {
            params: params.iter().map(|p| Some((*p).to_string())).collect(),
            body: Box::new(body),
        }
    }

    // ── Numeric literals and operators ───────────────────────────

    #[test]
    fn addition_dispatches_on_runtime_reps() {
        let p = Prelude::core();
        let int_int = op(
            &p,
            "+",
            Expr::int_with_rep(3, Type::Int),
            Expr::int_with_rep(4, Type::Int),
        );
        assert_eq!(run(&p, &int_int).unwrap(), Value::Int(7));

        let double_int = op(
            &p,
            "+",
            Expr::int_with_rep(3, Type::Double),
            Expr::int_with_rep(4, Type::Int),
        );
        assert_eq!(run(&p, &double_int).unwrap(), Value::Double(7.0));
    }

    #[test]
    fn bad_runtime_rep_is_rejected() {
        let p = Prelude::core();
        let e = Expr::int_with_rep(3, Type::Text);
        assert_eq!(
            run(&p, &e).unwrap_err(),
            runtime_error("Invalid runtime rep for numeric constant")
        );
    }

    // ── Implicit parameters ──────────────────────────────────────

    #[test]
    fn let_implicit_binds_for_the_body() {
        let p = Prelude::core();
        // let ?x = 3.2 in ?x + 2
        let e = Expr::Let {
            binding: ExtIdent::implicit("x"),
            value: Box::new(Expr::LDouble(3.2)),
            body: Box::new(op(
                &p,
                "+",
                Expr::implicit_var("x"),
                Expr::int_with_rep(2, Type::Double),
            )),
        };
        assert_eq!(run(&p, &e).unwrap(), Value::Double(5.2));
    }

    #[test]
    fn implicit_env_supplies_free_implicits() {
        let p = Prelude::core();
        let e = op(
            &p,
            "+",
            Expr::implicit_var("x"),
            Expr::int_with_rep(2, Type::Int),
        );
        let ienv = ImplicitEnv::new().extended(ExtIdent::implicit("x"), Value::Int(5));
        assert_eq!(run_with_implicits(&p, &ienv, &e).unwrap(), Value::Int(7));

        let err = run(&p, &e).unwrap_err();
        assert_eq!(err, runtime_error("unbound implicit parameter: ?x"));
    }

    #[test]
    fn implicits_are_dynamically_scoped_through_functions() {
        let p = Prelude::core();
        // let f = fun x -> ?y + x in let ?y = 10 in f 1
        let f_body = op(
            &p,
            "+",
            Expr::implicit_var("y"),
            Expr::var("x"),
        );
        let e = Expr::Let {
            binding: ExtIdent::name("f"),
            value: Box::new(lam(&["x"], f_body)),
            body: Box::new(Expr::Let {
                binding: ExtIdent::implicit("y"),
                value: Box::new(Expr::int_with_rep(10, Type::Int)),
                body: Box::new(Expr::app(Expr::var("f"), Expr::int_with_rep(1, Type::Int))),
            }),
        };
        assert_eq!(run(&p, &e).unwrap(), Value::Int(11));
    }

    // ── Case and patterns ────────────────────────────────────────

    #[test]
    fn case_takes_the_first_matching_arm() {
        let p = Prelude::core();
        // match 3.9 - 2.2 with { 0.0 -> #false | _ -> #true }
        let e = Expr::Case {
            scrutinee: Box::new(op(&p, "-", Expr::LDouble(3.9), Expr::LDouble(2.2))),
            arms: vec![
                (Pat::LDouble(0.0), bool_enum("false")),
                (Pat::Wild, bool_enum("true")),
            ],
        };
        assert_eq!(run(&p, &e).unwrap(), Value::bool(true));
    }

    #[test]
    fn case_binds_pattern_variables() {
        let p = Prelude::core();
        // match Some (1, 2) with { Some (a, b) -> a + b | None -> 0 }
        let scrutinee = Expr::One(Box::new(Expr::Tuple(vec![
            Expr::int_with_rep(1, Type::Int),
            Expr::int_with_rep(2, Type::Int),
        ])));
        let e = Expr::Case {
            scrutinee: Box::new(scrutinee),
            arms: vec![
                (
                    Pat::One(Box::new(Pat::Tuple(vec![
                        Pat::Var("a".into()),
                        Pat::Var("b".into()),
                    ]))),
                    op(&p, "+", Expr::var("a"), Expr::var("b")),
                ),
                (Pat::Empty, Expr::int_with_rep(0, Type::Int)),
            ],
        };
        assert_eq!(run(&p, &e).unwrap(), Value::Int(3));
    }

    #[test]
    fn case_without_a_match_is_a_runtime_error() {
        let p = Prelude::core();
        let e = Expr::Case {
            scrutinee: Box::new(Expr::Empty),
            arms: vec![(Pat::One(Box::new(Pat::Wild)), Expr::Empty)],
        };
        assert_eq!(
            run(&p, &e).unwrap_err(),
            runtime_error("non-exhaustive patterns in case")
        );
    }

    // ── Assert ───────────────────────────────────────────────────

    #[test]
    fn assert_false_fails() {
        let p = Prelude::core();
        let e = Expr::Assert {
            cond: Box::new(bool_enum("false")),
            body: Box::new(Expr::Tuple(vec![])),
        };
        assert_eq!(run(&p, &e).unwrap_err(), EvalError::AssertionFailed);

        let ok = Expr::Assert {
            cond: Box::new(bool_enum("true")),
            body: Box::new(Expr::Tuple(vec![])),
        };
        assert_eq!(run(&p, &ok).unwrap(), Value::Tuple(vec![]));
    }

    // ── Functions ────────────────────────────────────────────────

    #[test]
    fn reduce_over_a_range() {
        let p = Prelude::core();
        // Array.reduce (fun x y -> x + max 0 y) 0 ((-3)..3)
        let body = op(
            &p,
            "+",
            Expr::var("x"),
            Expr::app(
                Expr::app(base_var(&p, "max"), Expr::int_with_rep(0, Type::Int)),
                Expr::var("y"),
            ),
        );
        let reduce = |zero_rep: Type| {
            Expr::app(
                Expr::app(
                    Expr::app(
                        Expr::Var {
                            pinned: Pinned::Builtin(p.export_hash("Array", "reduce")),
                            ident: ExtIdent::name("reduce"),
                        },
                        lam(&["x", "y"], body.clone()),
                    ),
                    Expr::int_with_rep(0, zero_rep),
                ),
                op(
                    &p,
                    "..",
                    Expr::int_with_rep(-3, Type::Int),
                    Expr::int_with_rep(3, Type::Int),
                ),
            )
        };
        assert_eq!(run(&p, &reduce(Type::Int)).unwrap(), Value::Int(6));
        assert_eq!(run(&p, &reduce(Type::Double)).unwrap(), Value::Double(6.0));
    }

    #[test]
    fn wildcard_parameters_consume_their_argument() {
        let p = Prelude::core();
        let e = Expr::app(
            Expr::app(
                Expr::Lam {
                    params: vec![None, Some("y".into())],
                    body: Box::new(Expr::var("y")),
                },
                Expr::LText("dropped".into()),
            ),
            Expr::LDouble(1.5),
        );
        assert_eq!(run(&p, &e).unwrap(), Value::Double(1.5));
    }

    #[test]
    fn closures_capture_their_lexical_snapshot() {
        let p = Prelude::core();
        // let a = 1 in let f = fun x -> a + x in let a = 100 in f 2
        let e = Expr::Let {
            binding: ExtIdent::name("a"),
            value: Box::new(Expr::int_with_rep(1, Type::Int)),
            body: Box::new(Expr::Let {
                binding: ExtIdent::name("f"),
                value: Box::new(lam(&["x"], op(&p, "+", Expr::var("a"), Expr::var("x")))),
                body: Box::new(Expr::Let {
                    binding: ExtIdent::name("a"),
                    value: Box::new(Expr::int_with_rep(100, Type::Int)),
                    body: Box::new(Expr::app(
                        Expr::var("f"),
                        Expr::int_with_rep(2, Type::Int),
                    )),
                }),
            }),
        };
        assert_eq!(run(&p, &e).unwrap(), Value::Int(3));
    }

    #[test]
    fn applying_a_non_function_is_a_runtime_error() {
        let p = Prelude::core();
        let e = Expr::app(Expr::LText("f".into()), Expr::Empty);
        assert!(matches!(
            run(&p, &e).unwrap_err(),
            EvalError::RuntimeError(_)
        ));
    }

    // ── Arrays and comprehensions ────────────────────────────────

    #[test]
    fn arrays_evaluate_left_to_right() {
        let p = Prelude::core();
        let e = Expr::Array(vec![
            Expr::int_with_rep(1, Type::Int),
            Expr::int_with_rep(2, Type::Int),
        ]);
        assert_eq!(
            run(&p, &e).unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn comprehension_nests_generators_and_filters() {
        let p = Prelude::core();
        // [x + y | x <- 1..2, y <- 10..11, if x < 2] = [11, 12]
        let e = Expr::ArrayComp {
            body: Box::new(op(&p, "+", Expr::var("x"), Expr::var("y"))),
            sources: vec![
                (
                    "x".into(),
                    op(
                        &p,
                        "..",
                        Expr::int_with_rep(1, Type::Int),
                        Expr::int_with_rep(2, Type::Int),
                    ),
                ),
                (
                    "y".into(),
                    op(
                        &p,
                        "..",
                        Expr::int_with_rep(10, Type::Int),
                        Expr::int_with_rep(11, Type::Int),
                    ),
                ),
            ],
            cond: Some(Box::new(op(
                &p,
                "<",
                Expr::var("x"),
                Expr::int_with_rep(2, Type::Int),
            ))),
        };
        assert_eq!(
            run(&p, &e).unwrap(),
            Value::Array(vec![Value::Int(11), Value::Int(12)])
        );
    }

    #[test]
    fn non_bool_comprehension_filter_is_rejected() {
        let p = Prelude::core();
        let e = Expr::ArrayComp {
            body: Box::new(Expr::var("x")),
            sources: vec![("x".into(), Expr::Array(vec![Expr::Empty]))],
            cond: Some(Box::new(Expr::LText("yes".into()))),
        };
        assert!(matches!(
            run(&p, &e).unwrap_err(),
            EvalError::RuntimeError(_)
        ));
    }

    // ── Strings ──────────────────────────────────────────────────

    #[test]
    fn interpolation_renders_canonical_pretty_forms() {
        let p = Prelude::core();
        let e = Expr::InterpolatedString(vec![
            StrChunk::Lit("value: ".into()),
            StrChunk::Expr(Expr::LDouble(4.0)),
            StrChunk::Lit(", opt: ".into()),
            StrChunk::Expr(Expr::One(Box::new(Expr::LHex(0x1f)))),
        ]);
        assert_eq!(
            run(&p, &e).unwrap(),
            Value::text("value: 4.0, opt: Some 0x1f")
        );
    }

    // ── Wrappers and pinning ─────────────────────────────────────

    #[test]
    fn transparent_wrappers_evaluate_their_inner_expression() {
        let p = Prelude::core();
        let e = Expr::CommentAbove {
            comment: "forty-two".into(),
            inner: Box::new(Expr::Bracketed(Box::new(Expr::OpenModule {
                module: "Array".into(),
                inner: Box::new(Expr::LDouble(42.0)),
            }))),
        };
        assert_eq!(run(&p, &e).unwrap(), Value::Double(42.0));
    }

    #[test]
    fn unpinned_enums_are_rejected() {
        let p = Prelude::core();
        let e = Expr::Enum {
            pinned: Pinned::Local,
            name: "bool".into(),
            tag: "true".into(),
        };
        assert_eq!(
            run(&p, &e).unwrap_err(),
            runtime_error("All enums must be pinned")
        );
    }

    #[test]
    fn hex_literals_are_word64() {
        let p = Prelude::core();
        assert_eq!(run(&p, &Expr::LHex(0xff)).unwrap(), Value::Word64(0xff));
    }

    // ── Pattern matching unit cases ──────────────────────────────

    #[test]
    fn match_pat_compares_words_numerically() {
        assert!(match_pat(&Pat::LHex(0x2a), &Value::Word16(0x2a)).is_some());
        assert!(match_pat(&Pat::LHex(0x2a), &Value::Word64(0x2a)).is_some());
        assert!(match_pat(&Pat::LHex(0x2a), &Value::Int(0x2a)).is_none());
    }

    #[test]
    fn match_pat_merges_tuple_bindings() {
        let pat = Pat::Tuple(vec![Pat::Var("a".into()), Pat::Var("b".into())]);
        let val = Value::Tuple(vec![Value::Int(1), Value::Int(2)]);
        let binds = match_pat(&pat, &val).unwrap();
        assert_eq!(
            binds,
            vec![
                (ExtIdent::name("a"), Value::Int(1)),
                (ExtIdent::name("b"), Value::Int(2)),
            ]
        );
    }
}
