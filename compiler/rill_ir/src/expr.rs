//! The pinned, elaborated expression tree.
//!
//! Every enum occurrence and operator application carries a `Pinned` tag
//! resolved during elaboration; evaluation rejects un-pinned occurrences.
//! Numeric literals are *not* values: inference wraps each in an
//! application to a `TypeRep` witness, and the evaluator dispatches on the
//! witness at runtime.
//!
//! Comment and bracket nodes are transparent: they survive elaboration so
//! tooling can reproduce the source, but evaluation and hashing look
//! through them.

use crate::ident::{ExtIdent, Ident, Pinned};
use crate::types::Type;

/// One chunk of an interpolated string literal.
#[derive(Clone, PartialEq, Debug)]
pub enum StrChunk {
    /// A literal text piece.
    Lit(String),
    /// An interpolated sub-expression, rendered through the canonical
    /// pretty form.
    Expr(Expr),
}

/// An elaborated expression.
#[derive(Clone, PartialEq, Debug)]
pub enum Expr {
    /// Integer literal; evaluates to a type-dispatched function over a
    /// runtime type witness.
    LInt(i64),
    LDouble(f64),
    /// Hex literal, always a 64-bit word.
    LHex(u64),
    LText(String),
    InterpolatedString(Vec<StrChunk>),
    Array(Vec<Expr>),
    /// `[body | x1 <- src1, ..., xk <- srck, if cond]`
    ArrayComp {
        body: Box<Expr>,
        sources: Vec<(Ident, Expr)>,
        cond: Option<Box<Expr>>,
    },
    /// An enum constructor occurrence, e.g. `#true`.
    Enum {
        pinned: Pinned,
        name: Ident,
        tag: Ident,
    },
    Var {
        pinned: Pinned,
        ident: ExtIdent,
    },
    TypeRep(Type),
    /// Binary operator application; the operator itself lives in the
    /// pinned environment as a curried function.
    Op {
        pinned: Pinned,
        op: Ident,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Prefix operator application.
    PreOp {
        pinned: Pinned,
        op: Ident,
        rhs: Box<Expr>,
    },
    /// `fun p1 ... pn -> body`; `None` parameters are wildcards.
    Lam {
        params: Vec<Option<Ident>>,
        body: Box<Expr>,
    },
    App {
        f: Box<Expr>,
        arg: Box<Expr>,
    },
    /// `let x = value in body`; an implicit binding (`let ?x = ...`)
    /// extends the implicit environment for the body instead.
    Let {
        binding: ExtIdent,
        value: Box<Expr>,
        body: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Tuple(Vec<Expr>),
    One(Box<Expr>),
    Empty,
    Assert {
        cond: Box<Expr>,
        body: Box<Expr>,
    },
    Case {
        scrutinee: Box<Expr>,
        arms: Vec<(Pat, Expr)>,
    },
    // Transparent wrappers.
    Bracketed(Box<Expr>),
    CommentAbove {
        comment: String,
        inner: Box<Expr>,
    },
    CommentAfter {
        inner: Box<Expr>,
        comment: String,
    },
    CommentBelow {
        inner: Box<Expr>,
        comment: String,
    },
    RenameModule {
        from: Ident,
        to: Ident,
        inner: Box<Expr>,
    },
    OpenModule {
        module: Ident,
        inner: Box<Expr>,
    },
}

/// A source pattern inside a `Case` arm.
///
/// Elaboration guarantees linearity: no name occurs twice in one pattern.
#[derive(Clone, PartialEq, Debug)]
pub enum Pat {
    Var(Ident),
    Wild,
    LInt(i64),
    LDouble(f64),
    LHex(u64),
    LText(String),
    Enum {
        hash: crate::hash::VCObjectHash,
        tag: Ident,
    },
    One(Box<Pat>),
    Empty,
    Tuple(Vec<Pat>),
}

impl Expr {
    pub fn app(f: Expr, arg: Expr) -> Expr {
        Expr::App {
            f: Box::new(f),
            arg: Box::new(arg),
        }
    }

    /// A local variable occurrence.
    pub fn var(name: impl Into<Ident>) -> Expr {
        Expr::Var {
            pinned: Pinned::Local,
            ident: ExtIdent::Name(name.into()),
        }
    }

    /// An implicit-parameter occurrence (`?name`).
    pub fn implicit_var(name: impl Into<Ident>) -> Expr {
        Expr::Var {
            pinned: Pinned::Local,
            ident: ExtIdent::Implicit(name.into()),
        }
    }

    /// An integer literal already applied to its runtime type witness.
    pub fn int_with_rep(n: i64, rep: Type) -> Expr {
        Expr::app(Expr::LInt(n), Expr::TypeRep(rep))
    }

    /// Strip transparent wrappers down to the semantic node.
    pub fn unwrap_transparent(&self) -> &Expr {
        let mut e = self;
        loop {
            match e {
                Expr::Bracketed(inner)
                | Expr::CommentAbove { inner, .. }
                | Expr::CommentAfter { inner, .. }
                | Expr::CommentBelow { inner, .. }
                | Expr::RenameModule { inner, .. }
                | Expr::OpenModule { inner, .. } => e = inner,
                _ => return e,
            }
        }
    }

    /// Visit every `Pinned` tag reachable from this expression, in
    /// left-to-right source order.
    pub fn visit_pinned(&self, f: &mut impl FnMut(&Pinned)) {
        match self.unwrap_transparent() {
            Expr::LInt(_)
            | Expr::LDouble(_)
            | Expr::LHex(_)
            | Expr::LText(_)
            | Expr::TypeRep(_)
            | Expr::Empty => {}
            Expr::InterpolatedString(chunks) => {
                for c in chunks {
                    if let StrChunk::Expr(e) = c {
                        e.visit_pinned(f);
                    }
                }
            }
            Expr::Array(es) | Expr::Tuple(es) => {
                for e in es {
                    e.visit_pinned(f);
                }
            }
            Expr::ArrayComp {
                body,
                sources,
                cond,
            } => {
                body.visit_pinned(f);
                for (_, src) in sources {
                    src.visit_pinned(f);
                }
                if let Some(c) = cond {
                    c.visit_pinned(f);
                }
            }
            Expr::Enum { pinned, .. } | Expr::Var { pinned, .. } => f(pinned),
            Expr::Op {
                pinned, lhs, rhs, ..
            } => {
                f(pinned);
                lhs.visit_pinned(f);
                rhs.visit_pinned(f);
            }
            Expr::PreOp { pinned, rhs, .. } => {
                f(pinned);
                rhs.visit_pinned(f);
            }
            Expr::Lam { body, .. } => body.visit_pinned(f),
            Expr::App { f: fun, arg } => {
                fun.visit_pinned(f);
                arg.visit_pinned(f);
            }
            Expr::Let { value, body, .. } => {
                value.visit_pinned(f);
                body.visit_pinned(f);
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                cond.visit_pinned(f);
                then_branch.visit_pinned(f);
                else_branch.visit_pinned(f);
            }
            Expr::One(e) => e.visit_pinned(f),
            Expr::Assert { cond, body } => {
                cond.visit_pinned(f);
                body.visit_pinned(f);
            }
            Expr::Case { scrutinee, arms } => {
                scrutinee.visit_pinned(f);
                for (_, body) in arms {
                    body.visit_pinned(f);
                }
            }
            // unwrap_transparent never returns a wrapper
            Expr::Bracketed(_)
            | Expr::CommentAbove { .. }
            | Expr::CommentAfter { .. }
            | Expr::CommentBelow { .. }
            | Expr::RenameModule { .. }
            | Expr::OpenModule { .. } => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::VCObjectHash;

    #[test]
    fn unwrap_transparent_strips_wrapper_chains() {
        let e = Expr::CommentAbove {
            comment: "the answer".into(),
            inner: Box::new(Expr::Bracketed(Box::new(Expr::LInt(42)))),
        };
        assert_eq!(e.unwrap_transparent(), &Expr::LInt(42));
    }

    #[test]
    fn visit_pinned_sees_nested_references() {
        let h = VCObjectHash::new([7; 32]);
        let e = Expr::Op {
            pinned: Pinned::Builtin(h),
            op: "+".into(),
            lhs: Box::new(Expr::var("x")),
            rhs: Box::new(Expr::Enum {
                pinned: Pinned::UnderVC(h),
                name: "bool".into(),
                tag: "true".into(),
            }),
        };
        let mut seen = Vec::new();
        e.visit_pinned(&mut |p| seen.push(*p));
        assert_eq!(
            seen,
            vec![Pinned::Builtin(h), Pinned::Local, Pinned::UnderVC(h)]
        );
    }
}
