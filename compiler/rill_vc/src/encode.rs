//! Canonical byte encoding for hashing.
//!
//! The encoding is tag-prefixed and length-delimited, so it is injective on
//! the semantic content of an object. Normalizations:
//!
//! - transparent wrappers (brackets, comments, module renames/opens) are
//!   skipped entirely;
//! - lexically bound names encode as scope indices, so alpha-equivalent
//!   expressions encode identically; free names and implicit labels encode
//!   as text (implicits are dynamically scoped, their label *is* their
//!   identity);
//! - pinned references encode as the referenced hash alone, which makes
//!   object identity transitive over the dependency graph.

use rill_ir::{Expr, ExtIdent, Pat, Pinned, StrChunk, Type, TypeScheme};

use crate::object::VCObject;

// Scope entry that can never collide with a source identifier.
const HOLE: &str = "\u{0}";

pub(crate) struct Encoder {
    buf: Vec<u8>,
    scope: Vec<String>,
}

impl Encoder {
    pub(crate) fn new() -> Self {
        Encoder {
            buf: Vec::new(),
            scope: Vec::new(),
        }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.buf
    }

    fn u8(&mut self, b: u8) {
        self.buf.push(b);
    }

    fn u64(&mut self, n: u64) {
        self.buf.extend_from_slice(&n.to_le_bytes());
    }

    fn i64(&mut self, n: i64) {
        self.buf.extend_from_slice(&n.to_le_bytes());
    }

    fn f64(&mut self, x: f64) {
        self.buf.extend_from_slice(&x.to_bits().to_le_bytes());
    }

    fn str(&mut self, s: &str) {
        self.u64(s.len() as u64);
        self.buf.extend_from_slice(s.as_bytes());
    }

    fn hash(&mut self, h: &rill_ir::VCObjectHash) {
        self.buf.extend_from_slice(h.as_bytes());
    }

    /// Index of a bound name, innermost binding first.
    fn lookup(&self, name: &str) -> Option<u64> {
        self.scope
            .iter()
            .rev()
            .position(|n| n == name)
            .map(|i| i as u64)
    }

    pub(crate) fn object(&mut self, obj: &VCObject) {
        match obj {
            VCObject::Function { expr, scheme } => {
                self.u8(0x40);
                self.expr(expr);
                self.scheme(scheme);
            }
            VCObject::TestFunction { expr } => {
                self.u8(0x41);
                self.expr(expr);
            }
            VCObject::Module { exports } => {
                self.u8(0x42);
                self.u64(exports.len() as u64);
                for (name, h) in exports {
                    self.str(name);
                    self.hash(h);
                }
            }
            VCObject::Enum { name, constructors } => {
                self.u8(0x43);
                self.str(name);
                self.u64(constructors.len() as u64);
                for c in constructors {
                    self.str(c);
                }
            }
        }
    }

    fn scheme(&mut self, scheme: &TypeScheme) {
        self.u64(scheme.vars.len() as u64);
        for v in &scheme.vars {
            self.str(v);
        }
        self.ty(&scheme.body);
    }

    fn ty(&mut self, t: &Type) {
        match t {
            Type::Int => self.u8(0x30),
            Type::Double => self.u8(0x31),
            Type::Text => self.u8(0x32),
            Type::Time => self.u8(0x33),
            Type::Word16 => self.u8(0x34),
            Type::Word32 => self.u8(0x35),
            Type::Word64 => self.u8(0x36),
            Type::Enum { name, constructors } => {
                self.u8(0x37);
                self.str(name);
                self.u64(constructors.len() as u64);
                for c in constructors {
                    self.str(c);
                }
            }
            Type::Arrow(a, b) => {
                self.u8(0x38);
                self.ty(a);
                self.ty(b);
            }
            Type::Array(e) => {
                self.u8(0x39);
                self.ty(e);
            }
            Type::Optional(e) => {
                self.u8(0x3a);
                self.ty(e);
            }
            Type::Tuple(ts) => {
                self.u8(0x3b);
                self.u64(ts.len() as u64);
                for t in ts {
                    self.ty(t);
                }
            }
            Type::Var(v) => {
                self.u8(0x3c);
                self.str(v);
            }
        }
    }

    fn pinned(&mut self, p: &Pinned, ident_fallback: &str) {
        match p.hash() {
            Some(h) => {
                self.u8(3);
                self.hash(&h);
            }
            None => {
                self.u8(1);
                self.str(ident_fallback);
            }
        }
    }

    fn expr(&mut self, e: &Expr) {
        match e.unwrap_transparent() {
            Expr::LInt(n) => {
                self.u8(0x01);
                self.i64(*n);
            }
            Expr::LDouble(d) => {
                self.u8(0x02);
                self.f64(*d);
            }
            Expr::LHex(w) => {
                self.u8(0x03);
                self.u64(*w);
            }
            Expr::LText(s) => {
                self.u8(0x04);
                self.str(s);
            }
            Expr::InterpolatedString(chunks) => {
                self.u8(0x05);
                self.u64(chunks.len() as u64);
                for c in chunks {
                    match c {
                        StrChunk::Lit(s) => {
                            self.u8(0);
                            self.str(s);
                        }
                        StrChunk::Expr(e) => {
                            self.u8(1);
                            self.expr(e);
                        }
                    }
                }
            }
            Expr::Array(es) => {
                self.u8(0x06);
                self.u64(es.len() as u64);
                for e in es {
                    self.expr(e);
                }
            }
            Expr::ArrayComp {
                body,
                sources,
                cond,
            } => {
                self.u8(0x07);
                self.u64(sources.len() as u64);
                let depth = self.scope.len();
                for (name, src) in sources {
                    self.expr(src);
                    self.scope.push(name.clone());
                }
                match cond {
                    Some(c) => {
                        self.u8(1);
                        self.expr(c);
                    }
                    None => self.u8(0),
                }
                self.expr(body);
                self.scope.truncate(depth);
            }
            Expr::Enum { pinned, tag, .. } => {
                self.u8(0x08);
                self.pinned(pinned, tag);
                self.str(tag);
            }
            Expr::Var { pinned, ident } => {
                self.u8(0x09);
                match (pinned, ident) {
                    (Pinned::Builtin(h) | Pinned::UnderVC(h), _) => {
                        self.u8(3);
                        self.hash(h);
                    }
                    (Pinned::Local, ExtIdent::Name(n)) => match self.lookup(n) {
                        Some(i) => {
                            self.u8(0);
                            self.u64(i);
                        }
                        None => {
                            self.u8(1);
                            self.str(n);
                        }
                    },
                    (Pinned::Local, ExtIdent::Implicit(l)) => {
                        self.u8(2);
                        self.str(l);
                    }
                }
            }
            Expr::TypeRep(t) => {
                self.u8(0x0a);
                self.ty(t);
            }
            Expr::Op {
                pinned,
                op,
                lhs,
                rhs,
            } => {
                self.u8(0x0b);
                self.pinned(pinned, op);
                self.expr(lhs);
                self.expr(rhs);
            }
            Expr::PreOp { pinned, op, rhs } => {
                self.u8(0x0c);
                self.pinned(pinned, op);
                self.expr(rhs);
            }
            Expr::Lam { params, body } => {
                self.u8(0x0d);
                self.u64(params.len() as u64);
                let depth = self.scope.len();
                for p in params {
                    self.scope.push(match p {
                        Some(name) => name.clone(),
                        None => HOLE.to_string(),
                    });
                }
                self.expr(body);
                self.scope.truncate(depth);
            }
            Expr::App { f, arg } => {
                self.u8(0x0e);
                self.expr(f);
                self.expr(arg);
            }
            Expr::Let {
                binding,
                value,
                body,
            } => {
                self.u8(0x0f);
                self.expr(value);
                match binding {
                    ExtIdent::Name(n) => {
                        self.u8(0);
                        let depth = self.scope.len();
                        self.scope.push(n.clone());
                        self.expr(body);
                        self.scope.truncate(depth);
                    }
                    ExtIdent::Implicit(l) => {
                        self.u8(1);
                        self.str(l);
                        self.expr(body);
                    }
                }
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.u8(0x10);
                self.expr(cond);
                self.expr(then_branch);
                self.expr(else_branch);
            }
            Expr::Tuple(es) => {
                self.u8(0x11);
                self.u64(es.len() as u64);
                for e in es {
                    self.expr(e);
                }
            }
            Expr::One(e) => {
                self.u8(0x12);
                self.expr(e);
            }
            Expr::Empty => self.u8(0x13),
            Expr::Assert { cond, body } => {
                self.u8(0x14);
                self.expr(cond);
                self.expr(body);
            }
            Expr::Case { scrutinee, arms } => {
                self.u8(0x15);
                self.expr(scrutinee);
                self.u64(arms.len() as u64);
                for (pat, body) in arms {
                    self.pat(pat);
                    let depth = self.scope.len();
                    push_pat_binders(pat, &mut self.scope);
                    self.expr(body);
                    self.scope.truncate(depth);
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

    fn pat(&mut self, p: &Pat) {
        match p {
            // Binder occurrence: the name is scope-indexed in the body.
            Pat::Var(_) => self.u8(0x20),
            Pat::Wild => self.u8(0x21),
            Pat::LInt(n) => {
                self.u8(0x22);
                self.i64(*n);
            }
            Pat::LDouble(d) => {
                self.u8(0x23);
                self.f64(*d);
            }
            Pat::LHex(w) => {
                self.u8(0x24);
                self.u64(*w);
            }
            Pat::LText(s) => {
                self.u8(0x25);
                self.str(s);
            }
            Pat::Enum { hash, tag } => {
                self.u8(0x26);
                self.hash(hash);
                self.str(tag);
            }
            Pat::One(inner) => {
                self.u8(0x27);
                self.pat(inner);
            }
            Pat::Empty => self.u8(0x28),
            Pat::Tuple(ps) => {
                self.u8(0x29);
                self.u64(ps.len() as u64);
                for p in ps {
                    self.pat(p);
                }
            }
        }
    }
}

/// Collect pattern binders left to right, the order the body's scope sees.
fn push_pat_binders(pat: &Pat, scope: &mut Vec<String>) {
    match pat {
        Pat::Var(name) => scope.push(name.clone()),
        Pat::One(inner) => push_pat_binders(inner, scope),
        Pat::Tuple(ps) => {
            for p in ps {
                push_pat_binders(p, scope);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{VCObject, VCObjectPred};
    use rill_ir::TypeScheme;

    fn fun(expr: Expr) -> VCObject {
        VCObject::Function {
            expr,
            scheme: TypeScheme::mono(Type::Int),
        }
    }

    fn lam(param: &str, body: Expr) -> Expr {
        Expr::Lam {
            params: vec![Some(param.to_string())],
            body: Box::new(body),
        }
    }

    #[test]
    fn hashing_is_deterministic() {
        let obj = fun(Expr::LInt(1));
        assert_eq!(obj.content_hash(), obj.content_hash());
        assert_ne!(obj.content_hash(), fun(Expr::LInt(2)).content_hash());
    }

    #[test]
    fn alpha_equivalent_lambdas_share_a_hash() {
        let a = fun(lam("x", Expr::var("x")));
        let b = fun(lam("y", Expr::var("y")));
        assert_eq!(a.content_hash(), b.content_hash());

        // A free variable of the same shape must not collide with a bound one.
        let free = fun(lam("x", Expr::var("z")));
        assert_ne!(a.content_hash(), free.content_hash());
    }

    #[test]
    fn shadowing_distinguishes_binding_structure() {
        // fun x -> fun y -> x   vs   fun x -> fun y -> y
        let outer = fun(lam("x", lam("y", Expr::var("x"))));
        let inner = fun(lam("x", lam("y", Expr::var("y"))));
        assert_ne!(outer.content_hash(), inner.content_hash());
    }

    #[test]
    fn comments_and_brackets_do_not_affect_the_hash() {
        let plain = fun(Expr::LInt(7));
        let commented = fun(Expr::CommentAbove {
            comment: "seven".into(),
            inner: Box::new(Expr::Bracketed(Box::new(Expr::LInt(7)))),
        });
        assert_eq!(plain.content_hash(), commented.content_hash());
    }

    #[test]
    fn case_binders_are_alpha_stable() {
        let arm = |name: &str| {
            Expr::Case {
                scrutinee: Box::new(Expr::Empty),
                arms: vec![(Pat::One(Box::new(Pat::Var(name.into()))), Expr::var(name))],
            }
        };
        assert_eq!(
            fun(arm("v")).content_hash(),
            fun(arm("w")).content_hash()
        );
    }

    #[test]
    fn provenance_predicates_do_not_alter_hashing() {
        let obj = fun(Expr::LInt(3));
        let h = obj.content_hash();
        // Predicates live alongside the object in a store; the address is
        // a function of the object alone.
        let _with_pred = (obj.clone(), VCObjectPred::Init);
        let _with_other = (
            obj.clone(),
            VCObjectPred::IncompatibleWithPred(h, vec!["signature changed".into()]),
        );
        assert_eq!(obj.content_hash(), h);
    }

    #[test]
    fn referenced_hashes_flow_into_identity() {
        let dep_a = rill_ir::VCObjectHash::new([1; 32]);
        let dep_b = rill_ir::VCObjectHash::new([2; 32]);
        let call = |h| {
            fun(Expr::Var {
                pinned: Pinned::UnderVC(h),
                ident: ExtIdent::name("helper"),
            })
        };
        assert_ne!(call(dep_a).content_hash(), call(dep_b).content_hash());
    }
}
