//! The prelude: builtin modules and their pinned function values.
//!
//! Every export lives twice: once in the module map (name → type and
//! value, the read surface consumed by editor tooling) and once in the
//! pinned environment under its deterministic builtin hash (the address
//! elaborated code actually calls through).
//!
//! Numeric operators promote mixed int/double operands to double; integer
//! arithmetic is checked. Words participate in bit operations, equality,
//! and ordering, not in arithmetic.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use rill_ir::{Ident, Type, VCObjectHash};
use rill_values::cast::{host_fn, CTime, ToValue};
use rill_values::{runtime_error, EvalError, EvalResult, FunValue, ImplicitEnv, Value};

use crate::env::PinnedEnv;
use crate::interpreter::Interpreter;

/// One prelude module: name → (type, value).
#[derive(Clone, Default, Debug)]
pub struct Module {
    pub exports: BTreeMap<Ident, (Type, Value)>,
}

impl Module {
    pub fn get(&self, name: &str) -> Option<&(Type, Value)> {
        self.exports.get(name)
    }
}

/// All prelude modules, keyed by module name.
pub type ModuleMap = BTreeMap<String, Module>;

/// The assembled prelude.
pub struct Prelude {
    modules: ModuleMap,
    pinned: Arc<PinnedEnv>,
    ops: FxHashMap<String, VCObjectHash>,
    pre_ops: FxHashMap<String, VCObjectHash>,
}

impl Prelude {
    /// The core prelude: arithmetic, comparison, logic, words, arrays,
    /// options, text, and time.
    pub fn core() -> Prelude {
        let mut b = Builder::default();

        // Binary operators.
        b.op("+", arith("+", add_i, |a, b| a + b));
        b.op("-", arith("-", sub_i, |a, b| a - b));
        b.op("*", arith("*", mul_i, |a, b| a * b));
        b.op("/", arith("/", div_i, |a, b| a / b));
        b.op("%", arith("%", rem_i, f64::rem_euclid));
        b.op("**", pow_value());
        b.op("..", range_value());
        b.op("?", from_option_value(true));
        b.op("==", fun2(|_ienv, l, r| Ok(Value::bool(l == r))));
        b.op("!=", fun2(|_ienv, l, r| Ok(Value::bool(l != r))));
        b.op("<", cmp_op("<", Ordering::is_lt));
        b.op("<=", cmp_op("<=", Ordering::is_le));
        b.op(">", cmp_op(">", Ordering::is_gt));
        b.op(">=", cmp_op(">=", Ordering::is_ge));
        b.op("&&", logic2("&&", |a, b| a && b));
        b.op("||", logic2("||", |a, b| a || b));

        // Prefix operators.
        b.pre_op("-", negate_value());
        b.pre_op("!", not_value());

        // Base.
        let a = || Type::Var("a".into());
        let num2 = || Type::arrow(a(), Type::arrow(a(), a()));
        b.export("Base", "max", num2(), arith("max", max_i, f64::max));
        b.export("Base", "min", num2(), arith("min", min_i, f64::min));
        b.export("Base", "abs", Type::arrow(a(), a()), abs_value());
        for (name, f) in double_to_int_fns() {
            b.export(
                "Base",
                name,
                Type::arrow(Type::Double, Type::Int),
                f,
            );
        }
        for (name, f) in [
            ("sqrt", f64::sqrt as fn(f64) -> f64),
            ("exp", f64::exp),
            ("ln", f64::ln),
            ("sin", f64::sin),
            ("cos", f64::cos),
            ("tan", f64::tan),
        ] {
            b.export(
                "Base",
                name,
                Type::arrow(Type::Double, Type::Double),
                host_fn(f).to_value(),
            );
        }

        // Word: bit operations preserve the operand width.
        let w = || Type::Word64;
        let word2_ty = || Type::arrow(w(), Type::arrow(w(), w()));
        b.export("Word", "and", word2_ty(), word_binop("Word.and", |a, b| a & b));
        b.export("Word", "or", word2_ty(), word_binop("Word.or", |a, b| a | b));
        b.export("Word", "xor", word2_ty(), word_binop("Word.xor", |a, b| a ^ b));
        let shift_ty = || Type::arrow(w(), Type::arrow(Type::Int, w()));
        b.export("Word", "shiftL", shift_ty(), word_shift("Word.shiftL", shl));
        b.export("Word", "shiftR", shift_ty(), word_shift("Word.shiftR", shr));

        // Array.
        let arr = |t: Type| Type::array(t);
        b.export(
            "Array",
            "length",
            Type::arrow(arr(a()), Type::Int),
            array_length(),
        );
        b.export("Array", "sum", Type::arrow(arr(a()), a()), array_sum());
        b.export(
            "Array",
            "reduce",
            Type::arrow(
                Type::arrow(Type::Var("b".into()), Type::arrow(a(), Type::Var("b".into()))),
                Type::arrow(Type::Var("b".into()), Type::arrow(arr(a()), Type::Var("b".into()))),
            ),
            array_reduce(),
        );
        b.export(
            "Array",
            "map",
            Type::arrow(
                Type::arrow(a(), Type::Var("b".into())),
                Type::arrow(arr(a()), arr(Type::Var("b".into()))),
            ),
            array_map(),
        );
        b.export(
            "Array",
            "filter",
            Type::arrow(
                Type::arrow(a(), Type::bool_enum()),
                Type::arrow(arr(a()), arr(a())),
            ),
            array_filter(),
        );
        b.export(
            "Array",
            "range",
            Type::arrow(Type::Int, Type::arrow(Type::Int, arr(Type::Int))),
            range_value(),
        );

        // Option.
        b.export(
            "Option",
            "fromOption",
            Type::arrow(a(), Type::arrow(Type::optional(a()), a())),
            from_option_value(false),
        );
        b.export(
            "Option",
            "map",
            Type::arrow(
                Type::arrow(a(), Type::Var("b".into())),
                Type::arrow(Type::optional(a()), Type::optional(Type::Var("b".into()))),
            ),
            option_map(),
        );

        // Text.
        b.export(
            "Text",
            "length",
            Type::arrow(Type::Text, Type::Int),
            host_fn(|s: String| s.chars().count() as i64).to_value(),
        );
        b.export(
            "Text",
            "append",
            Type::arrow(Type::Text, Type::arrow(Type::Text, Type::Text)),
            host_fn(|prefix: String| host_fn(move |suffix: String| format!("{prefix}{suffix}")))
                .to_value(),
        );
        b.export(
            "Text",
            "strip",
            Type::arrow(Type::Text, Type::Text),
            host_fn(|s: String| s.trim().to_string()).to_value(),
        );

        // Time.
        b.export(
            "Time",
            "toEpoch",
            Type::arrow(Type::Int, Type::Time),
            host_fn(CTime).to_value(),
        );
        b.export(
            "Time",
            "seconds",
            Type::arrow(Type::Time, Type::Int),
            host_fn(|t: CTime| t.0).to_value(),
        );

        b.finish()
    }

    pub fn modules(&self) -> &ModuleMap {
        &self.modules
    }

    /// An interpreter sharing this prelude's pinned environment.
    pub fn interpreter(&self) -> Interpreter {
        Interpreter::with_shared(self.pinned.clone())
    }

    pub fn pinned(&self) -> Arc<PinnedEnv> {
        self.pinned.clone()
    }

    /// The pinned hash of a binary operator.
    pub fn op(&self, name: &str) -> Option<VCObjectHash> {
        self.ops.get(name).copied()
    }

    /// The pinned hash of a prefix operator.
    pub fn pre_op(&self, name: &str) -> Option<VCObjectHash> {
        self.pre_ops.get(name).copied()
    }

    /// The pinned hash of a module export.
    pub fn export_hash(&self, module: &str, name: &str) -> VCObjectHash {
        rill_vc::builtin_hash(&format!("{module}.{name}"))
    }
}

#[derive(Default)]
struct Builder {
    modules: ModuleMap,
    pinned: PinnedEnv,
    ops: FxHashMap<String, VCObjectHash>,
    pre_ops: FxHashMap<String, VCObjectHash>,
}

impl Builder {
    fn export(&mut self, module: &str, name: &str, ty: Type, value: Value) {
        let hash = rill_vc::builtin_hash(&format!("{module}.{name}"));
        self.pinned.insert(hash, value.clone());
        self.modules
            .entry(module.to_string())
            .or_default()
            .exports
            .insert(name.to_string(), (ty, value));
    }

    fn op(&mut self, name: &str, value: Value) {
        let hash = rill_vc::builtin_hash(&format!("op.{name}"));
        self.pinned.insert(hash, value);
        self.ops.insert(name.to_string(), hash);
    }

    fn pre_op(&mut self, name: &str, value: Value) {
        let hash = rill_vc::builtin_hash(&format!("preop.{name}"));
        self.pinned.insert(hash, value);
        self.pre_ops.insert(name.to_string(), hash);
    }

    fn finish(self) -> Prelude {
        Prelude {
            modules: self.modules,
            pinned: Arc::new(self.pinned),
            ops: self.ops,
            pre_ops: self.pre_ops,
        }
    }
}

// ── Function-value helpers ──────────────────────────────────────

fn fun1(f: impl Fn(&ImplicitEnv, Value) -> EvalResult + Send + Sync + 'static) -> Value {
    Value::Fun(FunValue::new(f))
}

fn fun2(
    f: impl Fn(&ImplicitEnv, Value, Value) -> EvalResult + Send + Sync + Clone + 'static,
) -> Value {
    Value::Fun(FunValue::new(move |_ienv, a| {
        let f = f.clone();
        Ok(Value::Fun(FunValue::new(move |ienv, b| {
            f(ienv, a.clone(), b)
        })))
    }))
}

fn fun3(
    f: impl Fn(&ImplicitEnv, Value, Value, Value) -> EvalResult + Send + Sync + Clone + 'static,
) -> Value {
    Value::Fun(FunValue::new(move |_ienv, a| {
        let f = f.clone();
        Ok(Value::Fun(FunValue::new(move |_ienv, b| {
            let f = f.clone();
            let a = a.clone();
            Ok(Value::Fun(FunValue::new(move |ienv, c| {
                f(ienv, a.clone(), b.clone(), c)
            })))
        })))
    }))
}

fn apply(ienv: &ImplicitEnv, f: &Value, arg: Value) -> EvalResult {
    match f {
        Value::Fun(g) => g.call(ienv, arg),
        other => Err(runtime_error(format!(
            "expected a function, got {}",
            other.kind()
        ))),
    }
}

fn apply2(ienv: &ImplicitEnv, f: &Value, a: Value, b: Value) -> EvalResult {
    let partial = apply(ienv, f, a)?;
    apply(ienv, &partial, b)
}

// ── Arithmetic ──────────────────────────────────────────────────

fn add_i(a: i64, b: i64) -> Result<i64, EvalError> {
    a.checked_add(b)
        .ok_or_else(|| runtime_error("integer overflow in +"))
}

fn sub_i(a: i64, b: i64) -> Result<i64, EvalError> {
    a.checked_sub(b)
        .ok_or_else(|| runtime_error("integer overflow in -"))
}

fn mul_i(a: i64, b: i64) -> Result<i64, EvalError> {
    a.checked_mul(b)
        .ok_or_else(|| runtime_error("integer overflow in *"))
}

fn div_i(a: i64, b: i64) -> Result<i64, EvalError> {
    a.checked_div(b)
        .ok_or_else(|| runtime_error("division by zero"))
}

fn rem_i(a: i64, b: i64) -> Result<i64, EvalError> {
    a.checked_rem_euclid(b)
        .ok_or_else(|| runtime_error("modulo by zero"))
}

fn max_i(a: i64, b: i64) -> Result<i64, EvalError> {
    Ok(a.max(b))
}

fn min_i(a: i64, b: i64) -> Result<i64, EvalError> {
    Ok(a.min(b))
}

/// Promote the numeric pair and apply; mixed int/double goes to double.
fn num_apply(
    name: &str,
    fi: fn(i64, i64) -> Result<i64, EvalError>,
    fd: fn(f64, f64) -> f64,
    l: Value,
    r: Value,
) -> EvalResult {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => fi(a, b).map(Value::Int),
        (Value::Double(a), Value::Double(b)) => Ok(Value::Double(fd(a, b))),
        (Value::Int(a), Value::Double(b)) => Ok(Value::Double(fd(a as f64, b))),
        (Value::Double(a), Value::Int(b)) => Ok(Value::Double(fd(a, b as f64))),
        (l, r) => Err(runtime_error(format!(
            "invalid operands to {name}: {} and {}",
            l.kind(),
            r.kind()
        ))),
    }
}

fn arith(
    name: &'static str,
    fi: fn(i64, i64) -> Result<i64, EvalError>,
    fd: fn(f64, f64) -> f64,
) -> Value {
    fun2(move |_ienv, l, r| num_apply(name, fi, fd, l, r))
}

fn pow_value() -> Value {
    fun2(|_ienv, l, r| match (l, r) {
        (Value::Int(a), Value::Int(b)) => {
            let exp = u32::try_from(b)
                .map_err(|_| runtime_error("negative exponent on an integer base"))?;
            a.checked_pow(exp)
                .map(Value::Int)
                .ok_or_else(|| runtime_error("integer overflow in **"))
        }
        (Value::Double(a), Value::Double(b)) => Ok(Value::Double(a.powf(b))),
        (Value::Int(a), Value::Double(b)) => Ok(Value::Double((a as f64).powf(b))),
        (Value::Double(a), Value::Int(b)) => Ok(Value::Double(a.powf(b as f64))),
        (l, r) => Err(runtime_error(format!(
            "invalid operands to **: {} and {}",
            l.kind(),
            r.kind()
        ))),
    })
}

fn negate_value() -> Value {
    fun1(|_ienv, v| match v {
        Value::Int(n) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| runtime_error("integer overflow in negation")),
        Value::Double(d) => Ok(Value::Double(-d)),
        other => Err(runtime_error(format!("cannot negate {}", other.kind()))),
    })
}

fn abs_value() -> Value {
    fun1(|_ienv, v| match v {
        Value::Int(n) => n
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| runtime_error("integer overflow in abs")),
        Value::Double(d) => Ok(Value::Double(d.abs())),
        other => Err(runtime_error(format!(
            "abs expects a number, got {}",
            other.kind()
        ))),
    })
}

fn double_to_int_fns() -> [(&'static str, Value); 4] {
    fn rounder(name: &'static str, f: fn(f64) -> f64) -> Value {
        fun1(move |_ienv, v| match v {
            Value::Double(d) => Ok(Value::Int(f(d) as i64)),
            Value::Int(n) => Ok(Value::Int(n)),
            other => Err(runtime_error(format!(
                "{name} expects a number, got {}",
                other.kind()
            ))),
        })
    }
    [
        ("floor", rounder("floor", f64::floor)),
        ("ceiling", rounder("ceiling", f64::ceil)),
        ("round", rounder("round", f64::round)),
        ("truncate", rounder("truncate", f64::trunc)),
    ]
}

// ── Comparison and logic ────────────────────────────────────────

fn word_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Word16(w) => Some(u64::from(*w)),
        Value::Word32(w) => Some(u64::from(*w)),
        Value::Word64(w) => Some(*w),
        _ => None,
    }
}

fn cmp_values(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Double(b)) => (*a as f64).partial_cmp(b),
        (Value::Double(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::EpochTime(a), Value::EpochTime(b)) => Some(a.cmp(b)),
        (
            Value::Word16(_) | Value::Word32(_) | Value::Word64(_),
            Value::Word16(_) | Value::Word32(_) | Value::Word64(_),
        ) => Some(word_u64(l)?.cmp(&word_u64(r)?)),
        _ => None,
    }
}

fn cmp_op(name: &'static str, pred: fn(Ordering) -> bool) -> Value {
    fun2(move |_ienv, l, r| match cmp_values(&l, &r) {
        Some(ord) => Ok(Value::bool(pred(ord))),
        None => Err(runtime_error(format!(
            "cannot compare {} and {} with {name}",
            l.kind(),
            r.kind()
        ))),
    })
}

fn logic2(name: &'static str, f: fn(bool, bool) -> bool) -> Value {
    fun2(move |_ienv, l, r| match (l.as_bool(), r.as_bool()) {
        (Some(a), Some(b)) => Ok(Value::bool(f(a, b))),
        _ => Err(runtime_error(format!(
            "invalid operands to {name}: {} and {}",
            l.kind(),
            r.kind()
        ))),
    })
}

fn not_value() -> Value {
    fun1(|_ienv, v| {
        v.as_bool()
            .map(|b| Value::bool(!b))
            .ok_or_else(|| runtime_error(format!("! expects a bool, got {}", v.kind())))
    })
}

// ── Words ───────────────────────────────────────────────────────

fn word_binop(name: &'static str, f: fn(u64, u64) -> u64) -> Value {
    fun2(move |_ienv, l, r| match (&l, &r) {
        (Value::Word16(a), Value::Word16(b)) => Ok(Value::Word16(
            (f(u64::from(*a), u64::from(*b)) & 0xffff) as u16,
        )),
        (Value::Word32(a), Value::Word32(b)) => Ok(Value::Word32(
            (f(u64::from(*a), u64::from(*b)) & 0xffff_ffff) as u32,
        )),
        (Value::Word64(a), Value::Word64(b)) => Ok(Value::Word64(f(*a, *b))),
        _ => Err(runtime_error(format!(
            "{name} expects two words of the same width, got {} and {}",
            l.kind(),
            r.kind()
        ))),
    })
}

fn shl(w: u64, n: u32) -> u64 {
    w.checked_shl(n).unwrap_or(0)
}

fn shr(w: u64, n: u32) -> u64 {
    w.checked_shr(n).unwrap_or(0)
}

fn word_shift(name: &'static str, f: fn(u64, u32) -> u64) -> Value {
    fun2(move |_ienv, l, r| {
        let n = match &r {
            Value::Int(n) if *n >= 0 => u32::try_from(*n).unwrap_or(u32::MAX),
            _ => {
                return Err(runtime_error(format!(
                    "{name} expects a non-negative int shift amount, got {}",
                    r.kind()
                )))
            }
        };
        match &l {
            Value::Word16(a) => Ok(Value::Word16((f(u64::from(*a), n) & 0xffff) as u16)),
            Value::Word32(a) => Ok(Value::Word32((f(u64::from(*a), n) & 0xffff_ffff) as u32)),
            Value::Word64(a) => Ok(Value::Word64(f(*a, n))),
            other => Err(runtime_error(format!(
                "{name} expects a word, got {}",
                other.kind()
            ))),
        }
    })
}

// ── Ranges, arrays, options ─────────────────────────────────────

fn range_value() -> Value {
    fun2(|_ienv, l, r| match (&l, &r) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Array((*a..=*b).map(Value::Int).collect())),
        _ => Err(runtime_error(format!(
            ".. expects two ints, got {} and {}",
            l.kind(),
            r.kind()
        ))),
    })
}

/// `fromOption` and the `?` operator share semantics; only the argument
/// order differs (`opt ? default` vs `fromOption default opt`).
fn from_option_value(option_first: bool) -> Value {
    fun2(move |_ienv, a, b| {
        let (opt, default) = if option_first { (a, b) } else { (b, a) };
        match opt {
            Value::One(v) => Ok(*v),
            Value::Empty => Ok(default),
            other => Err(runtime_error(format!(
                "expected an optional, got {}",
                other.kind()
            ))),
        }
    })
}

fn option_map() -> Value {
    fun2(|ienv, f, opt| match opt {
        Value::One(v) => Ok(Value::One(Box::new(apply(ienv, &f, *v)?))),
        Value::Empty => Ok(Value::Empty),
        other => Err(runtime_error(format!(
            "Option.map expects an optional, got {}",
            other.kind()
        ))),
    })
}

fn array_length() -> Value {
    fun1(|_ienv, v| match v {
        Value::Array(items) => Ok(Value::Int(items.len() as i64)),
        other => Err(runtime_error(format!(
            "Array.length expects an array, got {}",
            other.kind()
        ))),
    })
}

fn array_sum() -> Value {
    fun1(|_ienv, v| match v {
        Value::Array(items) => {
            let mut acc = Value::Int(0);
            for x in items {
                acc = num_apply("Array.sum", add_i, |a, b| a + b, acc, x)?;
            }
            Ok(acc)
        }
        other => Err(runtime_error(format!(
            "Array.sum expects an array, got {}",
            other.kind()
        ))),
    })
}

fn array_reduce() -> Value {
    fun3(|ienv, f, init, arr| match arr {
        Value::Array(items) => {
            let mut acc = init;
            for x in items {
                acc = apply2(ienv, &f, acc, x)?;
            }
            Ok(acc)
        }
        other => Err(runtime_error(format!(
            "Array.reduce expects an array, got {}",
            other.kind()
        ))),
    })
}

fn array_map() -> Value {
    fun2(|ienv, f, arr| match arr {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for x in items {
                out.push(apply(ienv, &f, x)?);
            }
            Ok(Value::Array(out))
        }
        other => Err(runtime_error(format!(
            "Array.map expects an array, got {}",
            other.kind()
        ))),
    })
}

fn array_filter() -> Value {
    fun2(|ienv, f, arr| match arr {
        Value::Array(items) => {
            let mut out = Vec::new();
            for x in items {
                let keep = apply(ienv, &f, x.clone())?;
                match keep.as_bool() {
                    Some(true) => out.push(x),
                    Some(false) => {}
                    None => {
                        return Err(runtime_error(format!(
                            "Array.filter predicate must return a bool, got {}",
                            keep.kind()
                        )))
                    }
                }
            }
            Ok(Value::Array(out))
        }
        other => Err(runtime_error(format!(
            "Array.filter expects an array, got {}",
            other.kind()
        ))),
    })
}
