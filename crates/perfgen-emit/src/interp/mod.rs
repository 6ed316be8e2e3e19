//! Reference interpreter for compiled equations.
//!
//! Evaluates the IR the C emitter renders, with the C semantics of the
//! generated code. Literals keep their C constant types, operands go through
//! the usual arithmetic conversions, integer arithmetic wraps, divisions are
//! guarded and each temporary is converted to its declared type. A direct
//! stack evaluator of the RPN text is provided to cross-check the compiler.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use thiserror::Error;

use perfgen_model::hw_vars::HW_VARS;

use crate::metricsets::{OaLayout, RAW_SIZE};
use crate::rpn::{BinOp, CType, CompiledEquation, Cond, CondOp, Op, Operand, Rvalue};

/// Evaluation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EvalError {
    #[error("no value for hardware variable {0}")]
    UnknownHwVar(String),
    #[error("no value for counter {0}")]
    UnknownCounter(String),
    #[error("no base offset for accumulator block {0}")]
    UnknownBlock(String),
    #[error("accumulator index {index} out of bounds (len {len})")]
    OutOfBounds { index: usize, len: usize },
    #[error("token {0} is not a number")]
    NonNumeric(String),
    #[error("temporary tmp{0} used before assignment")]
    UndefinedTemp(u32),
    #[error("malformed expression: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;

/// A C scalar.
///
/// Integer literals take the first of `int`, `unsigned int` (hex and octal
/// only), `long` and `unsigned long` that holds them, like unsuffixed C
/// constants on an LP64 target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F64(f64),
}

/// Conversion rank, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Kind {
    I32,
    U32,
    I64,
    U64,
    F64,
}

impl Value {
    /// Parse a decimal, `0x` hex, octal or floating point literal, with an
    /// optional leading minus.
    #[must_use]
    pub fn parse_literal(text: &str) -> Option<Self> {
        if let Some(rest) = text.strip_prefix('-') {
            return Self::parse_literal(rest).map(Self::negate);
        }
        if !text.bytes().next().is_some_and(|b| b.is_ascii_digit() || b == b'.') {
            return None;
        }
        let hex = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"));
        let octal = text.strip_prefix('0').filter(|rest| {
            !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
        });
        let (digits, radix) = match (hex, octal) {
            (Some(hex), _) => (hex, 16),
            (None, Some(octal)) => (octal, 8),
            (None, None) => (text, 10),
        };
        match u64::from_str_radix(digits, radix) {
            Ok(v) => Some(Self::integer_literal(v, radix == 10)),
            Err(_) if radix == 10 => text.parse::<f64>().ok().map(Self::F64),
            Err(_) => None,
        }
    }

    fn integer_literal(v: u64, decimal: bool) -> Self {
        if let Ok(v) = i32::try_from(v) {
            Self::I32(v)
        } else if let (false, Ok(v)) = (decimal, u32::try_from(v)) {
            Self::U32(v)
        } else if let Ok(v) = i64::try_from(v) {
            Self::I64(v)
        } else {
            Self::U64(v)
        }
    }

    /// Unary minus in the operand's own type.
    fn negate(self) -> Self {
        match self {
            Self::F64(v) => Self::F64(-v),
            _ => Self::from_int(self.kind(), self.int().wrapping_neg()),
        }
    }

    const fn kind(self) -> Kind {
        match self {
            Self::I32(_) => Kind::I32,
            Self::U32(_) => Kind::U32,
            Self::I64(_) => Kind::I64,
            Self::U64(_) => Kind::U64,
            Self::F64(_) => Kind::F64,
        }
    }

    /// Exact for every integer variant; doubles truncate toward zero.
    #[allow(clippy::cast_possible_truncation)]
    fn int(self) -> i128 {
        match self {
            Self::I32(v) => i128::from(v),
            Self::U32(v) => i128::from(v),
            Self::I64(v) => i128::from(v),
            Self::U64(v) => i128::from(v),
            Self::F64(v) => v as i128,
        }
    }

    /// Integers wrap to the width of `kind`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    const fn from_int(kind: Kind, v: i128) -> Self {
        match kind {
            Kind::I32 => Self::I32(v as i32),
            Kind::U32 => Self::U32(v as u32),
            Kind::I64 => Self::I64(v as i64),
            Kind::U64 => Self::U64(v as u64),
            Kind::F64 => Self::F64(v as f64),
        }
    }

    fn cast(self, kind: Kind) -> Self {
        match kind {
            Kind::F64 => Self::F64(self.as_f64()),
            _ => Self::from_int(kind, self.int()),
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn as_u64(self) -> u64 {
        match self {
            Self::F64(v) => v as u64,
            _ => self.int() as u64,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::F64(v) => v,
            _ => self.int() as f64,
        }
    }

    #[must_use]
    pub fn convert(self, ty: CType) -> Self {
        match ty {
            CType::U64 => self.cast(Kind::U64),
            CType::Double => self.cast(Kind::F64),
        }
    }

    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_zero(self) -> bool {
        match self {
            Self::F64(v) => v == 0.0,
            _ => self.int() == 0,
        }
    }

    /// Type both operands of a binary operation are converted to.
    fn common(a: Self, b: Self) -> Kind {
        a.kind().max(b.kind())
    }
}

/// Runtime inputs of generated code.
#[derive(Clone, Debug, Default)]
pub struct EvalContext {
    pub accumulator: Vec<u64>,
    /// `metric_set->{block}_offset`, keyed by lower-case block name.
    pub offsets: FxHashMap<String, usize>,
    /// Keyed by `$`-prefixed token.
    pub hw_vars: FxHashMap<String, Value>,
    /// Values returned by referenced counters' read functions, keyed by `$Symbol`.
    pub counters: FxHashMap<String, Value>,
}

impl EvalContext {
    #[must_use]
    pub fn new(accumulator: Vec<u64>) -> Self {
        Self {
            accumulator,
            ..Self::default()
        }
    }

    /// Zeroed accumulator with the block offsets of `layout`. One entry per
    /// raw report byte is an upper bound on the accumulated counters.
    #[must_use]
    pub fn for_layout(layout: OaLayout) -> Self {
        let a = layout.a_offset();
        let b = a + layout.a_count();
        let c = b + 8;
        let mut ctx = Self::new(vec![0; RAW_SIZE])
            .with_offset("gpu_time", 0)
            .with_offset("a", a)
            .with_offset("b", b)
            .with_offset("c", c)
            .with_offset("perfcnt", c + 8);
        if let Some(offset) = layout.gpu_clock_offset() {
            ctx = ctx.with_offset("gpu_clock", offset);
        }
        ctx
    }

    /// Give every known hardware variable `value`.
    #[must_use]
    pub fn with_all_hw_vars(mut self, value: Value) -> Self {
        for var in HW_VARS {
            self.hw_vars.insert(var.name.to_string(), value);
        }
        self
    }

    #[must_use]
    pub fn with_offset(mut self, block: &str, offset: usize) -> Self {
        self.offsets.insert(block.to_lowercase(), offset);
        self
    }

    #[must_use]
    pub fn with_hw_var(mut self, name: &str, value: Value) -> Self {
        self.hw_vars.insert(name.to_string(), value);
        self
    }

    #[must_use]
    pub fn with_counter(mut self, var: &str, value: Value) -> Self {
        self.counters.insert(var.to_string(), value);
        self
    }

    fn hw_var(&self, name: &str) -> Result<Value> {
        self.hw_vars
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnknownHwVar(name.to_string()))
    }

    fn counter(&self, var: &str) -> Result<Value> {
        self.counters
            .get(var)
            .copied()
            .ok_or_else(|| EvalError::UnknownCounter(var.to_string()))
    }

    fn read(&self, block: &str, index: u64) -> Result<Value> {
        let base = self
            .offsets
            .get(&block.to_lowercase())
            .copied()
            .ok_or_else(|| EvalError::UnknownBlock(block.to_string()))?;
        let index = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(base))
            .unwrap_or(usize::MAX);
        self.accumulator
            .get(index)
            .copied()
            .map(Value::U64)
            .ok_or(EvalError::OutOfBounds {
                index,
                len: self.accumulator.len(),
            })
    }

    /// Value of a `$` token or literal outside compiled code.
    fn token(&self, token: &str) -> Result<Value> {
        if token.starts_with('$') {
            if self.hw_vars.contains_key(token) {
                return self.hw_var(token);
            }
            return self.counter(token);
        }
        Value::parse_literal(token).ok_or_else(|| EvalError::NonNumeric(token.to_string()))
    }
}

/// Evaluate a compiled equation.
///
/// # Errors
///
/// Fails when an input is missing from `ctx` or a literal is not numeric.
pub fn eval_compiled(compiled: &CompiledEquation, ctx: &EvalContext) -> Result<Value> {
    let mut temps: FxHashMap<u32, Value> = FxHashMap::default();
    for stmt in &compiled.stmts {
        let value = eval_rvalue(&stmt.value, ctx, &temps)?;
        temps.insert(stmt.tmp, value.convert(stmt.ty));
    }
    eval_operand(&compiled.ret, ctx, &temps)
}

fn eval_operand(operand: &Operand, ctx: &EvalContext, temps: &FxHashMap<u32, Value>) -> Result<Value> {
    match operand {
        Operand::Literal(text) => {
            Value::parse_literal(text).ok_or_else(|| EvalError::NonNumeric(text.clone()))
        }
        Operand::Temp(id) => temps.get(id).copied().ok_or(EvalError::UndefinedTemp(*id)),
        Operand::HwVar(var) => ctx.hw_var(var.name),
        Operand::CounterRead { var, .. } => ctx.counter(var),
    }
}

fn eval_rvalue(value: &Rvalue, ctx: &EvalContext, temps: &FxHashMap<u32, Value>) -> Result<Value> {
    let operand = |o: &Operand| eval_operand(o, ctx, temps);
    match value {
        Rvalue::Operand(o) => operand(o),
        Rvalue::Binary { op, lhs, rhs } => binary(*op, operand(lhs)?, operand(rhs)?),
        Rvalue::GuardedDiv { num, den } => {
            let num = operand(&Operand::Temp(*num))?;
            let den = operand(&Operand::Temp(*den))?;
            Ok(guarded_div(num, den))
        }
        Rvalue::Min(a, b) => Ok(min_max(operand(a)?, operand(b)?, false)),
        Rvalue::Max(a, b) => Ok(min_max(operand(a)?, operand(b)?, true)),
        Rvalue::Accumulator { block, index } => ctx.read(block, operand(index)?.as_u64()),
        Rvalue::Zero => Ok(Value::U64(0)),
    }
}

fn binary(op: BinOp, a: Value, b: Value) -> Result<Value> {
    if matches!(op, BinOp::Shl | BinOp::Shr) {
        return shift(op, a, b);
    }
    let kind = Value::common(a, b);
    if kind == Kind::F64 {
        let (x, y) = (a.as_f64(), b.as_f64());
        return match op {
            BinOp::Add => Ok(Value::F64(x + y)),
            BinOp::Sub => Ok(Value::F64(x - y)),
            BinOp::Mul => Ok(Value::F64(x * y)),
            _ => Err(not_integer(op)),
        };
    }
    let (x, y) = (a.cast(kind).int(), b.cast(kind).int());
    let v = match op {
        BinOp::Add => x.wrapping_add(y),
        BinOp::Sub => x.wrapping_sub(y),
        BinOp::Mul => x.wrapping_mul(y),
        _ => x & y,
    };
    Ok(Value::from_int(kind, v))
}

fn not_integer(op: BinOp) -> EvalError {
    EvalError::Malformed(format!("{} applied to a double", op.symbol()))
}

/// The result has the type of the left operand. Counts that are negative or
/// not below its width yield 0.
fn shift(op: BinOp, a: Value, b: Value) -> Result<Value> {
    let width = match (a.kind(), b.kind()) {
        (Kind::F64, _) | (_, Kind::F64) => return Err(not_integer(op)),
        (Kind::I32 | Kind::U32, _) => 32,
        _ => 64,
    };
    let amount = b.int();
    if !(0..width).contains(&amount) {
        return Ok(Value::from_int(a.kind(), 0));
    }
    let v = if op == BinOp::Shl {
        a.int() << amount
    } else {
        a.int() >> amount
    };
    Ok(Value::from_int(a.kind(), v))
}

fn guarded_div(num: Value, den: Value) -> Value {
    let kind = Value::common(num, den);
    if den.is_zero() {
        return Value::from_int(kind, 0);
    }
    if kind == Kind::F64 {
        return Value::F64(num.as_f64() / den.as_f64());
    }
    let (x, y) = (num.cast(kind).int(), den.cast(kind).int());
    Value::from_int(kind, x.checked_div(y).unwrap_or(0))
}

fn compare(a: Value, b: Value) -> Option<Ordering> {
    match Value::common(a, b) {
        Kind::F64 => a.as_f64().partial_cmp(&b.as_f64()),
        kind => Some(a.cast(kind).int().cmp(&b.cast(kind).int())),
    }
}

/// `MIN`/`MAX` macro: the chosen operand in the common type.
fn min_max(a: Value, b: Value, max: bool) -> Value {
    let kind = Value::common(a, b);
    let (a, b) = (a.cast(kind), b.cast(kind));
    let ordering = if max { compare(a, b) } else { compare(b, a) };
    if ordering == Some(Ordering::Greater) {
        a
    } else {
        b
    }
}

/// Evaluate an availability condition.
///
/// # Errors
///
/// Fails when a hardware variable has no value in `ctx`.
pub fn eval_cond(cond: &Cond, ctx: &EvalContext) -> Result<bool> {
    Ok(!cond_value(cond, ctx)?.is_zero())
}

fn cond_value(cond: &Cond, ctx: &EvalContext) -> Result<Value> {
    match cond {
        Cond::Leaf(operand) => eval_operand(operand, ctx, &FxHashMap::default()),
        Cond::Binary { op, lhs, rhs } => {
            let (a, b) = (cond_value(lhs, ctx)?, cond_value(rhs, ctx)?);
            let truth = match op {
                CondOp::BitAnd => return binary(BinOp::BitAnd, a, b),
                CondOp::Ugte => matches!(compare(a, b), Some(Ordering::Greater | Ordering::Equal)),
                CondOp::Ult => compare(a, b) == Some(Ordering::Less),
                CondOp::LogicalAnd => !a.is_zero() && !b.is_zero(),
            };
            Ok(Value::I32(i32::from(truth)))
        }
    }
}

enum Item<'a> {
    Token(&'a str),
    Value(Value),
}

/// Evaluate RPN text directly as a stack machine.
///
/// Each operator converts its operands the way the C it is lowered to does:
/// `F*` results are `double` and `U*`, shift and `AND` results are
/// `uint64_t`, computed in the common type of the operands. `FDIV` and
/// `FMAX` convert both operands to `double` first and `UDIV` to `uint64_t`.
/// Both divisions yield 0 for a zero denominator.
///
/// # Errors
///
/// Fails on malformed equations or missing inputs.
pub fn eval_rpn(equation: &str, ctx: &EvalContext) -> Result<Value> {
    let mut stack: Vec<Item<'_>> = Vec::new();
    for token in equation.split_whitespace() {
        let Some(op) = Op::from_mnemonic(token) else {
            stack.push(Item::Token(token));
            continue;
        };
        if stack.len() < op.arity() {
            return Err(EvalError::Malformed(format!("{op} needs {} operands", op.arity())));
        }
        let mut args = stack.split_off(stack.len() - op.arity());
        let value = if op == Op::ReadReg {
            Value::U64(0)
        } else {
            let rhs = args.pop();
            let lhs = args.pop();
            match (lhs, rhs) {
                (Some(lhs), Some(rhs)) => apply(op, lhs, rhs, ctx)?,
                _ => return Err(EvalError::Malformed(format!("{op} needs two operands"))),
            }
        };
        stack.push(Item::Value(value));
    }

    match stack.pop() {
        Some(item) if stack.is_empty() => item_value(item, ctx),
        _ => Err(EvalError::Malformed(format!(
            "expected one value, found {}",
            stack.len() + 1
        ))),
    }
}

fn item_value(item: Item<'_>, ctx: &EvalContext) -> Result<Value> {
    match item {
        Item::Token(token) => ctx.token(token),
        Item::Value(value) => Ok(value),
    }
}

fn apply(op: Op, lhs: Item<'_>, rhs: Item<'_>, ctx: &EvalContext) -> Result<Value> {
    if op == Op::Read {
        let Item::Token(block) = lhs else {
            return Err(EvalError::Malformed("READ expects a block name".to_string()));
        };
        let index = item_value(rhs, ctx)?.as_u64();
        return ctx.read(block, index);
    }

    let (a, b) = (item_value(lhs, ctx)?, item_value(rhs, ctx)?);
    let ty = op.result_type();
    let value = match op {
        Op::FDiv | Op::UDiv => guarded_div(a.convert(ty), b.convert(ty)),
        Op::FMax => min_max(a.convert(ty), b.convert(ty), true),
        Op::UMin => min_max(a, b, false),
        _ => match op.binary() {
            Some(bin) => binary(bin, a, b)?,
            None => return Err(EvalError::Malformed(format!("{op} does not take two values"))),
        },
    };
    Ok(value.convert(ty))
}
