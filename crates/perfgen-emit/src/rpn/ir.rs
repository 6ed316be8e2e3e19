//! Compiled equation IR.

use perfgen_model::HwVar;

use super::ops::CondOp;

/// C type of a temporary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CType {
    U64,
    Double,
}

impl CType {
    #[must_use]
    pub const fn c_name(self) -> &'static str {
        match self {
            Self::U64 => "uint64_t",
            Self::Double => "double",
        }
    }
}

/// A value on the RPN stack after resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// Numeric literal or accumulator block name, emitted verbatim.
    Literal(String),
    Temp(u32),
    HwVar(&'static HwVar),
    /// Call to another counter's read function.
    CounterRead { var: String, read_sym: String },
}

/// Infix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Shl,
    Shr,
    BitAnd,
}

impl BinOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::BitAnd => "&",
        }
    }
}

/// Right-hand side of a temporary assignment.
#[derive(Clone, Debug, PartialEq)]
pub enum Rvalue {
    Operand(Operand),
    Binary {
        op: BinOp,
        lhs: Operand,
        rhs: Operand,
    },
    /// `tmp{den} ? tmp{num} / tmp{den} : 0`
    GuardedDiv { num: u32, den: u32 },
    Min(Operand, Operand),
    Max(Operand, Operand),
    /// `accumulator[metric_set->{block}_offset + index]`
    Accumulator { block: String, index: Operand },
    Zero,
}

/// `{ty} tmp{tmp} = {value};`
#[derive(Clone, Debug, PartialEq)]
pub struct Assign {
    pub ty: CType,
    pub tmp: u32,
    pub value: Rvalue,
}

/// A compiled read or max equation.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledEquation {
    /// Source RPN text.
    pub equation: String,
    pub stmts: Vec<Assign>,
    /// Returned value.
    pub ret: Operand,
}

impl CompiledEquation {
    /// Number of temporaries declared.
    #[must_use]
    pub fn temp_count(&self) -> usize {
        self.stmts.len()
    }
}

/// Availability condition tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Cond {
    Leaf(Operand),
    Binary {
        op: CondOp,
        lhs: Box<Cond>,
        rhs: Box<Cond>,
    },
}

impl Cond {
    /// Operands of the top-level `&&` chain, left to right.
    #[must_use]
    pub fn conjuncts(&self) -> Vec<&Self> {
        match self {
            Self::Binary {
                op: CondOp::LogicalAnd,
                lhs,
                rhs,
            } => {
                let mut out = lhs.conjuncts();
                out.extend(rhs.conjuncts());
                out
            }
            _ => vec![self],
        }
    }
}
