//! Operator tables.

use std::fmt;

use super::ir::{BinOp, CType};

/// Operators accepted in read/max equations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    FAdd,
    FDiv,
    FMax,
    FMul,
    FSub,
    /// `BLOCK INDEX READ`: accumulator value at the block's base offset plus index.
    Read,
    /// Register reads are not captured by the generated code; always 0.
    ReadReg,
    UAdd,
    UDiv,
    UMul,
    USub,
    UMin,
    Shl,
    Shr,
    And,
}

impl Op {
    pub const ALL: [Self; 15] = [
        Self::FAdd,
        Self::FDiv,
        Self::FMax,
        Self::FMul,
        Self::FSub,
        Self::Read,
        Self::ReadReg,
        Self::UAdd,
        Self::UDiv,
        Self::UMul,
        Self::USub,
        Self::UMin,
        Self::Shl,
        Self::Shr,
        Self::And,
    ];

    #[must_use]
    pub fn from_mnemonic(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == token)
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::FAdd => "FADD",
            Self::FDiv => "FDIV",
            Self::FMax => "FMAX",
            Self::FMul => "FMUL",
            Self::FSub => "FSUB",
            Self::Read => "READ",
            Self::ReadReg => "READ_REG",
            Self::UAdd => "UADD",
            Self::UDiv => "UDIV",
            Self::UMul => "UMUL",
            Self::USub => "USUB",
            Self::UMin => "UMIN",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::And => "AND",
        }
    }

    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::ReadReg => 1,
            _ => 2,
        }
    }

    /// Type of the temporaries the operator produces.
    #[must_use]
    pub const fn result_type(self) -> CType {
        match self {
            Self::FAdd | Self::FDiv | Self::FMax | Self::FMul | Self::FSub => CType::Double,
            _ => CType::U64,
        }
    }

    /// Plain infix operators lowered to a single assignment.
    #[must_use]
    pub const fn binary(self) -> Option<BinOp> {
        match self {
            Self::FAdd | Self::UAdd => Some(BinOp::Add),
            Self::FSub | Self::USub => Some(BinOp::Sub),
            Self::FMul | Self::UMul => Some(BinOp::Mul),
            Self::Shl => Some(BinOp::Shl),
            Self::Shr => Some(BinOp::Shr),
            Self::And => Some(BinOp::BitAnd),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Operators accepted in availability expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CondOp {
    BitAnd,
    Ugte,
    Ult,
    LogicalAnd,
}

impl CondOp {
    pub const ALL: [Self; 4] = [Self::BitAnd, Self::Ugte, Self::Ult, Self::LogicalAnd];

    #[must_use]
    pub fn from_mnemonic(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == token)
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::BitAnd => "AND",
            Self::Ugte => "UGTE",
            Self::Ult => "ULT",
            Self::LogicalAnd => "&&",
        }
    }

    #[must_use]
    pub const fn arity(self) -> usize {
        2
    }

    #[must_use]
    pub const fn c_operator(self) -> &'static str {
        match self {
            Self::BitAnd => "&",
            Self::Ugte => ">=",
            Self::Ult => "<",
            Self::LogicalAnd => "&&",
        }
    }
}

impl fmt::Display for CondOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
