//! C rendering of compiled equations and conditions.

use std::fmt;

use super::ir::{Assign, CType, CompiledEquation, Cond, Operand, Rvalue};
use crate::writer::CodeWriter;

/// Arguments every generated read/max function takes.
const READ_ARGS: &str = "perf, metric_set, accumulator";

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_name())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Temp(id) => write!(f, "tmp{id}"),
            Self::HwVar(var) => f.write_str(var.c_expr),
            Self::CounterRead { read_sym, .. } => write!(f, "{read_sym}({READ_ARGS})"),
        }
    }
}

impl fmt::Display for Rvalue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand(operand) => write!(f, "{operand}"),
            Self::Binary { op, lhs, rhs } => write!(f, "{lhs} {} {rhs}", op.symbol()),
            Self::GuardedDiv { num, den } => write!(f, "tmp{den} ? tmp{num} / tmp{den} : 0"),
            Self::Min(a, b) => write!(f, "MIN({a}, {b})"),
            Self::Max(a, b) => write!(f, "MAX({a}, {b})"),
            Self::Accumulator { block, index } => {
                write!(f, "accumulator[metric_set->{block}_offset + {index}]")
            }
            Self::Zero => f.write_str("0"),
        }
    }
}

impl fmt::Display for Assign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tmp{} = {};", self.ty, self.tmp, self.value)
    }
}

/// Write the body of a read/max function (without braces).
pub fn write_equation(w: &mut CodeWriter, compiled: &CompiledEquation) {
    w.line(format!("/* RPN equation: {} */", compiled.equation));
    for stmt in &compiled.stmts {
        w.line(stmt.to_string());
    }
    w.blank();
    w.line(format!("return {};", compiled.ret));
}

/// Parenthesize subexpressions containing whitespace.
fn bracket(subexp: String) -> String {
    if subexp.contains(' ') {
        format!("({subexp})")
    } else {
        subexp
    }
}

impl Cond {
    /// Render as a single C expression.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Leaf(operand) => operand.to_string(),
            Self::Binary { op, lhs, rhs } => format!(
                "{} {} {}",
                bracket(lhs.render()),
                op.c_operator(),
                bracket(rhs.render())
            ),
        }
    }

    /// Render the top-level `&&` chain one conjunct per entry, for guards
    /// written one conjunct per line.
    #[must_use]
    pub fn guard_lines(&self) -> Vec<String> {
        let conjuncts = self.conjuncts();
        if conjuncts.len() == 1 {
            return vec![self.render()];
        }
        conjuncts.iter().map(|c| bracket(c.render())).collect()
    }
}
