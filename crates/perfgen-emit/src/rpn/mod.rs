//! RPN equations and availability expressions.
//!
//! Equations are compiled into a small typed IR (one temporary per
//! assignment) which is then rendered to C. Availability expressions are
//! spliced into a single boolean condition tree.

mod compile;
mod ir;
mod ops;
mod render;
mod splice;

pub use compile::compile_equation;
pub use ir::*;
pub use ops::*;
pub use render::write_equation;
pub use splice::splice_expression;

use perfgen_model::{MetricSet, hw_vars};

use crate::EmitError;

/// Diagnostic context for one equation or expression being scanned.
struct Scan<'a> {
    set: &'a MetricSet,
    counter: &'a str,
    equation: &'a str,
}

impl<'a> Scan<'a> {
    const fn new(set: &'a MetricSet, counter: &'a str, equation: &'a str) -> Self {
        Self {
            set,
            counter,
            equation,
        }
    }

    /// Resolve a non-operator token. Counter references are only accepted
    /// when `allow_counters` is set.
    fn resolve(&self, token: &str, allow_counters: bool) -> Result<Operand, EmitError> {
        if !token.starts_with('$') {
            return Ok(Operand::Literal(token.to_string()));
        }
        if let Some(var) = hw_vars::lookup(token) {
            return Ok(Operand::HwVar(var));
        }
        match self.set.counter_by_var(token) {
            Some(counter) if allow_counters => Ok(Operand::CounterRead {
                var: token.to_string(),
                read_sym: counter.read_sym.clone(),
            }),
            Some(_) => Err(EmitError::CounterInExpression {
                set: self.set.name.clone(),
                counter: self.counter.to_string(),
                variable: token.to_string(),
                equation: self.equation.to_string(),
            }),
            None => Err(EmitError::UnresolvedVariable {
                set: self.set.name.clone(),
                counter: self.counter.to_string(),
                variable: token.to_string(),
                equation: self.equation.to_string(),
            }),
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> EmitError {
        EmitError::MalformedEquation {
            set: self.set.name.clone(),
            counter: self.counter.to_string(),
            equation: self.equation.to_string(),
            reason: reason.into(),
        }
    }

    /// Pop `arity` values, returned in push order (left operand first).
    fn pop_operands<T>(&self, stack: &mut Vec<T>, mnemonic: &str, arity: usize) -> Result<Vec<T>, EmitError> {
        if stack.len() < arity {
            return Err(self.malformed(format!(
                "{mnemonic} needs {arity} operands but only {} available",
                stack.len()
            )));
        }
        Ok(stack.split_off(stack.len() - arity))
    }

    fn single<T>(&self, mut stack: Vec<T>) -> Result<T, EmitError> {
        match stack.len() {
            1 => stack.pop().ok_or_else(|| self.malformed("empty stack")),
            0 => Err(self.malformed("no value left on the stack")),
            n => Err(self.malformed(format!("{n} values left on the stack"))),
        }
    }
}

#[cfg(test)]
mod tests;
