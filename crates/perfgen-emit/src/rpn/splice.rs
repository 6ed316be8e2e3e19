//! Availability expression splicer.

use perfgen_model::MetricSet;

use super::Scan;
use super::ir::Cond;
use super::ops::CondOp;
use crate::Result;

/// Splice an RPN availability expression into a condition tree.
///
/// Only hardware variables may be referenced; the expression gates whether
/// a counter exists at all, so it cannot depend on other counters' values.
///
/// # Errors
///
/// Fails on counter references, unknown `$` variables and malformed
/// expressions.
pub fn splice_expression(set: &MetricSet, counter_name: &str, expression: &str) -> Result<Cond> {
    let scan = Scan::new(set, counter_name, expression);
    let mut stack: Vec<Cond> = Vec::new();

    for token in expression.split_whitespace() {
        let Some(op) = CondOp::from_mnemonic(token) else {
            stack.push(Cond::Leaf(scan.resolve(token, false)?));
            continue;
        };
        let mut operands = scan.pop_operands(&mut stack, op.mnemonic(), op.arity())?;
        let rhs = operands.pop();
        let lhs = operands.pop();
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return Err(scan.malformed(format!("{op} needs two operands")));
        };
        stack.push(Cond::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        });
    }

    scan.single(stack)
}
