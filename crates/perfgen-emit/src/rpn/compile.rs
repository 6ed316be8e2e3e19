//! RPN equation compiler.

use perfgen_model::{Counter, MetricSet};

use super::Scan;
use super::ir::{Assign, CType, CompiledEquation, Operand, Rvalue};
use super::ops::Op;
use crate::Result;

/// Compile one of `counter`'s equations.
///
/// Tokens are scanned left to right. Each operator pops its operands, emits
/// one or more typed temporary assignments and pushes the last temporary.
/// Exactly one value must remain once the tokens are exhausted; it becomes
/// the return value.
///
/// # Errors
///
/// Fails on unresolvable `$` variables and on malformed equations (operand
/// underflow, or a final stack depth other than one).
pub fn compile_equation(
    set: &MetricSet,
    counter: &Counter,
    equation: &str,
) -> Result<CompiledEquation> {
    let scan = Scan::new(set, &counter.name, equation);
    let mut lowering = Lowering::default();
    let mut stack: Vec<Operand> = Vec::new();

    for token in equation.split_whitespace() {
        let Some(op) = Op::from_mnemonic(token) else {
            stack.push(scan.resolve(token, true)?);
            continue;
        };
        let operands = scan.pop_operands(&mut stack, op.mnemonic(), op.arity())?;
        let result = lowering
            .lower(op, operands)
            .map_err(|reason| scan.malformed(reason))?;
        stack.push(result);
    }

    let ret = scan.single(stack)?;
    Ok(CompiledEquation {
        equation: equation.to_string(),
        stmts: lowering.stmts,
        ret,
    })
}

#[derive(Default)]
struct Lowering {
    stmts: Vec<Assign>,
    next_tmp: u32,
}

impl Lowering {
    fn assign(&mut self, ty: CType, value: Rvalue) -> u32 {
        let tmp = self.next_tmp;
        self.next_tmp += 1;
        self.stmts.push(Assign { ty, tmp, value });
        tmp
    }

    /// Lower one operator; `operands` are in push order.
    fn lower(&mut self, op: Op, operands: Vec<Operand>) -> std::result::Result<Operand, String> {
        let ty = op.result_type();
        let tmp = match (op, <[Operand; 2]>::try_from(operands)) {
            (Op::ReadReg, _) => self.assign(ty, Rvalue::Zero),
            (Op::Read, Ok([Operand::Literal(block), index])) => self.assign(
                ty,
                Rvalue::Accumulator {
                    block: block.to_lowercase(),
                    index,
                },
            ),
            (Op::Read, Ok([block, _])) => {
                return Err(format!("READ expects an accumulator block name, got {block:?}"));
            }
            (Op::FDiv | Op::UDiv, Ok([lhs, rhs])) => {
                let num = self.assign(ty, Rvalue::Operand(lhs));
                let den = self.assign(ty, Rvalue::Operand(rhs));
                self.assign(ty, Rvalue::GuardedDiv { num, den })
            }
            (Op::FMax, Ok([lhs, rhs])) => {
                let a = self.assign(ty, Rvalue::Operand(lhs));
                let b = self.assign(ty, Rvalue::Operand(rhs));
                self.assign(ty, Rvalue::Max(Operand::Temp(a), Operand::Temp(b)))
            }
            (Op::UMin, Ok([lhs, rhs])) => self.assign(ty, Rvalue::Min(lhs, rhs)),
            (_, Ok([lhs, rhs])) => {
                let bin = op
                    .binary()
                    .ok_or_else(|| format!("{op} has no lowering"))?;
                self.assign(ty, Rvalue::Binary { op: bin, lhs, rhs })
            }
            (_, Err(operands)) => {
                return Err(format!("{op} applied to {} operands", operands.len()));
            }
        };
        Ok(Operand::Temp(tmp))
    }
}
