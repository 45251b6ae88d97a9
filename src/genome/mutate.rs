//! Per instruction mutation of programs.

use once_cell::sync::Lazy;

use super::{sample::OpVar, DEFAULT_OP_VAR};
use crate::{
    discrete::{Const, IntVar, IntVarPoint, Piecewise, Range},
    opcode::Op,
};

/// What happens to a single instruction during mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum Change {
    /// Keep the instruction as is.
    None = 0,
    /// Keep the instruction and insert a fresh one after it.
    Insert = 1,
    /// Drop the instruction.
    Delete = 2,
    /// Swap the instruction for a fresh one.
    Replace = 3,
}

/// A random variable over changes.
pub struct ChangeVar(Box<dyn IntVar>);

impl ChangeVar {
    pub fn new(var: impl IntVar + 'static) -> Self {
        Self(Box::new(var))
    }

    /// Will draw one change. Out of range draws count as keeping the
    /// instruction.
    pub fn sample(&self) -> Change {
        match self.0.sample() {
            1 => Change::Insert,
            2 => Change::Delete,
            3 => Change::Replace,
            _ => Change::None,
        }
    }
}

/// The stock change distribution: nine out of ten instructions are kept
/// untouched, the rest split evenly over insert, delete and replace.
pub static DEFAULT_CHANGE: Lazy<ChangeVar> = Lazy::new(|| {
    ChangeVar::new(Piecewise::from_pmf(vec![
        IntVarPoint::new(Const(Change::None as i64), 0.9),
        IntVarPoint::new(
            Range::new(Change::Insert as i64, Change::Replace as i64 + 1),
            0.1,
        ),
    ]))
});

/// Will walk the program once and apply an independently drawn change
/// to every instruction. The result may be shorter or longer than the
/// input.
pub fn mutate(cv: &ChangeVar, ov: &OpVar, code: &[Op]) -> Vec<Op> {
    let mut out = Vec::with_capacity(code.len());
    for &op in code {
        match cv.sample() {
            Change::Insert => {
                out.push(op);
                out.push(ov.sample());
            }
            Change::Delete => continue,
            Change::Replace => out.push(ov.sample()),
            Change::None => out.push(op),
        }
    }
    out
}

/// Will mutate with the stock distributions.
pub fn mutate_default(code: &[Op]) -> Vec<Op> {
    mutate(&DEFAULT_CHANGE, &DEFAULT_OP_VAR, code)
}
