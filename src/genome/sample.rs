//! Weighted sampling of instructions.

use hashbrown::HashMap;
use once_cell::sync::Lazy;

use crate::{
    definitions::value,
    discrete::{Const, IntVar, IntVarPoint, Piecewise, Range},
    opcode::{Op, OpCode, Value},
};

/// A random variable over opcodes.
pub struct OpCodeVar(Box<dyn IntVar>);

impl OpCodeVar {
    pub fn new(var: impl IntVar + 'static) -> Self {
        Self(Box::new(var))
    }

    /// Will draw an opcode. Out of range draws land on `noop`.
    pub fn sample(&self) -> OpCode {
        let i = self.0.sample();
        if i < 0 || i >= OpCode::ALL.len() as i64 {
            return OpCode::Noop;
        }
        OpCode::ALL[i as usize]
    }
}

/// A random variable over machine values.
pub struct ValueVar(Box<dyn IntVar>);

impl ValueVar {
    pub fn new(var: impl IntVar + 'static) -> Self {
        Self(Box::new(var))
    }

    /// Will draw a value. Out of range draws land on `0`.
    pub fn sample(&self) -> Value {
        let i = self.0.sample();
        if i < value::MIN as i64 || i > value::MAX as i64 {
            return 0;
        }
        i as Value
    }
}

/// How a single opcode takes part in sampling.
pub struct OpConfig {
    /// The relative weight of the opcode.
    pub weight: f64,
    /// The distribution its argument is drawn from.
    pub arg: ValueVar,
}

/// A random variable over whole instructions.
///
/// Built from a per opcode configuration, it first draws the opcode
/// from the piecewise distribution induced by the weights and then the
/// argument from the distribution registered for that opcode.
pub struct OpVar {
    kind: OpCodeVar,
    args: HashMap<OpCode, ValueVar>,
}

impl OpVar {
    /// Will build the variable from an opcode configuration.
    pub fn new(config: Vec<(OpCode, OpConfig)>) -> Self {
        let mut pmf = Vec::with_capacity(config.len());
        let mut args = HashMap::with_capacity(config.len());
        for (op, c) in config {
            pmf.push(IntVarPoint::new(Const(op as i8 as i64), c.weight));
            args.insert(op, c.arg);
        }
        Self {
            kind: OpCodeVar::new(Piecewise::from_pmf(pmf)),
            args,
        }
    }

    /// Will draw one instruction. Opcodes without a registered argument
    /// distribution get an argument of `0`.
    pub fn sample(&self) -> Op {
        let kind = self.kind.sample();
        let arg = self.args.get(&kind).map(|var| var.sample()).unwrap_or(0);
        Op::new(kind, arg)
    }
}

/// The stock sampling configuration.
///
/// Control flow is kept rare, the argument ranges mirror what the
/// opcodes can sensibly address: register indices, small jump offsets
/// and small steps. `syscall` is reserved and never sampled.
pub static DEFAULT_OP_VAR: Lazy<OpVar> = Lazy::new(|| {
    OpVar::new(vec![
        (OpCode::Noop, OpConfig { weight: 3.0, arg: ValueVar::new(Const(0)) }),
        (OpCode::Push, OpConfig { weight: 2.0, arg: ValueVar::new(Range::new(0, 9)) }),
        (OpCode::Pop, OpConfig { weight: 2.0, arg: ValueVar::new(Const(0)) }),
        (OpCode::Call, OpConfig { weight: 1.0, arg: ValueVar::new(Range::new(0, 9)) }),
        (OpCode::Return, OpConfig { weight: 1.0, arg: ValueVar::new(Const(0)) }),
        (OpCode::JumpIf, OpConfig { weight: 2.0, arg: ValueVar::new(Range::new(-8, 9)) }),
        (OpCode::Compare, OpConfig { weight: 1.0, arg: ValueVar::new(Const(0)) }),
        (OpCode::Not, OpConfig { weight: 1.0, arg: ValueVar::new(Const(0)) }),
        (OpCode::Inc, OpConfig { weight: 2.0, arg: ValueVar::new(Range::new(0, 3)) }),
        (OpCode::Dec, OpConfig { weight: 2.0, arg: ValueVar::new(Range::new(0, 3)) }),
        (OpCode::Load, OpConfig { weight: 2.0, arg: ValueVar::new(Range::new(0, 9)) }),
        (OpCode::Store, OpConfig { weight: 2.0, arg: ValueVar::new(Range::new(0, 9)) }),
        (OpCode::Label, OpConfig { weight: 1.0, arg: ValueVar::new(Range::new(0, 9)) }),
    ])
});

/// Will draw `n` independent instructions.
pub fn sample_n(var: &OpVar, n: usize) -> Vec<Op> {
    (0..n).map(|_| var.sample()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_var_bounds() {
        assert_eq!(OpCode::Push, OpCodeVar::new(Const(1)).sample());
        assert_eq!(OpCode::Syscall, OpCodeVar::new(Const(13)).sample());
        assert_eq!(OpCode::Noop, OpCodeVar::new(Const(14)).sample());
        assert_eq!(OpCode::Noop, OpCodeVar::new(Const(-1)).sample());
    }

    #[test]
    fn test_value_var_bounds() {
        assert_eq!(-5, ValueVar::new(Const(-5)).sample());
        assert_eq!(127, ValueVar::new(Const(127)).sample());
        assert_eq!(0, ValueVar::new(Const(128)).sample());
        assert_eq!(0, ValueVar::new(Const(-129)).sample());
    }

    #[test]
    fn test_default_sampling() {
        let code = sample_n(&DEFAULT_OP_VAR, 500);
        assert_eq!(500, code.len());
        for op in &code {
            // syscall carries no weight and must never come up
            assert_ne!(OpCode::Syscall, op.kind);
            match op.kind {
                OpCode::JumpIf => assert!((-8..9).contains(&op.arg)),
                OpCode::Push | OpCode::Load | OpCode::Store => {
                    assert!((0..9).contains(&op.arg))
                }
                OpCode::Inc | OpCode::Dec => assert!((0..3).contains(&op.arg)),
                OpCode::Noop | OpCode::Pop | OpCode::Compare | OpCode::Not => {
                    assert_eq!(0, op.arg)
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_single_entry_config() {
        let var = OpVar::new(vec![(
            OpCode::Push,
            OpConfig { weight: 1.0, arg: ValueVar::new(Const(99)) },
        )]);
        for _ in 0..50 {
            assert_eq!(Op::new(OpCode::Push, 99), var.sample());
        }
    }
}
