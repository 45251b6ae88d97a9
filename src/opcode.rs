//! Opcode and value abstractions, functionality and constants.
use std::fmt;

use hashbrown::HashMap;
use once_cell::sync::Lazy;

/// The scalar type every program computes with.
///
/// The boolean view of a value maps `0` to `false` and everything else to
/// `true`. All arithmetic on values wraps in two's complement.
pub type Value = i8;

/// These are special traits used to interpret values
/// the way the machine does.
pub trait ValueExt {
    /// The boolean view of the value.
    ///
    /// # Example
    /// ```rust
    /// # use evo::opcode::ValueExt;
    /// assert!(!0i8.as_bool());
    /// assert!(42i8.as_bool());
    /// assert!((-1i8).as_bool());
    /// ```
    fn as_bool(self) -> bool;

    /// The logical negation of the value.
    ///
    /// # Example
    /// ```rust
    /// # use evo::opcode::ValueExt;
    /// assert_eq!(0i8.not(), 1);
    /// assert_eq!(5i8.not(), 0);
    /// assert_eq!((-5i8).not(), 0);
    /// ```
    fn not(self) -> Value;
}

impl ValueExt for Value {
    fn as_bool(self) -> bool {
        self != 0
    }

    fn not(self) -> Value {
        if self == 0 {
            1
        } else {
            0
        }
    }
}

/// implOpCodes is a macro responsible for creating the boilerplate code
/// needed for the opcode convertions and name tables.
macro_rules! implOpCodes {
    ($( $(#[$doc:meta])* $name:ident = $num:literal => $text:literal ),+ $(,)? ) => {
        /// The closed enumeration of machine instructions.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i8)]
        pub enum OpCode {
            $(
                $(#[$doc])*
                $name = $num,
            )+
        }

        impl OpCode {
            /// All opcodes in encoding order.
            pub const ALL: &'static [OpCode] = &[ $( OpCode::$name ),+ ];

            /// Maps the wire encoding back onto an opcode.
            pub fn from_i8(i: i8) -> Option<OpCode> {
                match i {
                    $( $num => Some(OpCode::$name), )+
                    _ => None,
                }
            }

            /// The lowercase mnemonic used by the text format.
            pub fn name(self) -> &'static str {
                match self {
                    $( OpCode::$name => $text, )+
                }
            }
        }
    };
}

implOpCodes!(
    /// Does nothing.
    Noop = 0 => "noop",
    /// Pushes the argument onto the current frame.
    Push = 1 => "push",
    /// Pops one value from the current frame.
    Pop = 2 => "pop",
    /// Jumps behind the next matching label.
    Call = 3 => "call",
    /// Pops the current frame and jumps to its return address.
    Return = 4 => "return",
    /// Pops a condition and applies the jump offset when it is true.
    JumpIf = 5 => "jumpif",
    /// Pops two values and pushes their difference.
    Compare = 6 => "compare",
    /// Pops a value and pushes its logical negation.
    Not = 7 => "not",
    /// Pops a value and pushes it incremented by the step argument.
    Inc = 8 => "inc",
    /// Pops a value and pushes it decremented by the step argument.
    Dec = 9 => "dec",
    /// Pushes a register value onto the current frame.
    Load = 10 => "load",
    /// Writes the top of the current frame into a register.
    Store = 11 => "store",
    /// Marks a call target, pops one frame when executed.
    Label = 12 => "label",
    /// Reserved, behaves like [`Noop`](OpCode::Noop).
    Syscall = 13 => "syscall",
);

/// Lookup table from mnemonic to opcode, built once on first use.
static OP_NAMES: Lazy<HashMap<&'static str, OpCode>> =
    Lazy::new(|| OpCode::ALL.iter().map(|&op| (op.name(), op)).collect());

impl OpCode {
    /// Maps a lowercase mnemonic onto the opcode it names.
    pub fn from_name(name: &str) -> Option<OpCode> {
        OP_NAMES.get(name).copied()
    }
}

impl Default for OpCode {
    fn default() -> Self {
        OpCode::Noop
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single instruction, the unit every program is made of.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Op {
    /// What the instruction does.
    pub kind: OpCode,
    /// The instruction operand, meaning depends on the kind.
    pub arg: Value,
}

impl Op {
    /// Will create a new instruction from its parts.
    pub fn new(kind: OpCode, arg: Value) -> Self {
        Self { kind, arg }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for &op in OpCode::ALL {
            assert_eq!(Some(op), OpCode::from_i8(op as i8));
            assert_eq!(Some(op), OpCode::from_name(op.name()));
        }
        assert_eq!(None, OpCode::from_i8(14));
        assert_eq!(None, OpCode::from_i8(-1));
        assert_eq!(None, OpCode::from_name("frobnicate"));
        // mnemonics are matched exactly, no case folding
        assert_eq!(None, OpCode::from_name("Push"));
    }

    #[test]
    fn test_value_not() {
        assert_eq!(1, 0i8.not());
        for v in [1i8, -1, 127, -128] {
            assert_eq!(0, v.not());
        }
    }

    #[test]
    fn test_default_op() {
        let op = Op::default();
        assert_eq!(OpCode::Noop, op.kind);
        assert_eq!(0, op.arg);
    }
}
