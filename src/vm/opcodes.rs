//! The opcode implementation written for the machine [`State`](super::State).
//! This implementation was split up into this file for smaller file sizes and
//! higher cohesion.
//!
//! Every opcode absorbs its own failure modes. Popping an empty frame
//! yields `0`, out of range register access is skipped, and execution
//! simply continues.

use super::State;
use crate::opcode::{Op, OpCode, Value, ValueExt};

impl State {
    /// Will execute a single instruction against the state.
    ///
    /// The instruction pointer is only moved by the jumping opcodes
    /// themselves, fetching is the job of the
    /// [`Runtime`](crate::Runtime).
    pub fn exec(&mut self, op: Op) {
        match op.kind {
            OpCode::Noop | OpCode::Syscall => {}
            OpCode::Push => self.op_push(op.arg),
            OpCode::Pop => self.op_pop(),
            OpCode::Call => self.op_call(op.arg),
            OpCode::Return => self.op_return(),
            OpCode::JumpIf => self.op_jump_if(op.arg),
            OpCode::Compare => self.op_compare(),
            OpCode::Not => self.op_not(),
            OpCode::Inc => self.op_inc(op.arg),
            OpCode::Dec => self.op_dec(op.arg),
            OpCode::Load => self.op_load(op.arg),
            OpCode::Store => self.op_store(op.arg),
            OpCode::Label => self.op_label(),
        }
    }

    /// Will pop the topmost value of the current frame.
    /// Lower frames are never consulted.
    fn pop_value(&mut self) -> Option<Value> {
        let frame = self.stack.get_mut(-1)?;
        let val = frame.get(-1)?;
        frame.pop(1);
        Some(val)
    }

    /// Pushes the argument onto the current frame. An empty stack grows
    /// an auto created frame with a return address of `0` first.
    fn op_push(&mut self, arg: Value) {
        self.stack.push_value(arg);
    }

    /// Pops one value from the current frame.
    fn op_pop(&mut self) {
        self.stack.pop_values(1);
    }

    /// Jumps behind the next label matching the argument.
    /// No frame is pushed, pairing with `return` relies on the auto
    /// created frames of `push`.
    fn op_call(&mut self, arg: Value) {
        if let Some(iptr) = self.script.find_next_label(arg) {
            self.script.jump(iptr as isize + 1);
        }
    }

    /// Pops the current frame and moves execution to its return
    /// address.
    fn op_return(&mut self) {
        if let Some(frame) = self.stack.pop_frame() {
            self.script.jump(frame.ret as isize);
        }
    }

    /// Pops a condition value, consuming it regardless of the branch
    /// outcome, and applies the offset when the condition was true.
    /// An offset of `0` defaults to `1`, skipping the next instruction.
    fn op_jump_if(&mut self, arg: Value) {
        let val = self.stack.get_value(-1);
        if val.is_some() {
            self.stack.pop_values(1);
        }
        if !val.unwrap_or(0).as_bool() {
            return;
        }
        let mut offset = arg as isize;
        if offset == 0 {
            offset = 1;
        }
        self.script.jump_offset(offset);
    }

    /// Pops `rhs`, pops `lhs` and pushes `lhs - rhs`.
    fn op_compare(&mut self) {
        let rhs = self.pop_value().unwrap_or(0);
        let lhs = self.pop_value().unwrap_or(0);
        self.stack.push_value(lhs.wrapping_sub(rhs));
    }

    /// Pops a value and pushes its logical negation.
    fn op_not(&mut self) {
        let val = self.pop_value().unwrap_or(0);
        self.stack.push_value(val.not());
    }

    /// Pops a value and pushes it incremented by the argument.
    /// A step of `0` counts as `1`.
    fn op_inc(&mut self, arg: Value) {
        let val = self.pop_value().unwrap_or(0);
        let step = if arg == 0 { 1 } else { arg };
        self.stack.push_value(val.wrapping_add(step));
    }

    /// Pops a value and pushes it decremented by the argument.
    /// A step of `0` counts as `1`.
    fn op_dec(&mut self, arg: Value) {
        let val = self.pop_value().unwrap_or(0);
        let step = if arg == 0 { 1 } else { arg };
        self.stack.push_value(val.wrapping_sub(step));
    }

    /// Pushes a register value onto the current frame.
    ///
    /// An out of range argument falls back to popping the top of the
    /// stack as a dynamic register index. Something is always pushed,
    /// `0` when both lookups failed.
    fn op_load(&mut self, arg: Value) {
        let mut val = self.registers.load(arg as isize);
        if val.is_none() {
            if let Some(i) = self.stack.get_value(-1) {
                self.stack.pop_values(1);
                val = self.registers.load(i as isize);
            }
        }
        self.stack.push_value(val.unwrap_or(0));
    }

    /// Writes the top of the current frame into a register.
    ///
    /// The static path leaves the top of the stack in place. Only the
    /// dynamic fallback pops, and there the popped value doubles as
    /// both the register index and the stored value.
    fn op_store(&mut self, arg: Value) {
        let val = match self.stack.get_value(-1) {
            Some(val) => val,
            None => return,
        };
        if self.registers.store(arg as isize, val) {
            return;
        }
        if let Some(i) = self.stack.get_value(-1) {
            self.stack.pop_values(1);
            self.registers.store(i as isize, val);
        }
    }

    /// Pops one frame off the stack. Labels act as boundary markers
    /// when executed over.
    fn op_label(&mut self) {
        self.stack.pop(1);
    }
}
