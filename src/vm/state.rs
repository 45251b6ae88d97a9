//! The state structs that make up a machine instance.

use serde::Serialize;
use tinyvec::ArrayVec;

use crate::{
    definitions::stack,
    opcode::{Op, OpCode, Value},
};

/// Resolves an index that may count from the end into `[0, max)`.
/// Returns `None` for anything that lands outside the window.
fn offset_index(max: usize, idx: isize) -> Option<usize> {
    let idx = if idx < 0 { max as isize + idx } else { idx };
    if idx < 0 || idx >= max as isize {
        None
    } else {
        Some(idx as usize)
    }
}

/// Clamps an instruction pointer candidate into `[0, max]`.
/// Note that `max` itself is a legal resting point, it marks a
/// halted script.
fn clamp_index(max: usize, i: isize) -> usize {
    if i < 0 {
        0
    } else if i as usize > max {
        max
    } else {
        i as usize
    }
}

/// The register file of the machine.
///
/// The length is fixed at construction time. Access outside of
/// `[0, len)` fails silently, the opcodes decide how to proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers(Vec<Value>);

impl Registers {
    /// Will create a register file of the given size, zeroed.
    pub fn new(size: usize) -> Self {
        Self(vec![0; size])
    }

    /// Will read the register at `idx`.
    /// Returns `None` exactly when `idx` is out of range.
    pub fn load(&self, idx: isize) -> Option<Value> {
        if idx < 0 || idx >= self.0.len() as isize {
            return None;
        }
        Some(self.0[idx as usize])
    }

    /// Will write the register at `idx`.
    /// Returns `false` and leaves the file untouched when `idx` is out
    /// of range.
    pub fn store(&mut self, idx: isize, val: Value) -> bool {
        if idx < 0 || idx >= self.0.len() as isize {
            return false;
        }
        self.0[idx as usize] = val;
        true
    }

    /// The amount of registers in the file.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the file holds no registers at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// An immutable view of all registers.
    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new(crate::definitions::register::SIZE)
    }
}

/// A single stack frame.
///
/// Holds up to [`FRAME_SIZE`](stack::FRAME_SIZE) values inline plus the
/// instruction pointer to restore on return. Push and pop never
/// allocate.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// The instruction pointer restored when the frame is returned from.
    pub ret: usize,
    /// The values held by the frame.
    data: ArrayVec<[Value; stack::FRAME_SIZE]>,
}

impl StackFrame {
    /// Will create an empty frame with the given return address.
    pub fn new(ret: usize) -> Self {
        Self {
            ret,
            ..Self::default()
        }
    }

    /// Will push a value onto the frame.
    /// Returns `false` exactly when the frame is full.
    pub fn push(&mut self, val: Value) -> bool {
        if self.data.len() == self.data.capacity() {
            return false;
        }
        self.data.push(val);
        true
    }

    /// Will read the value at `idx`, where `-1` denotes the topmost
    /// value.
    pub fn get(&self, idx: isize) -> Option<Value> {
        let i = offset_index(self.data.len(), idx)?;
        Some(self.data[i])
    }

    /// Will drop up to `n` values off the top of the frame and report
    /// how many were actually dropped.
    pub fn pop(&mut self, n: usize) -> usize {
        let n = n.min(self.data.len());
        self.data.truncate(self.data.len() - n);
        n
    }

    /// The current depth of the frame.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks if the frame holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// An immutable view of the held values, bottom first.
    pub fn values(&self) -> &[Value] {
        &self.data
    }
}

/// The frame stack of the machine.
///
/// Holds up to [`MAX_FRAMES`](stack::MAX_FRAMES) frames inline with the
/// same saturating push and pop behavior as the frames themselves. The
/// topmost frame is the current one and is addressed with index `-1`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stack {
    data: ArrayVec<[StackFrame; stack::MAX_FRAMES]>,
}

impl Stack {
    /// Will push a fresh frame carrying the given return address.
    /// Returns `false` exactly when the stack is full.
    pub fn push(&mut self, ret: usize) -> bool {
        if self.data.len() == self.data.capacity() {
            return false;
        }
        self.data.push(StackFrame::new(ret));
        true
    }

    /// Will read the frame at `idx`, where `-1` denotes the current
    /// frame.
    pub fn get(&self, idx: isize) -> Option<&StackFrame> {
        let i = offset_index(self.data.len(), idx)?;
        Some(&self.data[i])
    }

    /// Will read the frame at `idx` mutably.
    pub fn get_mut(&mut self, idx: isize) -> Option<&mut StackFrame> {
        let i = offset_index(self.data.len(), idx)?;
        Some(&mut self.data[i])
    }

    /// Will drop up to `n` frames off the top of the stack and report
    /// how many were actually dropped.
    pub fn pop(&mut self, n: usize) -> usize {
        let n = n.min(self.data.len());
        self.data.truncate(self.data.len() - n);
        n
    }

    /// Will remove and return the current frame.
    pub fn pop_frame(&mut self) -> Option<StackFrame> {
        self.data.pop()
    }

    /// Will push a value onto the current frame, creating one with a
    /// return address of `0` when the stack is empty.
    pub fn push_value(&mut self, val: Value) -> bool {
        if self.data.is_empty() && !self.push(0) {
            return false;
        }
        match self.data.last_mut() {
            Some(frame) => frame.push(val),
            None => false,
        }
    }

    /// Will drop up to `n` values off the current frame.
    pub fn pop_values(&mut self, n: usize) -> usize {
        match self.data.last_mut() {
            Some(frame) => frame.pop(n),
            None => 0,
        }
    }

    /// Will read a value of the current frame, where `-1` denotes the
    /// topmost value.
    pub fn get_value(&self, idx: isize) -> Option<Value> {
        self.data.last()?.get(idx)
    }

    /// The current depth of the stack.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks if the stack holds no frames.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// An immutable view of the held frames, bottom first.
    pub fn frames(&self) -> &[StackFrame] {
        &self.data
    }
}

/// The executable program plus the position execution has reached.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Script {
    /// The instructions making up the program.
    pub code: Vec<Op>,
    /// The instruction pointer, always within `[0, code.len()]`.
    pub iptr: usize,
}

impl Script {
    /// Will create a script over the given code, ready to run.
    pub fn new(code: Vec<Op>) -> Self {
        Self { code, iptr: 0 }
    }

    /// Will read the instruction under the pointer without advancing.
    pub fn peek(&self) -> Option<Op> {
        self.code.get(self.iptr).copied()
    }

    /// Will read the instruction under the pointer and advance past it.
    pub fn next(&mut self) -> Option<Op> {
        let op = self.peek()?;
        self.iptr += 1;
        Some(op)
    }

    /// Will scan for the next `label` instruction carrying `val`.
    ///
    /// The scan starts at the pointer inclusive and runs to the end of
    /// the code. When nothing matched and the pointer is still inside
    /// the code, the scan wraps around to cover `0..iptr` as well.
    // TODO O(n) per call, a label index would help long programs
    pub fn find_next_label(&self, val: Value) -> Option<usize> {
        let matches = |op: &Op| op.kind == OpCode::Label && op.arg == val;
        for (i, op) in self.code.iter().enumerate().skip(self.iptr) {
            if matches(op) {
                return Some(i);
            }
        }
        if self.iptr < self.code.len() {
            for (i, op) in self.code.iter().enumerate().take(self.iptr) {
                if matches(op) {
                    return Some(i);
                }
            }
        }
        None
    }

    /// Will move the pointer to `to`, clamped into `[0, len]`.
    /// Returns where the pointer ended up.
    pub fn jump(&mut self, to: isize) -> usize {
        self.iptr = clamp_index(self.code.len(), to);
        self.iptr
    }

    /// Will move the pointer by `offset` relative to where it currently
    /// is, clamped like [`jump`](Self::jump).
    pub fn jump_offset(&mut self, offset: isize) -> usize {
        self.jump(self.iptr as isize + offset)
    }

    /// Checks if execution has run past the last instruction.
    pub fn done(&self) -> bool {
        self.iptr >= self.code.len()
    }

    /// Will rewind the pointer to the first instruction.
    pub fn reset(&mut self) {
        self.iptr = 0;
    }
}

/// The complete state of one machine instance.
///
/// All parts are owned together, nothing is shared between instances.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct State {
    /// The program and its instruction pointer.
    pub script: Script,
    /// The bounded frame stack.
    pub stack: Stack,
    /// The register file.
    pub registers: Registers,
}

impl State {
    /// Will create a fresh state over the given code with `registers`
    /// zeroed registers.
    pub fn new(code: Vec<Op>, registers: usize) -> Self {
        Self {
            script: Script::new(code),
            stack: Stack::default(),
            registers: Registers::new(registers),
        }
    }

    /// Will take a deep copy of everything an inspector cares about.
    /// Mutating the state afterwards does not affect the snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            iptr: self.script.iptr,
            registers: self.registers.values().to_vec(),
            stack: self
                .stack
                .frames()
                .iter()
                .map(|frame| FrameSnapshot {
                    ret: frame.ret,
                    values: frame.values().to_vec(),
                })
                .collect(),
        }
    }
}

/// A deep, stable copy of a [`State`](State) for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Where execution stopped.
    pub iptr: usize,
    /// The register values at snapshot time.
    pub registers: Vec<Value>,
    /// The frames at snapshot time, bottom first.
    pub stack: Vec<FrameSnapshot>,
}

/// The copied contents of one frame inside a [`Snapshot`](Snapshot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSnapshot {
    /// The return address the frame carried.
    #[serde(rename = "return")]
    pub ret: usize,
    /// The values the frame held, bottom first.
    pub values: Vec<Value>,
}
