//! Crossover of two parent programs.

use once_cell::sync::Lazy;

use crate::{
    discrete::{Bernoulli, BoolVar, IntVar, Range},
    opcode::Op,
};

/// The sampler feeding [`recombine`](recombine) one block description
/// at a time.
pub struct RecombineVar {
    /// How many instructions the next block copies.
    pub length: Box<dyn IntVar>,
    /// Which parent the next block comes from, `true` meaning the right
    /// one.
    pub switch: Box<dyn BoolVar>,
}

/// One drawn block description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecombineEntry {
    pub length: i64,
    pub switch: bool,
}

impl RecombineVar {
    pub fn new(length: impl IntVar + 'static, switch: impl BoolVar + 'static) -> Self {
        Self {
            length: Box::new(length),
            switch: Box::new(switch),
        }
    }

    /// Will draw the next block description.
    pub fn sample(&self) -> RecombineEntry {
        RecombineEntry {
            length: self.length.sample(),
            switch: self.switch.sample(),
        }
    }
}

/// The stock crossover: blocks of three instructions, both parents
/// equally likely.
pub static DEFAULT_RECOMBINE: Lazy<RecombineVar> =
    Lazy::new(|| RecombineVar::new(Range::new(3, 4), Bernoulli::new(0.5)));

/// Will interleave the two parents into a child program.
///
/// Cursors walk both parents. Every drawn block copies a prefix of the
/// chosen side, clamped to what that side still has. Once one side runs
/// dry the remainder of the other is appended wholesale, so the child
/// always holds every instruction of both parents in parent order.
/// Block lengths below one make no progress, samplers are expected to
/// stay at one or above.
pub fn recombine(rv: &RecombineVar, left: &[Op], right: &[Op]) -> Vec<Op> {
    let (mut left, mut right) = (left, right);
    let mut out = Vec::with_capacity(left.len() + right.len());
    loop {
        if left.is_empty() {
            out.extend_from_slice(right);
            return out;
        }
        if right.is_empty() {
            out.extend_from_slice(left);
            return out;
        }
        let entry = rv.sample();
        let side = if entry.switch { &mut right } else { &mut left };
        let block = *side;
        let n = (entry.length.max(0) as usize).min(block.len());
        out.extend_from_slice(&block[..n]);
        *side = &block[n..];
    }
}

/// Will recombine with the stock sampler.
pub fn recombine_default(left: &[Op], right: &[Op]) -> Vec<Op> {
    recombine(&DEFAULT_RECOMBINE, left, right)
}
