//! The genetic operators working on programs.
//!
//! Sampling builds random programs from a weighted opcode
//! configuration, mutation and recombination derive new programs from
//! existing ones. Everything draws through the
//! [`discrete`](crate::discrete) toolkit.

mod mutate;
mod recombine;
mod sample;

pub use mutate::*;
pub use recombine::*;
pub use sample::*;
