//! The machine state implementation, from the register file and the
//! bounded stack up to the executable script.

mod opcodes;
mod state;

/// reexport state structs and data for simpler usage
pub use state::*;
