/// The definitions

/// The definitions for the machine value type.
pub mod value {
    use crate::opcode::Value;

    /// The smallest representable scalar.
    pub const MIN: Value = Value::MIN;
    /// The largest representable scalar.
    pub const MAX: Value = Value::MAX;
}

/// The definitions needed for the register file.
pub mod register {
    /// The default size of the register file.
    pub const SIZE: usize = 8;
}

/// The stack definitions.
pub mod stack {
    /// The amount of values a single frame can hold.
    pub const FRAME_SIZE: usize = 8;
    /// The amount of frames the stack can hold.
    pub const MAX_FRAMES: usize = 8;
}

/// The runtime definitions.
pub mod runtime {
    /// The default cap on iterations for a single run.
    pub const MAX_ITERATIONS: usize = 100;
}

/// The optimizer definitions.
pub mod optimizer {
    /// The default population size.
    pub const SIZE: usize = 100;
    /// The default cost below which the search stops.
    pub const TARGET_COST: f64 = 1.0;
    /// The default cap on generations.
    pub const MAX_ITERATIONS: usize = 100_000;
    /// The default fraction of the population reaped per generation.
    pub const REAP_RATIO: f64 = 0.5;
    /// The program length used when bootstrapping a population.
    pub const CODE_SIZE: usize = 100;
}
