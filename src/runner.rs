//! The main interface out of the crate.
//!
//! Drives a machine [`State`](crate::vm::State) by fetching and executing
//! instructions until the script halts or a pre step hook vetoes the next
//! step.

use crate::{
    definitions,
    opcode::Op,
    vm::State,
};

/// A pre step predicate. Returning `false` vetoes the step and
/// interrupts the run.
pub type Hook = Box<dyn Fn(&State, &RunResult) -> bool + Send + Sync>;

/// The outcome of driving a state with [`Runtime::run`](Runtime::run).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// Whether a hook vetoed the run before the script halted on its
    /// own.
    pub interrupted: bool,
    /// The amount of fetches attempted, the final halting one included.
    pub iterations: usize,
}

/// The instruction fetch and execute loop.
///
/// A runtime owns an ordered list of pre step hooks. Before every step
/// they are consulted in order and the first one returning `false`
/// interrupts the run. The canonical hook is the iteration cap
/// installed by
/// [`with_max_iterations`](Runtime::with_max_iterations).
#[derive(Default)]
pub struct Runtime {
    /// The hooks consulted before every step.
    pre_step: Vec<Hook>,
}

impl Runtime {
    /// Will create a runtime without any hooks. Such a runtime is only
    /// bounded by the script itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// Will create a runtime capped at `max` iterations, the canonical
    /// configuration for untrusted programs.
    pub fn with_max_iterations(max: usize) -> Self {
        let mut runtime = Self::new();
        runtime.add_hook(Box::new(move |_, result| result.iterations < max));
        runtime
    }

    /// The default runtime with the iteration cap from
    /// [`definitions`](crate::definitions::runtime).
    pub fn capped() -> Self {
        Self::with_max_iterations(definitions::runtime::MAX_ITERATIONS)
    }

    /// Will append a pre step hook. Hooks run in insertion order.
    pub fn add_hook(&mut self, hook: Hook) -> &mut Self {
        self.pre_step.push(hook);
        self
    }

    /// Will drive the state until the script halts or a hook vetoes.
    pub fn run(&self, state: &mut State) -> RunResult {
        let mut result = RunResult::default();
        loop {
            if !self.consult(state, &result) {
                result.interrupted = true;
                break;
            }
            result.iterations += 1;
            if !self.step(state) {
                break;
            }
        }
        result
    }

    /// Will advance the state by a single instruction.
    /// Returns `false` exactly when the script had already halted.
    pub fn step(&self, state: &mut State) -> bool {
        let op = match state.script.next() {
            Some(op) => op,
            None => return false,
        };
        self.exec(state, op);
        true
    }

    /// Will execute one arbitrary instruction against the state without
    /// fetching. The instruction itself may still jump.
    pub fn exec(&self, state: &mut State, op: Op) {
        state.exec(op);
    }

    /// Consults the hooks in order, short circuiting on the first veto.
    fn consult(&self, state: &State, result: &RunResult) -> bool {
        self.pre_step.iter().all(|hook| hook(state, result))
    }
}
