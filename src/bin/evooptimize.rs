//! Evolves a population of random programs toward the "123" objective:
//! leave 1, 2 and 3 in the first three registers, with a penalty on
//! program length.

use std::{
    process,
    time::{Duration, Instant},
};

use clap::Parser;

use evo::{
    definitions,
    discrete::{Bernoulli, BoolVar, IntVar, Range},
    encoding::human,
    genome::{self, DEFAULT_CHANGE, DEFAULT_OP_VAR, DEFAULT_RECOMBINE},
    opcode::Op,
    optimizer::{Population, Simulation},
    vm::State,
    Runtime,
};

/// Evolve programs against the "123" cost function.
#[derive(Parser, Debug)]
#[command(name = "evooptimize", version)]
struct Args {
    /// population size
    #[arg(long, default_value_t = definitions::optimizer::SIZE)]
    size: usize,

    /// target cost
    #[arg(long, default_value_t = definitions::optimizer::TARGET_COST)]
    target: f64,

    /// max generations
    #[arg(long, default_value_t = definitions::optimizer::MAX_ITERATIONS)]
    max: usize,

    /// vm timeout in steps
    #[arg(long, default_value_t = definitions::runtime::MAX_ITERATIONS)]
    timeout: usize,

    /// number of vm registers
    #[arg(long, default_value_t = definitions::register::SIZE)]
    input: usize,
}

/// The evolving program population.
struct ProgramPopulation {
    codes: Vec<Vec<Op>>,
    size: usize,
    runtime: Runtime,
    registers: usize,
}

impl ProgramPopulation {
    fn new(args: &Args) -> Self {
        Self {
            codes: Vec::with_capacity(args.size),
            size: args.size,
            runtime: Runtime::with_max_iterations(args.timeout),
            registers: args.input,
        }
    }

    /// Runs member `i` in a fresh machine and reads the first three
    /// registers, padding the missing ones with a large constant.
    fn registers_after_run(&self, i: usize) -> [f64; 3] {
        let mut state = State::new(self.codes[i].clone(), self.registers);
        let _ = self.runtime.run(&mut state);
        let regs = state.registers.values();
        let reg = |k: usize| regs.get(k).copied().unwrap_or(i8::MAX - 1) as f64;
        [reg(0), reg(1), reg(2)]
    }
}

impl Population for ProgramPopulation {
    fn len(&self) -> usize {
        self.codes.len()
    }

    fn cost(&self, i: usize) -> f64 {
        let [r0, r1, r2] = self.registers_after_run(i);
        let objective = (r0 - 1.0).abs() + (r1 - 2.0).abs() + (r2 - 3.0).abs();
        objective + 0.1 * self.codes[i].len() as f64
    }

    fn create(&mut self, n: usize) {
        if self.codes.is_empty() {
            // bootstrap generation
            for _ in 0..self.size {
                self.codes.push(genome::sample_n(
                    &DEFAULT_OP_VAR,
                    definitions::optimizer::CODE_SIZE,
                ));
            }
            return;
        }
        let mutate = Bernoulli::new(0.8);
        let pick = Range::new(0, self.codes.len() as i64);
        for _ in 0..n {
            let code = if mutate.sample() {
                genome::mutate(
                    &DEFAULT_CHANGE,
                    &DEFAULT_OP_VAR,
                    &self.codes[pick.sample() as usize],
                )
            } else {
                let left = &self.codes[pick.sample() as usize];
                let right = &self.codes[pick.sample() as usize];
                genome::recombine(&DEFAULT_RECOMBINE, left, right)
            };
            self.codes.push(code);
        }
    }

    fn reap(&mut self, n: usize) {
        let keep = self.codes.len().saturating_sub(n);
        self.codes.truncate(keep);
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.codes.swap(i, j);
    }
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut pop = ProgramPopulation::new(args);

    let mut last_report: Option<Instant> = None;
    let mut sim = Simulation {
        size: args.size,
        target_cost: args.target,
        max_iterations: args.max,
        reap_ratio: definitions::optimizer::REAP_RATIO,
        on_step: Some(Box::new(move |min_cost, steps| {
            // keep the progress stream readable on fast generations
            if last_report.map_or(true, |t| t.elapsed() >= Duration::from_secs(2)) {
                last_report = Some(Instant::now());
                eprintln!("step: cost={} steps={}", min_cost, steps);
            }
        })),
    };

    let (cost, steps) = sim.optimize(&mut pop);
    eprintln!("done: cost={} steps={}", cost, steps);

    print!("{}", human::marshal(&pop.codes[0]));
    Ok(())
}
