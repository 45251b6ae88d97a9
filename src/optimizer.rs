//! The population based search loop.
//!
//! The simulation owns nothing but parameters. The population lives
//! behind the [`Population`](Population) capability, which keeps the
//! loop independent of how members are stored, costed and bred.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::definitions;

/// The capability a population has to offer to be optimizable.
///
/// The simulation keeps the population sorted ascending by cost between
/// generations, so [`reap`](Population::reap) drops the worst members
/// by truncating the tail.
pub trait Population {
    /// The current amount of members.
    fn len(&self) -> usize;

    /// Checks if there are no members at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cost of member `i`. Must be callable from worker threads,
    /// one generation is costed in parallel.
    fn cost(&self, i: usize) -> f64;

    /// Will add `n` members. The first call bootstraps the population,
    /// later calls refill it from the survivors.
    fn create(&mut self, n: usize);

    /// Will remove the last `n` members.
    fn reap(&mut self, n: usize);

    /// Will swap the members at `i` and `j` in place.
    fn swap(&mut self, i: usize, j: usize);
}

/// A step callback, invoked once per generation with the minimum cost
/// and the one based generation index.
pub type StepFn = Box<dyn FnMut(f64, usize)>;

/// The generational search loop.
pub struct Simulation {
    /// The population size kept between generations.
    pub size: usize,
    /// The cost at or below which the search stops.
    pub target_cost: f64,
    /// The cap on generations.
    pub max_iterations: usize,
    /// The fraction of the population reaped per generation, within
    /// `[0, 1)`.
    pub reap_ratio: f64,
    /// The optional per generation observation point.
    pub on_step: Option<StepFn>,
}

impl Default for Simulation {
    fn default() -> Self {
        use definitions::optimizer;
        Self {
            size: optimizer::SIZE,
            target_cost: optimizer::TARGET_COST,
            max_iterations: optimizer::MAX_ITERATIONS,
            reap_ratio: optimizer::REAP_RATIO,
            on_step: None,
        }
    }
}

impl Simulation {
    /// Will run a single generation: reap the worst, refill, cost every
    /// member in parallel and sort the population ascending by cost.
    /// Returns the cost of the best member.
    ///
    /// # Panics
    /// Panics when the population is still empty after refilling.
    pub fn step<P>(&self, pop: &mut P) -> f64
    where
        P: Population + Sync,
    {
        if !pop.is_empty() {
            pop.reap((pop.len() as f64 * self.reap_ratio) as usize);
        }
        pop.create(self.size.saturating_sub(pop.len()));
        let costs = Self::compute_costs(pop);
        assert!(!costs.is_empty(), "population size must not be zero");
        Self::rank(pop, costs)
    }

    /// Will run generations until the target cost is reached or the
    /// generation cap is hit. Returns the best cost seen and the amount
    /// of completed generations.
    pub fn optimize<P>(&mut self, pop: &mut P) -> (f64, usize)
    where
        P: Population + Sync,
    {
        let mut min_cost = 0.0;
        let mut steps = 0;
        while steps < self.max_iterations {
            min_cost = self.step(pop);
            log::debug!("generation {}: min cost {}", steps + 1, min_cost);
            if let Some(on_step) = self.on_step.as_mut() {
                on_step(min_cost, steps + 1);
            }
            if min_cost <= self.target_cost {
                break;
            }
            steps += 1;
        }
        (min_cost, steps)
    }

    /// Costs every member in its own task and gathers the results back
    /// into member order.
    fn compute_costs<P>(pop: &P) -> Vec<f64>
    where
        P: Population + Sync,
    {
        (0..pop.len())
            .into_par_iter()
            .map(|i| pop.cost(i))
            .collect()
    }

    /// Sorts the population ascending by cost, carrying the cost vector
    /// along through the same permutation. Ties break arbitrarily.
    fn rank<P>(pop: &mut P, mut costs: Vec<f64>) -> f64
    where
        P: Population,
    {
        let mut perm: Vec<usize> = (0..costs.len()).collect();
        perm.sort_by(|&a, &b| costs[a].partial_cmp(&costs[b]).unwrap_or(Ordering::Equal));
        for i in 0..perm.len() {
            while perm[i] != i {
                let j = perm[i];
                pop.swap(i, j);
                costs.swap(i, j);
                perm.swap(i, j);
            }
        }
        costs[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        definitions,
        genome::{self, DEFAULT_CHANGE, DEFAULT_OP_VAR, DEFAULT_RECOMBINE},
        discrete::{Bernoulli, BoolVar, IntVar, Range},
        opcode::Op,
        vm::State,
        Runtime,
    };

    /// A population of plain numbers where the member is its own cost.
    /// New members are taken off a predetermined pool.
    struct NumberPop {
        members: Vec<f64>,
        pool: Vec<f64>,
    }

    impl Population for NumberPop {
        fn len(&self) -> usize {
            self.members.len()
        }

        fn cost(&self, i: usize) -> f64 {
            self.members[i]
        }

        fn create(&mut self, n: usize) {
            for _ in 0..n {
                if let Some(member) = self.pool.pop() {
                    self.members.push(member);
                }
            }
        }

        fn reap(&mut self, n: usize) {
            let keep = self.members.len().saturating_sub(n);
            self.members.truncate(keep);
        }

        fn swap(&mut self, i: usize, j: usize) {
            self.members.swap(i, j);
        }
    }

    #[test]
    fn test_step_sorts_ascending() {
        let mut pop = NumberPop {
            members: vec![],
            pool: vec![4.0, 1.0, 3.0, 5.0, 2.0],
        };
        let sim = Simulation {
            size: 5,
            ..Simulation::default()
        };

        let min = sim.step(&mut pop);

        assert_eq!(1.0, min);
        assert_eq!(vec![1.0, 2.0, 3.0, 4.0, 5.0], pop.members);
    }

    #[test]
    fn test_step_reaps_the_tail() {
        let mut pop = NumberPop {
            members: vec![1.0, 2.0, 3.0, 4.0],
            pool: vec![9.0, 8.0],
        };
        let sim = Simulation {
            size: 4,
            reap_ratio: 0.5,
            ..Simulation::default()
        };

        sim.step(&mut pop);

        // 3.0 and 4.0 were reaped, 8.0 and 9.0 took their slots
        assert_eq!(vec![1.0, 2.0, 8.0, 9.0], pop.members);
    }

    #[test]
    #[should_panic(expected = "population size must not be zero")]
    fn test_step_panics_on_empty_population() {
        let mut pop = NumberPop {
            members: vec![],
            pool: vec![],
        };
        let sim = Simulation::default();
        sim.step(&mut pop);
    }

    #[test]
    fn test_optimize_stops_at_target() {
        let mut pop = NumberPop {
            members: vec![],
            pool: vec![4.0, 1.5, 3.0, 5.0, 2.0],
        };
        let mut sim = Simulation {
            size: 5,
            target_cost: 2.0,
            max_iterations: 10,
            reap_ratio: 0.5,
            ..Simulation::default()
        };

        let (min, steps) = sim.optimize(&mut pop);

        // the bootstrap generation already contains 1.5
        assert_eq!(1.5, min);
        assert_eq!(0, steps);
    }

    /// The canonical end to end scenario: evolve random programs toward
    /// leaving 1, 2 and 3 in the first three registers.
    struct ProgramPop {
        codes: Vec<Vec<Op>>,
        size: usize,
        runtime: Runtime,
        registers: usize,
    }

    impl Population for ProgramPop {
        fn len(&self) -> usize {
            self.codes.len()
        }

        fn cost(&self, i: usize) -> f64 {
            let mut state = State::new(self.codes[i].clone(), self.registers);
            let _ = self.runtime.run(&mut state);
            let regs = state.registers.values();
            let reg = |k: usize| regs.get(k).copied().unwrap_or(i8::MAX - 1) as f64;
            let cost = (reg(0) - 1.0).abs() + (reg(1) - 2.0).abs() + (reg(2) - 3.0).abs();
            cost + 0.1 * self.codes[i].len() as f64
        }

        fn create(&mut self, n: usize) {
            if self.codes.is_empty() {
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

    #[test]
    fn test_optimize_programs_toward_123() {
        let mut pop = ProgramPop {
            codes: vec![],
            size: 100,
            runtime: Runtime::with_max_iterations(100),
            registers: definitions::register::SIZE,
        };
        let mins = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen = mins.clone();
        let mut sim = Simulation {
            size: 100,
            target_cost: 1.0,
            max_iterations: 25,
            reap_ratio: 0.5,
            on_step: Some(Box::new(move |min, _| seen.lock().push(min))),
        };

        let (min, steps) = sim.optimize(&mut pop);

        assert!(steps <= 25);
        let mins = mins.lock();
        assert!(!mins.is_empty());
        // the best member survives every reap, costs never regress
        for pair in mins.windows(2) {
            assert!(pair[1] <= pair[0], "min cost regressed: {:?}", pair);
        }
        assert!((min - mins.last().unwrap()).abs() < f64::EPSILON);
    }
}
