use criterion::{black_box, criterion_group, criterion_main, Criterion};

use evo::{
    genome::{self, DEFAULT_CHANGE, DEFAULT_OP_VAR},
    opcode::{Op, OpCode},
    vm::State,
    Runtime,
};

/// a program that loops until the iteration cap interrupts it
fn looping_program() -> Vec<Op> {
    vec![
        Op::new(OpCode::Label, 7),
        Op::new(OpCode::Push, 1),
        Op::new(OpCode::Call, 7),
        Op::new(OpCode::Noop, 0),
    ]
}

pub fn run_bench(c: &mut Criterion) {
    let code = looping_program();
    let runtime = Runtime::with_max_iterations(1000);
    c.bench_function("run_capped_loop", |b| {
        b.iter(|| {
            let mut state = State::new(black_box(code.clone()), 8);
            runtime.run(&mut state)
        });
    });
}

pub fn mutate_bench(c: &mut Criterion) {
    let code = genome::sample_n(&DEFAULT_OP_VAR, 100);
    c.bench_function("mutate_100_ops", |b| {
        b.iter(|| genome::mutate(&DEFAULT_CHANGE, &DEFAULT_OP_VAR, black_box(&code)));
    });
}

criterion_group!(benches, run_bench, mutate_bench);
criterion_main!(benches);
