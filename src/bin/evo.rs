//! Runs a program file and prints the final machine snapshot.

use std::process;

use clap::Parser;

use evo::{
    definitions,
    encoding::{self, Encoding},
    vm::State,
    Runtime,
};

/// Run an evo program and print the resulting machine snapshot as toml.
#[derive(Parser, Debug)]
#[command(name = "evo", version)]
struct Args {
    /// number of vm registers
    #[arg(long, default_value_t = definitions::register::SIZE)]
    registers: usize,

    /// cap on executed vm iterations
    #[arg(long, default_value_t = definitions::runtime::MAX_ITERATIONS)]
    max_iterations: usize,

    /// input format, one of {text,bin,json}, guessed from the file
    /// extension when omitted
    #[arg(long)]
    format: Option<String>,

    /// the program file, "-" reads standard input
    file: String,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let format = match args.format.as_deref() {
        Some(name) => Some(name.parse::<Encoding>()?),
        None => None,
    };
    let code = encoding::load(&args.file, format)?;

    let mut state = State::new(code, args.registers);
    let runtime = Runtime::with_max_iterations(args.max_iterations);
    let result = runtime.run(&mut state);

    eprintln!(
        "done: interrupted={} iterations={}",
        result.interrupted, result.iterations
    );
    print!("{}", toml::to_string(&state.snapshot())?);
    Ok(())
}
