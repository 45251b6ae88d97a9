//! Generates a random program around a requested length.

use std::process;

use clap::Parser;

use evo::{
    discrete::{IntVar, Range},
    encoding::{self, Encoding, STDIO_FILENAME},
    genome::{self, DEFAULT_OP_VAR},
};

/// Generate a random evo program.
#[derive(Parser, Debug)]
#[command(name = "evogen", version)]
struct Args {
    /// approximate program length
    #[arg(long, default_value_t = 10)]
    length: u64,

    /// how far the actual length may lean away from the requested one
    #[arg(long, default_value_t = 0.2)]
    length_variance: f64,

    /// output format, one of {text,bin,json}, guessed from the file
    /// extension when omitted
    #[arg(long)]
    format: Option<String>,

    /// the output file, "-" writes standard output
    #[arg(default_value = STDIO_FILENAME)]
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
    let mut format = match args.format.as_deref() {
        Some(name) => Some(name.parse::<Encoding>()?),
        None => None,
    };
    // standard output has no extension to guess from
    if args.file == STDIO_FILENAME && format.is_none() {
        format = Some(Encoding::Text);
    }

    let code = genome::sample_n(&DEFAULT_OP_VAR, random_length(args.length, args.length_variance));
    encoding::save(&args.file, format, &code)?;
    Ok(())
}

/// Draws a length around `hint`, uniformly within the variance window.
fn random_length(hint: u64, variance: f64) -> usize {
    let lean = hint as f64 * variance;
    let min = (hint as f64 - lean).max(0.0);
    (min as i64 + Range::new(0, (2.0 * lean) as i64).sample()) as usize
}
