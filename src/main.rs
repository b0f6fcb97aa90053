//! Runs a sample RAM program from the command line.
//!
//! # Usage
//! ```text
//! ram_machine [OPTIONS] [INPUT]...
//! ```
//!
//! # Arguments
//! - `INPUT`: Integers placed on the input tape, in order
//!
//! # Options
//! - `--program <name>`: Sample program to run (`abs`, `sum` or `select`; defaults to `abs`)
//! - `--steps <n>`: Fail the run after `n` steps
//! - `--quiet`: Print only the output tape
//!
//! The minimum log level is read from `RAM_LOG`.

use ram_machine::machine::programs;
use ram_machine::machine::vm::{Machine, MachineConfig, Outcome};
use ram_machine::utils::log;
use ram_machine::{error, info};
use std::env;
use std::process;

const USAGE: &str = "\
RAM Machine

USAGE:
    {program} [OPTIONS] [INPUT]...

ARGS:
    [INPUT]...    Integers placed on the input tape, in order

OPTIONS:
    --program <name>    Sample program to run: abs, sum or select (default: abs)
    --steps <n>         Fail the run after n steps
    --quiet             Print only the output tape
    -h, --help          Print this help message

ENVIRONMENT:
    RAM_LOG    Minimum log level: debug, info, warn or error (default: info)

EXAMPLES:
    # Absolute value of -5
    {program} -- -5

    # Sum until zero, with a step budget
    {program} --program sum --steps 100 3 4 5 0

    # Pick the second of three values
    {program} --program select 10 20 30 2
";

fn main() {
    let args: Vec<String> = env::args().collect();

    if let Err(e) = log::init_from_env() {
        eprintln!("{e}");
        process::exit(1);
    }

    let mut program_name = "abs".to_string();
    let mut config = MachineConfig::default();
    let mut quiet = false;
    let mut input = Vec::new();

    let mut i = 1;
    let mut positional_only = false;
    while i < args.len() {
        let arg = args[i].as_str();
        if positional_only {
            input.push(parse_input(arg));
            i += 1;
            continue;
        }
        match arg {
            "-h" | "--help" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            "--program" => {
                i += 1;
                match args.get(i) {
                    Some(name) => program_name = name.clone(),
                    None => {
                        eprintln!("--program requires an argument");
                        process::exit(1);
                    }
                }
            }
            "--steps" => {
                i += 1;
                match args.get(i).and_then(|n| n.parse().ok()) {
                    Some(limit) => config = config.with_step_limit(limit),
                    None => {
                        eprintln!("--steps requires a non-negative integer");
                        process::exit(1);
                    }
                }
            }
            "--quiet" => quiet = true,
            "--" => positional_only = true,
            _ => input.push(parse_input(arg)),
        }
        i += 1;
    }

    let Some(program) = programs::by_name(&program_name) else {
        eprintln!(
            "Unknown program: {} (expected one of {})",
            program_name,
            programs::NAMES.join(", ")
        );
        process::exit(1);
    };

    if !quiet {
        info!("program `{}`:\n{}", program_name, program);
        info!("input: {:?}", input);
    }

    let machine = Machine::with_config(program, config);
    let outcome = machine.run(input);

    if !quiet {
        report(&outcome);
    }

    match outcome {
        Outcome::Success { output, .. } => {
            let line: Vec<String> = output.iter().map(i64::to_string).collect();
            println!("{}", line.join(" "));
        }
        Outcome::Failure {
            fault, position, ..
        } => {
            error!("fault at position {}: {}", position, fault);
            process::exit(2);
        }
    }
}

/// Logs the trace and both cost totals.
fn report(outcome: &Outcome) {
    for (n, step) in outcome.trace().iter().enumerate() {
        info!(
            "{:>4} @ {:>3}  {:<16} {}",
            n + 1,
            step.position,
            step.instruction.to_string(),
            step.registers
        );
    }

    let cost = outcome.cost();
    info!("uniform cost:     {}", cost.uniform);
    info!("logarithmic cost: {}", cost.logarithmic);
    for (category, amount) in cost.profile.iter() {
        info!("  {:<12} {}", category.as_str(), amount);
    }
}

fn parse_input(arg: &str) -> i64 {
    match arg.parse() {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Invalid input value: {}", arg);
            process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
