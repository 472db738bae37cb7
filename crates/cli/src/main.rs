//! Pipeline simulator CLI.
//!
//! This binary provides the two driver modes:
//! 1. **One-shot:** `oosim <input_file> <mode> <num_cycles>` runs to the
//!    requested clock value and exits.
//! 2. **Interactive:** `oosim <input_file>` reads `<mode> <num_cycles>`
//!    lines from stdin until `exit`.
//!
//! `mode` is `simulate` (per-cycle trace) or `display` (trace plus final
//! state and statistics). Exit code 1 on an invalid argument shape or an
//! unreadable program.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use oosim_core::Config;
use oosim_core::sim::{RunMode, RunOutcome, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "oosim",
    author,
    version,
    about = "Cycle-accurate out-of-order pipeline simulator",
    long_about = "Run an assembly program on the simulated out-of-order machine.\n\nExamples:\n  oosim programs/demo.asm simulate 50\n  oosim programs/demo.asm display 200\n  oosim programs/demo.asm              # interactive: '<mode> <num_cycles>' or 'exit'"
)]
struct Cli {
    /// Program file, one instruction per line.
    input_file: PathBuf,

    /// `simulate` or `display`. Omit for interactive mode.
    mode: Option<String>,

    /// Clock target; must be greater than zero.
    num_cycles: Option<u64>,

    /// Optional JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version requests are not errors.
            if e.use_stderr() {
                eprintln!("{e}");
                process::exit(1);
            }
            let _ = e.print();
            process::exit(0);
        }
    };

    let config = match cli.config {
        Some(path) => load_config(&path),
        None => Config::default(),
    };

    eprintln!("Initializing machine");
    let mut sim = match Simulator::load(&cli.input_file, &config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    match (cli.mode, cli.num_cycles) {
        (Some(mode), Some(cycles)) => {
            let Some(mode) = parse_mode(&mode, cycles) else {
                process::exit(1);
            };
            run_once(&mut sim, mode, cycles);
        }
        (None, None) => interactive(&mut sim),
        _ => {
            usage();
            process::exit(1);
        }
    }
}

/// Runs to the requested clock value and reports the outcome.
fn run_once(sim: &mut Simulator, mode: RunMode, cycles: u64) {
    match sim.run(mode, cycles) {
        RunOutcome::Halted => println!("Simulation Complete"),
        RunOutcome::Drained => println!("Pipeline drained; end of code"),
        RunOutcome::CyclesExhausted => {
            println!("\n--------------------------------");
            println!("Requested {cycles} Cycle Completed");
            println!("--------------------------------");
        }
    }
}

/// Interactive loop: `<mode> <num_cycles>` per line, `exit` to stop.
fn interactive(sim: &mut Simulator) {
    let stdin = io::stdin();
    loop {
        eprintln!("Usage ?: <mode(simulate|display)> <num_cycles>, or exit");
        let _ = io::stderr().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else { continue };
        if first == "exit" {
            println!("Terminating Simulation");
            break;
        }
        let cycles = words.next().and_then(|w| w.parse::<u64>().ok());
        match cycles.and_then(|c| parse_mode(first, c).map(|m| (m, c))) {
            Some((mode, cycles)) => run_once(sim, mode, cycles),
            None => usage(),
        }
    }
}

/// Validates the mode string and cycle count; reports on failure.
fn parse_mode(mode: &str, cycles: u64) -> Option<RunMode> {
    if cycles == 0 {
        eprintln!("Invalid parameters passed !!!");
        eprintln!("Number of Cycles cannot be 0");
        return None;
    }
    match mode.parse() {
        Ok(m) => Some(m),
        Err(()) => {
            usage();
            None
        }
    }
}

fn usage() {
    eprintln!("Invalid parameters passed !!!");
    eprintln!("Usage: oosim <input_file> <mode(simulate|display)> <num_cycles>");
    eprintln!("       oosim <input_file>    # interactive");
}

/// Loads a JSON configuration file; exits on failure.
fn load_config(path: &Path) -> Config {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading config {}: {e}", path.display());
            process::exit(1);
        }
    };
    match serde_json::from_str(&text) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error parsing config {}: {e}", path.display());
            process::exit(1);
        }
    }
}
