//! Command-line interface for solving reload routing problems.
//!
//! `reload solve <problem.json>` reads a problem, runs the native engine and
//! prints the route plan as JSON on stdout. Search settings layer from CLI
//! flags, `RELOAD_*` environment variables and configuration files.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod solve;

pub use error::CliError;

use solve::{SolveArgs, run_solve};

const ARG_PROBLEM: &str = "problem";
const ARG_TIMEOUT: &str = "timeout";
const ARG_MAX_GENERATIONS: &str = "max-generations";
const ARG_METAHEURISTIC: &str = "metaheuristic";
const ARG_FIRST_SOLUTION: &str = "first-solution";
const ENV_PROBLEM: &str = "RELOAD_CMDS_SOLVE_PROBLEM_PATH";

/// Run the reload CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration, the problem file or
/// the solve itself fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Solve(args) => run_solve(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "reload",
    about = "Vehicle routing with time windows and mid-route depot reloads",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a routing problem stored as JSON.
    Solve(SolveArgs),
}

#[cfg(test)]
mod tests;
