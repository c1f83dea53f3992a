//! Solve command implementation for the reload CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use reload_core::{
    FirstSolutionStrategy, LocalSearchMetaheuristic, Problem, RoutePlan, RoutingEngine,
    SearchParameters, solve_with,
};
use reload_solver_native::{NativeEngine, NativeEngineConfig};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_FIRST_SOLUTION, ARG_MAX_GENERATIONS, ARG_METAHEURISTIC, ARG_PROBLEM, ARG_TIMEOUT, CliError,
    ENV_PROBLEM,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Solve a vehicle routing problem with capacities, time windows \
                 and mid-route depot reloads. The problem is read from a JSON \
                 file and the route plan is printed as JSON on stdout.",
    about = "Solve a reload routing problem"
)]
#[ortho_config(prefix = "RELOAD")]
pub(crate) struct SolveArgs {
    /// Path to a JSON file containing the problem.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) problem_path: Option<Utf8PathBuf>,
    /// Override the search budget of the problem, in seconds.
    #[arg(long = ARG_TIMEOUT, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout: Option<u64>,
    /// Stop the search after this many generations.
    #[arg(long = ARG_MAX_GENERATIONS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_generations: Option<usize>,
    /// Local search strategy (`guided-local-search` or `greedy-descent`).
    #[arg(long = ARG_METAHEURISTIC, value_name = "name")]
    #[serde(default)]
    pub(crate) metaheuristic: Option<String>,
    /// Construction strategy (`parallel-cheapest-insertion` or
    /// `sequential-cheapest-insertion`).
    #[arg(long = ARG_FIRST_SOLUTION, value_name = "name")]
    #[serde(default)]
    pub(crate) first_solution: Option<String>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON problem file.
    pub(crate) problem_path: Utf8PathBuf,
    /// Budget override in seconds; the problem's own `timeout` otherwise.
    pub(crate) timeout: Option<u64>,
    /// Construction heuristic.
    pub(crate) first_solution_strategy: FirstSolutionStrategy,
    /// Improvement strategy.
    pub(crate) local_search_metaheuristic: LocalSearchMetaheuristic,
    /// Native engine settings.
    pub(crate) engine: NativeEngineConfig,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.problem_path, ARG_PROBLEM)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Search parameters for `problem`, honouring the timeout override.
    pub(crate) fn search_parameters(&self, problem: &Problem) -> SearchParameters {
        let time_limit = self
            .timeout
            .map_or_else(|| problem.time_limit(), std::time::Duration::from_secs);
        SearchParameters {
            first_solution_strategy: self.first_solution_strategy,
            local_search_metaheuristic: self.local_search_metaheuristic,
            time_limit,
        }
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let problem_path = args.problem_path.ok_or(CliError::MissingArgument {
            field: ARG_PROBLEM,
            env: ENV_PROBLEM,
        })?;

        let first_solution_strategy = args
            .first_solution
            .as_deref()
            .map(str::parse::<FirstSolutionStrategy>)
            .transpose()?
            .unwrap_or_default();
        let local_search_metaheuristic = args
            .metaheuristic
            .as_deref()
            .map(str::parse::<LocalSearchMetaheuristic>)
            .transpose()?
            .unwrap_or_default();

        let defaults = NativeEngineConfig::default();
        let engine = NativeEngineConfig {
            max_generations: args.max_generations.unwrap_or(defaults.max_generations),
        };

        Ok(Self {
            problem_path,
            timeout: args.timeout,
            first_solution_strategy,
            local_search_metaheuristic,
            engine,
        })
    }
}

/// Builds an engine for the current solve invocation.
pub(super) trait SolveEngineBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn RoutingEngine>, CliError>;
}

pub(super) struct DefaultSolveEngineBuilder;

impl SolveEngineBuilder for DefaultSolveEngineBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn RoutingEngine>, CliError> {
        Ok(Box::new(NativeEngine::with_config(config.engine.clone())))
    }
}

pub(super) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultSolveEngineBuilder;
    run_solve_with(args, &builder, &mut stdout)
}

pub(super) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn SolveEngineBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let plan = execute_solve(args, builder)?;
    write_route_plan(writer, &plan)
}

fn execute_solve(
    args: SolveArgs,
    builder: &dyn SolveEngineBuilder,
) -> Result<RoutePlan, CliError> {
    let config = resolve_solve_config(args)?;
    let problem = load_problem(&config.problem_path)?;
    problem
        .validate()
        .map_err(|source| CliError::InvalidProblem {
            path: config.problem_path.clone(),
            source,
        })?;
    let engine = builder.build(&config)?;
    let params = config.search_parameters(&problem);
    solve_with(&problem, engine.as_ref(), &params).map_err(|source| CliError::Solve { source })
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`Problem`] from disk.
pub(super) fn load_problem(path: &Utf8Path) -> Result<Problem, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenProblem {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseProblem {
        path: path.to_path_buf(),
        source,
    })
}

fn write_route_plan(writer: &mut dyn Write, plan: &RoutePlan) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(plan).map_err(CliError::SerialiseRoutePlan)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteSolveOutput)?;
    writer
        .write_all(b"\n")
        .map_err(CliError::WriteSolveOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
