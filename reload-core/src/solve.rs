//! End-to-end solve pipeline.

use thiserror::Error;

use crate::decode::{RoutePlan, decode};
use crate::encode::encode;
use crate::engine::{EngineError, RoutingEngine, SearchParameters};
use crate::layout::NodeLayout;
use crate::validate::ProblemError;
use crate::Problem;

/// Reasons a solve produced no plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The request violates a structural precondition.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ProblemError),
    /// No feasible assignment was found within the time budget.
    #[error("no feasible assignment found within the time budget")]
    Infeasible,
    /// The engine failed for a reason unrelated to feasibility.
    #[error("engine fault: {0}")]
    EngineFault(#[from] EngineError),
}

/// Solve `problem` with the default search strategies and the request's
/// `timeout` as time limit.
///
/// # Errors
/// See [`solve_with`].
pub fn solve<E>(problem: &Problem, engine: &E) -> Result<RoutePlan, SolveError>
where
    E: RoutingEngine + ?Sized,
{
    solve_with(
        problem,
        engine,
        &SearchParameters::with_time_limit(problem.time_limit()),
    )
}

/// Validate, augment, encode, search and decode.
///
/// # Errors
/// - [`SolveError::InvalidInput`] before any encoding when validation fails.
/// - [`SolveError::Infeasible`] when the engine signals no solution.
/// - [`SolveError::EngineFault`] when encoding, searching or decoding fails
///   for any other reason.
pub fn solve_with<E>(
    problem: &Problem,
    engine: &E,
    params: &SearchParameters,
) -> Result<RoutePlan, SolveError>
where
    E: RoutingEngine + ?Sized,
{
    problem.validate()?;
    let layout = NodeLayout::augment(problem);
    let encoding = encode(problem, layout).map_err(EngineError::from)?;
    let assignment = engine
        .solve(&encoding.model, params)?
        .ok_or(SolveError::Infeasible)?;
    log::debug!("decoding assignment with objective {}", assignment.objective());
    Ok(decode(&assignment, &encoding)?)
}
