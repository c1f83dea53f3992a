//! `NativeEngine` implementation backed by `vrp-core`.
//!
//! The engine hands the mandatory nodes of a model to `vrp-core`, realises
//! every returned route with the reloads it needs, and commits the tightened
//! schedule of each route.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reload_core::{
    Assignment, EngineError, LocalSearchMetaheuristic, RoutingEngine, RoutingModel,
    SearchParameters, VehicleRoute,
};

use crate::realise::{Realiser, route_cost};
use crate::schedule::commit;
use crate::vrp::{SearchBudget, search};

/// Generation cap applied when greedy descent is requested.
const DESCENT_GENERATIONS: usize = 10;

/// Configuration for [`NativeEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeEngineConfig {
    /// Upper bound on `vrp-core` generations.
    pub max_generations: usize,
}

impl Default for NativeEngineConfig {
    fn default() -> Self {
        Self {
            max_generations: 200,
        }
    }
}

/// Native engine using `vrp-core` to search for low-cost reload routes.
///
/// # Examples
/// ```
/// use reload_core::test_support::ProblemBuilder;
/// use reload_core::solve;
/// use reload_solver_native::NativeEngine;
///
/// let problem = ProblemBuilder::line(3).build();
/// let plan = solve(&problem, &NativeEngine::new()).expect("line is solvable");
/// assert_eq!(plan.nodes.first(), Some(&0));
/// assert_eq!(plan.nodes.last(), Some(&0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NativeEngine {
    config: NativeEngineConfig,
}

impl NativeEngine {
    /// Construct an engine using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct an engine with explicit configuration.
    #[must_use]
    pub const fn with_config(config: NativeEngineConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &NativeEngineConfig {
        &self.config
    }

    fn budget(&self, params: &SearchParameters) -> Result<SearchBudget, EngineError> {
        if self.config.max_generations == 0 {
            return Err(EngineError::Rejected {
                reason: "max generations must be at least one".to_owned(),
            });
        }
        let max_generations = match params.local_search_metaheuristic {
            LocalSearchMetaheuristic::GuidedLocalSearch => self.config.max_generations,
            LocalSearchMetaheuristic::GreedyDescent => {
                self.config.max_generations.min(DESCENT_GENERATIONS)
            }
        };
        Ok(SearchBudget {
            max_generations,
            max_seconds: whole_seconds(params.time_limit),
        })
    }
}

/// `limit` rounded up to whole seconds, at least one.
fn whole_seconds(limit: Duration) -> usize {
    let seconds = limit
        .as_secs()
        .saturating_add(u64::from(limit.subsec_nanos() > 0))
        .max(1);
    usize::try_from(seconds).unwrap_or(usize::MAX)
}

/// Realise and commit every vehicle's order against one shared pool of
/// optional nodes. `None` when the orders need more optional nodes than
/// the model has.
fn assignment(
    realiser: &Realiser,
    orders: &[Vec<usize>],
) -> Result<Option<Assignment>, EngineError> {
    let model = realiser.model();
    let mut pool = realiser.pool();
    let mut cost = 0_i64;
    let mut routes = Vec::with_capacity(orders.len());
    for (vehicle, order) in orders.iter().enumerate() {
        let Some(route) = realiser.realise(order, &mut pool) else {
            log::warn!("route of vehicle {vehicle} runs out of reload stops");
            return Ok(None);
        };
        let stops = commit(model, &route).ok_or_else(|| EngineError::Contract {
            reason: format!("route of vehicle {vehicle} admits no schedule"),
        })?;
        cost = cost.saturating_add(route_cost(model, vehicle, &route));
        routes.push(VehicleRoute::new(stops));
    }
    cost = cost.saturating_add(pool.omission_penalty(model));
    Ok(Some(Assignment::new(routes, cost)))
}

fn orders(
    model: &RoutingModel,
    realiser: &Arc<Realiser>,
    budget: SearchBudget,
) -> Result<Option<Vec<Vec<usize>>>, EngineError> {
    if model.mandatory_nodes().next().is_none() {
        return Ok(Some(vec![Vec::new(); model.vehicles()]));
    }
    if model.vehicles() == 0 {
        log::warn!("mandatory nodes present but the fleet is empty");
        return Ok(None);
    }
    search(realiser, budget)
}

impl RoutingEngine for NativeEngine {
    fn solve(
        &self,
        model: &RoutingModel,
        params: &SearchParameters,
    ) -> Result<Option<Assignment>, EngineError> {
        let budget = self.budget(params)?;
        if params.time_limit.is_zero() {
            log::warn!("time limit of {:?} leaves no time to search", params.time_limit);
            return Ok(None);
        }
        let started_at = Instant::now();
        log::debug!(
            "searching with {:?} construction, {:?} and {} generation(s)",
            params.first_solution_strategy,
            params.local_search_metaheuristic,
            budget.max_generations
        );

        let realiser = Arc::new(Realiser::new(Arc::new(model.clone())));
        let Some(orders) = orders(model, &realiser, budget)? else {
            return Ok(None);
        };
        let outcome = assignment(&realiser, &orders)?;
        if let Some(found) = &outcome {
            log::info!(
                "native search finished: cost {}, {} vehicle(s) used in {:?}",
                found.objective(),
                orders.iter().filter(|order| !order.is_empty()).count(),
                started_at.elapsed()
            );
        }
        Ok(outcome)
    }
}
