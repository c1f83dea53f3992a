//! Contract between the encoder and a search engine.
//!
//! Engines receive a finished [`RoutingModel`] and [`SearchParameters`], and
//! answer with an [`Assignment`], with `None` when nothing feasible was found
//! in time, or with an [`EngineError`] when the model or configuration is
//! unusable.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::model::{Bounds, DimensionIndex, ModelError, RoutingModel};

/// Construction heuristic for the first solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FirstSolutionStrategy {
    /// Insert the globally cheapest node into any route, repeatedly.
    #[default]
    ParallelCheapestInsertion,
    /// Fill one vehicle at a time with its cheapest insertions.
    SequentialCheapestInsertion,
}

/// Improvement strategy applied after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LocalSearchMetaheuristic {
    /// A short improvement run that settles near the first local optimum.
    GreedyDescent,
    /// Keep escaping local optima until the time limit or the engine's
    /// iteration cap.
    #[default]
    GuidedLocalSearch,
}

/// Error returned when a strategy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {name:?}")]
pub struct ParseStrategyError {
    kind: &'static str,
    name: String,
}

impl FirstSolutionStrategy {
    const fn name(self) -> &'static str {
        match self {
            Self::ParallelCheapestInsertion => "parallel-cheapest-insertion",
            Self::SequentialCheapestInsertion => "sequential-cheapest-insertion",
        }
    }
}

impl fmt::Display for FirstSolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FirstSolutionStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::ParallelCheapestInsertion,
            Self::SequentialCheapestInsertion,
        ]
        .into_iter()
        .find(|strategy| strategy.name() == s)
        .ok_or_else(|| ParseStrategyError {
            kind: "first solution strategy",
            name: s.to_owned(),
        })
    }
}

impl LocalSearchMetaheuristic {
    const fn name(self) -> &'static str {
        match self {
            Self::GreedyDescent => "greedy-descent",
            Self::GuidedLocalSearch => "guided-local-search",
        }
    }
}

impl fmt::Display for LocalSearchMetaheuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LocalSearchMetaheuristic {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::GreedyDescent, Self::GuidedLocalSearch]
            .into_iter()
            .find(|metaheuristic| metaheuristic.name() == s)
            .ok_or_else(|| ParseStrategyError {
                kind: "local search metaheuristic",
                name: s.to_owned(),
            })
    }
}

/// Search configuration passed to [`RoutingEngine::solve`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use reload_core::{FirstSolutionStrategy, LocalSearchMetaheuristic, SearchParameters};
///
/// let params = SearchParameters::with_time_limit(Duration::from_secs(3));
/// assert_eq!(params.first_solution_strategy, FirstSolutionStrategy::ParallelCheapestInsertion);
/// assert_eq!(params.local_search_metaheuristic, LocalSearchMetaheuristic::GuidedLocalSearch);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    /// Construction heuristic.
    pub first_solution_strategy: FirstSolutionStrategy,
    /// Improvement strategy.
    pub local_search_metaheuristic: LocalSearchMetaheuristic,
    /// Wall-clock budget for the whole search.
    pub time_limit: Duration,
}

impl SearchParameters {
    /// Default strategies with the given budget.
    #[must_use]
    pub fn with_time_limit(time_limit: Duration) -> Self {
        Self {
            time_limit,
            ..Self::default()
        }
    }
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            first_solution_strategy: FirstSolutionStrategy::default(),
            local_search_metaheuristic: LocalSearchMetaheuristic::default(),
            time_limit: Duration::from_secs(10),
        }
    }
}

/// Failures unrelated to feasibility.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The model could not be declared.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// The engine rejected the model or its configuration.
    #[error("engine rejected the model: {reason}")]
    Rejected {
        /// Explanation supplied by the engine.
        reason: String,
    },
    /// An assignment does not match the model it claims to solve.
    #[error("assignment violates the engine contract: {reason}")]
    Contract {
        /// What was inconsistent.
        reason: String,
    },
}

/// A search engine able to solve a [`RoutingModel`].
pub trait RoutingEngine {
    /// Search for an assignment within `params.time_limit`.
    ///
    /// Returns `Ok(None)` when no feasible assignment was found in time.
    ///
    /// # Errors
    /// Returns [`EngineError`] when the model or configuration is unusable.
    fn solve(
        &self,
        model: &RoutingModel,
        params: &SearchParameters,
    ) -> Result<Option<Assignment>, EngineError>;
}

impl<E: RoutingEngine + ?Sized> RoutingEngine for Box<E> {
    fn solve(
        &self,
        model: &RoutingModel,
        params: &SearchParameters,
    ) -> Result<Option<Assignment>, EngineError> {
        (**self).solve(model, params)
    }
}

/// One visit of a route with its committed cumul range per dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// Visited node.
    pub node: usize,
    /// Committed cumul range, indexed like [`RoutingModel::dimensions`].
    pub cumuls: Vec<Bounds>,
}

/// The stops of one vehicle, from its start token to its end token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleRoute {
    stops: Vec<Stop>,
}

impl VehicleRoute {
    /// Wrap a stop sequence. The first stop is the start token and the last
    /// stop the end token.
    #[must_use]
    pub const fn new(stops: Vec<Stop>) -> Self {
        Self { stops }
    }

    /// All stops in visiting order.
    #[must_use]
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Whether the vehicle serves no node between start and end.
    #[must_use]
    pub fn is_unused(&self) -> bool {
        self.stops.len() <= 2
    }
}

/// Position within an [`Assignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StopCursor {
    vehicle: usize,
    position: usize,
}

impl StopCursor {
    /// Vehicle the cursor walks.
    #[must_use]
    pub const fn vehicle(self) -> usize {
        self.vehicle
    }

    /// Zero-based position along the route.
    #[must_use]
    pub const fn position(self) -> usize {
        self.position
    }
}

/// Solution produced by a [`RoutingEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    routes: Vec<VehicleRoute>,
    objective: i64,
}

impl Assignment {
    /// Assemble an assignment from one route per vehicle.
    #[must_use]
    pub const fn new(routes: Vec<VehicleRoute>, objective: i64) -> Self {
        Self { routes, objective }
    }

    /// Objective value reported by the engine.
    #[must_use]
    pub const fn objective(&self) -> i64 {
        self.objective
    }

    /// Number of vehicle routes.
    #[must_use]
    pub fn vehicles(&self) -> usize {
        self.routes.len()
    }

    /// Route of `vehicle`.
    #[must_use]
    pub fn route(&self, vehicle: usize) -> Option<&VehicleRoute> {
        self.routes.get(vehicle)
    }

    /// Cursor on the start token of `vehicle`.
    #[must_use]
    pub fn start(&self, vehicle: usize) -> Option<StopCursor> {
        self.route(vehicle)
            .filter(|route| !route.stops.is_empty())
            .map(|_| StopCursor {
                vehicle,
                position: 0,
            })
    }

    /// Whether `cursor` rests on the end token of its route.
    #[must_use]
    pub fn is_end(&self, cursor: StopCursor) -> bool {
        self.route(cursor.vehicle)
            .is_none_or(|route| cursor.position.saturating_add(1) >= route.stops.len())
    }

    /// The stop after `cursor`, or `None` past the end token.
    #[must_use]
    pub fn next(&self, cursor: StopCursor) -> Option<StopCursor> {
        if self.is_end(cursor) {
            return None;
        }
        Some(StopCursor {
            vehicle: cursor.vehicle,
            position: cursor.position.saturating_add(1),
        })
    }

    /// The stop under `cursor`.
    #[must_use]
    pub fn stop(&self, cursor: StopCursor) -> Option<&Stop> {
        self.route(cursor.vehicle)?.stops.get(cursor.position)
    }

    /// Committed cumul range of `dimension` at `cursor`.
    #[must_use]
    pub fn cumul(&self, dimension: DimensionIndex, cursor: StopCursor) -> Option<Bounds> {
        self.stop(cursor)?.cumuls.get(dimension.get()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn stop(node: usize, time: i64) -> Stop {
        Stop {
            node,
            cumuls: vec![Bounds::exactly(time)],
        }
    }

    #[rstest]
    #[case("parallel-cheapest-insertion", FirstSolutionStrategy::ParallelCheapestInsertion)]
    #[case("sequential-cheapest-insertion", FirstSolutionStrategy::SequentialCheapestInsertion)]
    fn first_solution_strategy_parses(
        #[case] name: &str,
        #[case] expected: FirstSolutionStrategy,
    ) {
        assert_eq!(name.parse::<FirstSolutionStrategy>(), Ok(expected));
        assert_eq!(expected.to_string(), name);
    }

    #[rstest]
    fn unknown_metaheuristic_is_rejected() {
        let err = "tabu-search"
            .parse::<LocalSearchMetaheuristic>()
            .expect_err("unknown name");
        assert_eq!(
            err.to_string(),
            "unknown local search metaheuristic \"tabu-search\""
        );
    }

    #[rstest]
    fn cursor_walks_to_end_token() {
        let assignment = Assignment::new(
            vec![VehicleRoute::new(vec![stop(0, 0), stop(2, 5), stop(0, 9)])],
            9,
        );
        let start = assignment.start(0).expect("route exists");
        assert!(!assignment.is_end(start));
        let middle = assignment.next(start).expect("middle stop");
        assert_eq!(assignment.stop(middle).map(|s| s.node), Some(2));
        let end = assignment.next(middle).expect("end token");
        assert!(assignment.is_end(end));
        assert_eq!(assignment.next(end), None);
        assert_eq!(
            assignment.cumul(DimensionIndex(0), end),
            Some(Bounds::exactly(9))
        );
    }

    #[rstest]
    fn missing_vehicle_has_no_start() {
        let assignment = Assignment::new(Vec::new(), 0);
        assert_eq!(assignment.start(0), None);
        assert_eq!(assignment.vehicles(), 0);
    }
}
