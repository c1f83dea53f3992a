//! Builders and scripted engines shared by unit, behaviour and downstream
//! tests.

use std::cell::Cell;

use crate::engine::{Assignment, EngineError, RoutingEngine, SearchParameters, Stop, VehicleRoute};
use crate::model::{Bounds, RoutingModel};
use crate::{Problem, TimeWindow};

/// Horizon used for default time windows and travel budgets.
pub const HORIZON: i64 = 10_000;

/// Fluent builder for [`Problem`] values.
///
/// [`ProblemBuilder::line`] places nodes on a line one time unit apart, so
/// travel time between `i` and `j` is `|i - j|`. Customers demand one unit,
/// the depot is node 0 and windows span `[0, HORIZON]`.
///
/// # Examples
/// ```
/// use reload_core::test_support::ProblemBuilder;
///
/// let problem = ProblemBuilder::line(4).capacity(2).vehicles(2).build();
/// assert_eq!(problem.time_matrix[1][3], 2);
/// assert_eq!(problem.total_demand(), 3);
/// assert!(problem.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    problem: Problem,
}

impl ProblemBuilder {
    /// Nodes `0..nodes` on a line with unit spacing.
    #[must_use]
    pub fn line(nodes: usize) -> Self {
        let matrix = (0..nodes)
            .map(|from| {
                (0..nodes)
                    .map(|to| i64::try_from(from.abs_diff(to)).unwrap_or(HORIZON))
                    .collect()
            })
            .collect();
        Self::from_matrix(matrix)
    }

    /// Nodes with an explicit travel-time matrix.
    #[must_use]
    pub fn from_matrix(time_matrix: Vec<Vec<i64>>) -> Self {
        let nodes = time_matrix.len();
        let demands: Vec<i64> = (0..nodes).map(|node| i64::from(node != 0)).collect();
        let capacity = demands.iter().sum::<i64>().max(1);
        Self {
            problem: Problem {
                nodes,
                vehicles: 1,
                depot: 0,
                demands,
                time_matrix,
                time_windows: vec![TimeWindow::new(0, HORIZON); nodes],
                service_time: vec![0; nodes],
                capacity,
                travel_time: HORIZON,
                timeout: 1,
            },
        }
    }

    /// Set the fleet size.
    #[must_use]
    pub const fn vehicles(mut self, vehicles: usize) -> Self {
        self.problem.vehicles = vehicles;
        self
    }

    /// Move the depot. Its demand is left untouched.
    #[must_use]
    pub const fn depot(mut self, depot: usize) -> Self {
        self.problem.depot = depot;
        self
    }

    /// Set the demand of one node.
    #[must_use]
    pub fn demand(mut self, node: usize, demand: i64) -> Self {
        if let Some(slot) = self.problem.demands.get_mut(node) {
            *slot = demand;
        }
        self
    }

    /// Replace every demand.
    #[must_use]
    pub fn demands(mut self, demands: Vec<i64>) -> Self {
        self.problem.demands = demands;
        self
    }

    /// Set the arrival window of one node.
    #[must_use]
    pub fn window(mut self, node: usize, earliest: i64, latest: i64) -> Self {
        if let Some(slot) = self.problem.time_windows.get_mut(node) {
            *slot = TimeWindow::new(earliest, latest);
        }
        self
    }

    /// Replace every arrival window.
    #[must_use]
    pub fn windows(mut self, windows: Vec<TimeWindow>) -> Self {
        self.problem.time_windows = windows;
        self
    }

    /// Use the same service time at every node.
    #[must_use]
    pub fn service(mut self, service: i64) -> Self {
        self.problem.service_time.fill(service);
        self
    }

    /// Replace every service time.
    #[must_use]
    pub fn service_times(mut self, service_time: Vec<i64>) -> Self {
        self.problem.service_time = service_time;
        self
    }

    /// Set the vehicle capacity.
    #[must_use]
    pub const fn capacity(mut self, capacity: i64) -> Self {
        self.problem.capacity = capacity;
        self
    }

    /// Set the per-vehicle travel budget.
    #[must_use]
    pub const fn travel_time(mut self, travel_time: i64) -> Self {
        self.problem.travel_time = travel_time;
        self
    }

    /// Set the search budget in seconds.
    #[must_use]
    pub const fn timeout(mut self, timeout: u64) -> Self {
        self.problem.timeout = timeout;
        self
    }

    /// Finish the problem.
    #[must_use]
    pub fn build(self) -> Problem {
        self.problem
    }
}

#[derive(Debug, Clone)]
enum Script {
    NoSolution,
    Reject(String),
    DepotOnly,
}

/// Engine that answers from a script and records what it was asked.
#[derive(Debug)]
pub struct ScriptedEngine {
    script: Script,
    calls: Cell<usize>,
    last_params: Cell<Option<SearchParameters>>,
}

impl ScriptedEngine {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: Cell::new(0),
            last_params: Cell::new(None),
        }
    }

    /// Always report that nothing feasible was found.
    #[must_use]
    pub fn no_solution() -> Self {
        Self::new(Script::NoSolution)
    }

    /// Always reject the model with `reason`.
    #[must_use]
    pub fn rejecting(reason: &str) -> Self {
        Self::new(Script::Reject(reason.to_owned()))
    }

    /// Keep every vehicle at the depot with all cumuls at zero.
    #[must_use]
    pub fn depot_only() -> Self {
        Self::new(Script::DepotOnly)
    }

    /// Number of `solve` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Parameters of the latest `solve` call.
    #[must_use]
    pub fn last_params(&self) -> Option<SearchParameters> {
        self.last_params.get()
    }
}

impl RoutingEngine for ScriptedEngine {
    fn solve(
        &self,
        model: &RoutingModel,
        params: &SearchParameters,
    ) -> Result<Option<Assignment>, EngineError> {
        self.calls.set(self.calls.get().saturating_add(1));
        self.last_params.set(Some(*params));
        match &self.script {
            Script::NoSolution => Ok(None),
            Script::Reject(reason) => Err(EngineError::Rejected {
                reason: reason.clone(),
            }),
            Script::DepotOnly => {
                let depot = Stop {
                    node: model.depot(),
                    cumuls: vec![Bounds::exactly(0); model.dimensions().len()],
                };
                let routes = (0..model.vehicles())
                    .map(|_| VehicleRoute::new(vec![depot.clone(), depot.clone()]))
                    .collect();
                Ok(Some(Assignment::new(routes, 0)))
            }
        }
    }
}
