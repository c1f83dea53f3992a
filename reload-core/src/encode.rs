//! Encoding of a reload problem as a routing model.
//!
//! The encoder declares three dimensions over the augmented node set:
//!
//! - `Capacity` accumulates demand, with reload nodes giving back a full load.
//!   Slack only exists at reload nodes so that the load can drop back to zero.
//! - `TravelTime` accumulates drive plus service time from a zero start and is
//!   capped by the per-vehicle budget.
//! - `TimeWindow` accumulates the same transit from a free start and carries
//!   the delivery windows of the real nodes.
//!
//! Reload nodes are optional and may not follow one another, open a route or
//! close one; those arcs cost [`INFINITE_COST`].

use std::sync::Arc;

use crate::layout::{NodeKind, NodeLayout};
use crate::model::{
    BinaryTransit, DimensionIndex, DimensionSpec, ModelError, RoutingModel, UnaryTransit,
};
use crate::Problem;

/// Sentinel cost for forbidden arcs and the per-vehicle fixed cost.
///
/// Large enough that no real arc is ever traded for it, small enough that
/// route sums stay far from overflow.
pub const INFINITE_COST: i64 = 1_000_000;

/// Name of the load dimension.
pub const CAPACITY_DIMENSION: &str = "Capacity";
/// Name of the per-vehicle budget dimension.
pub const TRAVEL_TIME_DIMENSION: &str = "TravelTime";
/// Name of the schedule dimension.
pub const TIME_WINDOW_DIMENSION: &str = "TimeWindow";

/// Load change when departing a node.
///
/// Reload nodes return `-capacity`; every other node returns its demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandTransit {
    layout: NodeLayout,
    demands: Vec<i64>,
    capacity: i64,
}

impl DemandTransit {
    /// Build the evaluator for a validated problem.
    #[must_use]
    pub fn new(problem: &Problem, layout: NodeLayout) -> Self {
        Self {
            layout,
            demands: problem.demands.clone(),
            capacity: problem.capacity,
        }
    }
}

impl UnaryTransit for DemandTransit {
    fn transit(&self, node: usize) -> i64 {
        if self.layout.is_reload(node) {
            return -self.capacity;
        }
        self.demands.get(node).copied().unwrap_or(0)
    }
}

/// Drive time to the next node plus service time at the departure node.
///
/// Reload nodes travel like the depot. Reload → reload, reload → depot and
/// depot → reload cost [`INFINITE_COST`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelTransit {
    layout: NodeLayout,
    time_matrix: Vec<Vec<i64>>,
    service_time: Vec<i64>,
}

impl TravelTransit {
    /// Build the evaluator for a validated problem.
    #[must_use]
    pub fn new(problem: &Problem, layout: NodeLayout) -> Self {
        Self {
            layout,
            time_matrix: problem.time_matrix.clone(),
            service_time: problem.service_time.clone(),
        }
    }
}

impl BinaryTransit for TravelTransit {
    fn transit(&self, from: usize, to: usize) -> i64 {
        match (self.layout.kind(from), self.layout.kind(to)) {
            (NodeKind::Reload, NodeKind::Reload | NodeKind::Depot)
            | (NodeKind::Depot, NodeKind::Reload) => INFINITE_COST,
            _ => {
                let origin = self.layout.physical(from);
                let destination = self.layout.physical(to);
                let drive = self
                    .time_matrix
                    .get(origin)
                    .and_then(|row| row.get(destination))
                    .copied()
                    .unwrap_or(0);
                let service = self.service_time.get(origin).copied().unwrap_or(0);
                drive.saturating_add(service)
            }
        }
    }
}

/// A problem encoded as a routing model.
#[derive(Debug, Clone)]
pub struct Encoding {
    /// Model handed to the engine.
    pub model: RoutingModel,
    /// Node classification used for decoding.
    pub layout: NodeLayout,
    /// Dimension whose cumuls are reported as arrival times.
    pub time_window: DimensionIndex,
}

/// Encode a validated problem.
///
/// Call [`Problem::validate`] first; the encoder trusts table shapes.
///
/// # Errors
/// Returns [`ModelError`] when the model rejects a declaration, e.g. a
/// negative travel budget.
///
/// # Examples
/// ```
/// use reload_core::{encode, NodeLayout, Problem, TimeWindow, CAPACITY_DIMENSION};
///
/// let problem = Problem {
///     nodes: 3,
///     vehicles: 1,
///     depot: 0,
///     demands: vec![0, 5, 5],
///     time_matrix: vec![vec![0, 2, 2], vec![2, 0, 2], vec![2, 2, 0]],
///     time_windows: vec![TimeWindow::new(0, 100); 3],
///     service_time: vec![0, 1, 1],
///     capacity: 8,
///     travel_time: 100,
///     timeout: 1,
/// };
/// let layout = NodeLayout::augment(&problem);
/// let encoding = encode(&problem, layout)?;
/// assert_eq!(encoding.model.node_count(), 5);
/// let capacity = encoding.model.dimension(CAPACITY_DIMENSION).expect("declared");
/// assert_eq!(encoding.model.transit(capacity, 3, 1), -8);
/// # Ok::<(), reload_core::ModelError>(())
/// ```
pub fn encode(problem: &Problem, layout: NodeLayout) -> Result<Encoding, ModelError> {
    let mut model = RoutingModel::new(layout.total_nodes(), problem.vehicles, layout.depot())?;

    let demand = model.register_unary_transit(Arc::new(DemandTransit::new(problem, layout)));
    model.add_dimension(DimensionSpec {
        transit: demand.into(),
        slack_max: problem.capacity,
        capacity: problem.capacity,
        fix_start_cumul_to_zero: true,
        name: CAPACITY_DIMENSION.to_owned(),
    })?;
    let capacity = model.dimension_mut(CAPACITY_DIMENSION)?;
    for node in 0..layout.node_count() {
        capacity.fix_slack(node, 0)?;
    }

    let travel = model.register_transit(Arc::new(TravelTransit::new(problem, layout)));
    for reload in layout.reload_nodes() {
        model.add_disjunction(vec![reload], 0)?;
    }
    model.set_arc_cost_evaluator_of_all_vehicles(travel)?;

    model.add_dimension(DimensionSpec {
        transit: travel.into(),
        slack_max: 0,
        capacity: problem.travel_time,
        fix_start_cumul_to_zero: true,
        name: TRAVEL_TIME_DIMENSION.to_owned(),
    })?;
    let time_window = model.add_dimension(DimensionSpec {
        transit: travel.into(),
        slack_max: 0,
        capacity: INFINITE_COST,
        fix_start_cumul_to_zero: false,
        name: TIME_WINDOW_DIMENSION.to_owned(),
    })?;
    let windows = model.dimension_mut(TIME_WINDOW_DIMENSION)?;
    for (node, window) in problem.time_windows.iter().enumerate() {
        if layout.kind(node) == NodeKind::Customer {
            windows.restrict_cumul(node, window.earliest, window.latest)?;
        }
    }

    for vehicle in 0..problem.vehicles {
        model.set_fixed_cost_of_vehicle(INFINITE_COST, vehicle)?;
    }

    log::debug!(
        "encoded {} real and {} reload nodes for {} vehicles",
        layout.node_count(),
        layout.reload_count(),
        problem.vehicles
    );
    Ok(Encoding {
        model,
        layout,
        time_window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bounds;
    use crate::TimeWindow;
    use rstest::{fixture, rstest};

    #[fixture]
    fn problem() -> Problem {
        Problem {
            nodes: 3,
            vehicles: 2,
            depot: 0,
            demands: vec![0, 5, 5],
            time_matrix: vec![vec![0, 4, 6], vec![4, 0, 3], vec![6, 3, 0]],
            time_windows: vec![
                TimeWindow::new(0, 0),
                TimeWindow::new(10, 40),
                TimeWindow::new(0, 90),
            ],
            service_time: vec![1, 2, 3],
            capacity: 8,
            travel_time: 120,
            timeout: 1,
        }
    }

    fn encoded(problem: &Problem) -> Encoding {
        encode(problem, NodeLayout::augment(problem)).expect("problem encodes")
    }

    #[rstest]
    fn demand_refills_at_reload(problem: Problem) {
        let transit = DemandTransit::new(&problem, NodeLayout::augment(&problem));
        assert_eq!(transit.transit(0), 0);
        assert_eq!(transit.transit(1), 5);
        assert_eq!(transit.transit(3), -8);
        assert_eq!(transit.transit(4), -8);
    }

    #[rstest]
    #[case(3, 4)]
    #[case(4, 0)]
    #[case(0, 3)]
    fn reload_borders_are_forbidden(problem: Problem, #[case] from: usize, #[case] to: usize) {
        let transit = TravelTransit::new(&problem, NodeLayout::augment(&problem));
        assert_eq!(transit.transit(from, to), INFINITE_COST);
    }

    #[rstest]
    #[case(1, 2, 3 + 2)]
    #[case(0, 1, 4 + 1)]
    #[case(1, 3, 4 + 2)]
    #[case(3, 2, 6 + 1)]
    #[case(2, 0, 6 + 3)]
    fn travel_adds_departure_service(
        problem: Problem,
        #[case] from: usize,
        #[case] to: usize,
        #[case] expected: i64,
    ) {
        let transit = TravelTransit::new(&problem, NodeLayout::augment(&problem));
        assert_eq!(transit.transit(from, to), expected);
    }

    #[rstest]
    fn capacity_slack_exists_only_at_reloads(problem: Problem) {
        let encoding = encoded(&problem);
        let capacity = encoding
            .model
            .dimension(CAPACITY_DIMENSION)
            .expect("capacity declared");
        for node in 0..3 {
            assert_eq!(capacity.slack_bounds(node), Bounds::exactly(0));
        }
        assert_eq!(capacity.slack_bounds(3), Bounds::new(0, 8));
        assert_eq!(capacity.start_bounds(0), Bounds::exactly(0));
        assert_eq!(capacity.capacity(), 8);
    }

    #[rstest]
    fn travel_budget_caps_every_cumul(problem: Problem) {
        let encoding = encoded(&problem);
        let budget = encoding
            .model
            .dimension(TRAVEL_TIME_DIMENSION)
            .expect("budget declared");
        assert_eq!(budget.cumul_bounds(2), Bounds::new(0, 120));
        assert_eq!(budget.slack_bounds(2), Bounds::exactly(0));
        assert!(budget.fixes_start_cumul_to_zero());
    }

    #[rstest]
    fn windows_apply_to_customers_only(problem: Problem) {
        let encoding = encoded(&problem);
        let windows = encoding
            .model
            .dimension(TIME_WINDOW_DIMENSION)
            .expect("windows declared");
        assert_eq!(windows.cumul_bounds(1), Bounds::new(10, 40));
        assert_eq!(windows.cumul_bounds(2), Bounds::new(0, 90));
        assert!(!windows.is_restricted(0));
        assert!(!windows.is_restricted(3));
        assert!(!windows.fixes_start_cumul_to_zero());
        assert_eq!(windows.capacity(), INFINITE_COST);
        assert_eq!(
            encoding.model.dimension_index(TIME_WINDOW_DIMENSION),
            Some(encoding.time_window)
        );
    }

    #[rstest]
    fn reloads_are_free_to_skip(problem: Problem) {
        let encoding = encoded(&problem);
        for reload in encoding.layout.reload_nodes() {
            let disjunction = encoding
                .model
                .disjunction_of(reload)
                .expect("reload is optional");
            assert_eq!(disjunction.nodes(), &[reload]);
            assert_eq!(disjunction.penalty(), 0);
        }
        assert_eq!(encoding.model.mandatory_nodes().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[rstest]
    fn every_vehicle_carries_the_sentinel_fixed_cost(problem: Problem) {
        let encoding = encoded(&problem);
        assert_eq!(encoding.model.fixed_cost(0), INFINITE_COST);
        assert_eq!(encoding.model.fixed_cost(1), INFINITE_COST);
    }

    #[rstest]
    fn encoding_is_repeatable(problem: Problem) {
        let first = encoded(&problem);
        let second = encoded(&problem);
        let nodes = first.model.node_count();
        assert_eq!(nodes, second.model.node_count());
        for from in 0..nodes {
            for to in 0..nodes {
                assert_eq!(first.model.arc_cost(from, to), second.model.arc_cost(from, to));
            }
        }
        assert_eq!(first.model.dimensions(), second.model.dimensions());
    }
}
