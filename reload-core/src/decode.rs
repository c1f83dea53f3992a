//! Translation of an engine assignment into per-stop route output.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::encode::Encoding;
use crate::engine::{Assignment, EngineError};

/// Visited stops as three parallel columns.
///
/// Entry `i` of each column describes the same stop. Stops are ordered by
/// vehicle, then by visiting order, and every vehicle contributes its start
/// and end depot visits. Reload stops are reported as the depot.
///
/// # Examples
/// ```
/// use reload_core::RoutePlan;
///
/// let mut plan = RoutePlan::default();
/// plan.push(0, 0, 0);
/// plan.push(2, 0, 7);
/// plan.push(0, 0, 12);
/// assert_eq!(plan.len(), 3);
/// assert_eq!(plan.route(0).collect::<Vec<_>>(), vec![(0, 0), (2, 7), (0, 12)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoutePlan {
    /// Node of every stop.
    pub nodes: Vec<usize>,
    /// Vehicle of every stop.
    pub vehicles: Vec<usize>,
    /// Arrival time of every stop.
    pub time: Vec<i64>,
}

impl RoutePlan {
    /// Append one stop.
    pub fn push(&mut self, node: usize, vehicle: usize, time: i64) {
        self.nodes.push(node);
        self.vehicles.push(vehicle);
        self.time.push(time);
    }

    /// Number of stops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the plan has no stops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `(node, time)` pairs of `vehicle` in visiting order.
    pub fn route(&self, vehicle: usize) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.nodes
            .iter()
            .zip(&self.vehicles)
            .zip(&self.time)
            .filter(move |((_, stop_vehicle), _)| **stop_vehicle == vehicle)
            .map(|((node, _), time)| (*node, *time))
    }
}

/// Walk every vehicle of `assignment` and collect its stops.
///
/// # Errors
/// Returns [`EngineError::Contract`] when a vehicle has no route or a stop
/// lacks a time-window cumul.
pub fn decode(assignment: &Assignment, encoding: &Encoding) -> Result<RoutePlan, EngineError> {
    let vehicles = encoding.model.vehicles();
    if assignment.vehicles() != vehicles {
        return Err(EngineError::Contract {
            reason: format!(
                "assignment has {} routes for {vehicles} vehicles",
                assignment.vehicles()
            ),
        });
    }

    let mut plan = RoutePlan::default();
    for vehicle in 0..vehicles {
        let mut cursor = assignment.start(vehicle).ok_or_else(|| EngineError::Contract {
            reason: format!("vehicle {vehicle} has no route"),
        })?;
        loop {
            let node = assignment
                .stop(cursor)
                .map(|stop| stop.node)
                .ok_or_else(|| EngineError::Contract {
                    reason: format!("vehicle {vehicle} route ends unexpectedly"),
                })?;
            let time = assignment
                .cumul(encoding.time_window, cursor)
                .ok_or_else(|| EngineError::Contract {
                    reason: format!("stop at node {node} has no time-window cumul"),
                })?;
            plan.push(encoding.layout.physical(node), vehicle, time.max);
            match assignment.next(cursor) {
                Some(next) => cursor = next,
                None => break,
            }
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;
    use crate::engine::{Stop, VehicleRoute};
    use crate::model::Bounds;
    use crate::{NodeLayout, Problem, TimeWindow};
    use rstest::{fixture, rstest};

    #[fixture]
    fn encoding() -> Encoding {
        let problem = Problem {
            nodes: 3,
            vehicles: 2,
            depot: 0,
            demands: vec![0, 5, 5],
            time_matrix: vec![vec![0, 2, 2], vec![2, 0, 2], vec![2, 2, 0]],
            time_windows: vec![TimeWindow::new(0, 100); 3],
            service_time: vec![0, 0, 0],
            capacity: 8,
            travel_time: 100,
            timeout: 1,
        };
        encode(&problem, NodeLayout::augment(&problem)).expect("problem encodes")
    }

    fn stop(node: usize, time: Bounds) -> Stop {
        Stop {
            node,
            cumuls: vec![Bounds::exactly(0), Bounds::exactly(0), time],
        }
    }

    #[rstest]
    fn reload_stops_are_reported_as_depot(encoding: Encoding) {
        let assignment = Assignment::new(
            vec![
                VehicleRoute::new(vec![
                    stop(0, Bounds::exactly(0)),
                    stop(1, Bounds::exactly(2)),
                    stop(3, Bounds::exactly(4)),
                    stop(2, Bounds::exactly(6)),
                    stop(0, Bounds::exactly(8)),
                ]),
                VehicleRoute::new(vec![stop(0, Bounds::exactly(0)), stop(0, Bounds::exactly(0))]),
            ],
            8,
        );
        let plan = decode(&assignment, &encoding).expect("consistent assignment");
        assert_eq!(plan.nodes, vec![0, 1, 0, 2, 0, 0, 0]);
        assert_eq!(plan.vehicles, vec![0, 0, 0, 0, 0, 1, 1]);
        assert_eq!(plan.time, vec![0, 2, 4, 6, 8, 0, 0]);
    }

    #[rstest]
    fn reports_upper_bound_of_committed_time(encoding: Encoding) {
        let assignment = Assignment::new(
            vec![
                VehicleRoute::new(vec![stop(0, Bounds::new(0, 40)), stop(0, Bounds::new(0, 40))]),
                VehicleRoute::new(vec![stop(0, Bounds::new(3, 9)), stop(0, Bounds::new(3, 9))]),
            ],
            0,
        );
        let plan = decode(&assignment, &encoding).expect("consistent assignment");
        assert_eq!(plan.time, vec![40, 40, 9, 9]);
    }

    #[rstest]
    fn missing_route_breaks_the_contract(encoding: Encoding) {
        let assignment = Assignment::new(
            vec![VehicleRoute::new(vec![stop(0, Bounds::exactly(0))])],
            0,
        );
        let err = decode(&assignment, &encoding).expect_err("one route for two vehicles");
        assert!(matches!(err, EngineError::Contract { .. }));
    }

    #[rstest]
    fn missing_time_cumul_breaks_the_contract(encoding: Encoding) {
        let bare = Stop {
            node: 0,
            cumuls: Vec::new(),
        };
        let assignment = Assignment::new(
            vec![
                VehicleRoute::new(vec![bare.clone(), bare.clone()]),
                VehicleRoute::new(vec![bare.clone(), bare]),
            ],
            0,
        );
        let err = decode(&assignment, &encoding).expect_err("no cumuls");
        assert!(matches!(err, EngineError::Contract { .. }));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn serialises_as_parallel_columns() {
        let mut plan = RoutePlan::default();
        plan.push(0, 0, 0);
        plan.push(0, 0, 5);
        let json = serde_json::to_value(&plan).expect("serialise plan");
        assert_eq!(
            json,
            serde_json::json!({"nodes": [0, 0], "vehicles": [0, 0], "time": [0, 5]})
        );
    }
}
