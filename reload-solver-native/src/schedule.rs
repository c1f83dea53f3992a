//! Cumul propagation along a single route.
//!
//! A route is the visiting order between the start and end depot tokens.
//! Every dimension is a chain `c[i + 1] = c[i] + transit + slack`, so forward
//! interval propagation decides feasibility exactly. Committing a route adds
//! a backward pass that keeps, per stop, every value some complete schedule
//! can take.

use std::iter;

use reload_core::{Bounds, Dimension, RoutingModel, Stop};

/// Reachable cumul range of every dimension at one stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reach {
    ranges: Vec<Bounds>,
}

impl Reach {
    /// Ranges at the start depot, or `None` when a start cumul is empty.
    pub(crate) fn start(model: &RoutingModel) -> Option<Self> {
        let ranges: Vec<Bounds> = model
            .dimensions()
            .iter()
            .map(|dimension| dimension.start_bounds(model.depot()))
            .collect();
        ranges
            .iter()
            .all(|range| !range.is_empty())
            .then_some(Self { ranges })
    }

    /// Ranges after travelling `from` → `to`, or `None` when `to` admits no
    /// value in some dimension.
    pub(crate) fn advance(&self, model: &RoutingModel, from: usize, to: usize) -> Option<Self> {
        model
            .dimensions()
            .iter()
            .zip(&self.ranges)
            .map(|(dimension, reach)| {
                let next = step(model, dimension, *reach, from, to);
                (!next.is_empty()).then_some(next)
            })
            .collect::<Option<Vec<_>>>()
            .map(|ranges| Self { ranges })
    }
}

fn step(
    model: &RoutingModel,
    dimension: &Dimension,
    reach: Bounds,
    from: usize,
    to: usize,
) -> Bounds {
    reach
        .offset(model.transit(dimension, from, to))
        .widen(dimension.slack_bounds(from))
        .intersect(dimension.cumul_bounds(to))
}

fn tokens(depot: usize, route: &[usize]) -> impl Iterator<Item = usize> + '_ {
    iter::once(depot)
        .chain(route.iter().copied())
        .chain(iter::once(depot))
}

fn arcs(depot: usize, route: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    tokens(depot, route).zip(tokens(depot, route).skip(1))
}

/// Forward reachable cumul ranges, one per token, or `None` when some stop
/// admits no value.
fn forward(model: &RoutingModel, dimension: &Dimension, route: &[usize]) -> Option<Vec<Bounds>> {
    let mut reach = dimension.start_bounds(model.depot());
    if reach.is_empty() {
        return None;
    }
    let mut ranges = Vec::with_capacity(route.len().saturating_add(2));
    ranges.push(reach);
    for (from, to) in arcs(model.depot(), route) {
        reach = step(model, dimension, reach, from, to);
        if reach.is_empty() {
            return None;
        }
        ranges.push(reach);
    }
    Some(ranges)
}

/// Consistent cumul range per token for one dimension: a value survives
/// only if some full schedule passes through it.
fn consistent(model: &RoutingModel, dimension: &Dimension, route: &[usize]) -> Option<Vec<Bounds>> {
    let reachable = forward(model, dimension, route)?;
    let legs: Vec<(usize, usize)> = arcs(model.depot(), route).collect();

    let mut later = *reachable.last()?;
    let mut ranges = Vec::with_capacity(reachable.len());
    ranges.push(later);
    for ((from, to), reach) in legs.iter().zip(&reachable).rev() {
        let transit = model.transit(dimension, *from, *to);
        later = reach.intersect(
            later
                .offset(transit.saturating_neg())
                .narrow(dimension.slack_bounds(*from)),
        );
        if later.is_empty() {
            return None;
        }
        ranges.push(later);
    }
    ranges.reverse();
    Some(ranges)
}

/// Tighten the schedule of `route` and return its stops, start and end
/// tokens included, or `None` when the route is infeasible.
pub(crate) fn commit(model: &RoutingModel, route: &[usize]) -> Option<Vec<Stop>> {
    let mut stops: Vec<Stop> = tokens(model.depot(), route)
        .map(|node| Stop {
            node,
            cumuls: Vec::with_capacity(model.dimensions().len()),
        })
        .collect();
    for dimension in model.dimensions() {
        let ranges = consistent(model, dimension, route)?;
        for (stop, range) in stops.iter_mut().zip(ranges) {
            stop.cumuls.push(range);
        }
    }
    Some(stops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reload_core::test_support::ProblemBuilder;
    use reload_core::{NodeLayout, Problem, encode};
    use rstest::rstest;

    fn model(problem: &Problem) -> RoutingModel {
        encode(problem, NodeLayout::augment(problem))
            .expect("problem encodes")
            .model
    }

    fn is_feasible(model: &RoutingModel, route: &[usize]) -> bool {
        let start = Reach::start(model).expect("start cumuls admit zero");
        arcs(model.depot(), route)
            .try_fold(start, |reach, (from, to)| reach.advance(model, from, to))
            .is_some()
    }

    fn column(stops: &[Stop], dimension: usize, pick: fn(&Bounds) -> i64) -> Vec<i64> {
        stops
            .iter()
            .filter_map(|stop| stop.cumuls.get(dimension).map(pick))
            .collect()
    }

    fn latest(stops: &[Stop], dimension: usize) -> Vec<i64> {
        column(stops, dimension, |bounds| bounds.max)
    }

    fn earliest(stops: &[Stop], dimension: usize) -> Vec<i64> {
        column(stops, dimension, |bounds| bounds.min)
    }

    #[rstest]
    fn empty_route_is_feasible() {
        let problem = ProblemBuilder::line(3).build();
        let routing = model(&problem);
        assert!(is_feasible(&routing, &[]));
        let stops = commit(&routing, &[]).expect("empty route commits");
        assert_eq!(stops.iter().map(|stop| stop.node).collect::<Vec<_>>(), vec![0, 0]);
    }

    #[rstest]
    fn load_without_reload_exceeds_capacity() {
        let problem = ProblemBuilder::line(3)
            .demands(vec![0, 5, 5])
            .capacity(8)
            .build();
        let routing = model(&problem);
        assert!(is_feasible(&routing, &[1]));
        assert!(!is_feasible(&routing, &[1, 2]));
        assert!(is_feasible(&routing, &[1, 3, 2]));
    }

    #[rstest]
    fn reload_resets_committed_load() {
        let problem = ProblemBuilder::line(3)
            .demands(vec![0, 5, 5])
            .capacity(8)
            .build();
        let routing = model(&problem);
        let stops = commit(&routing, &[1, 3, 2]).expect("route with reload commits");
        assert_eq!(earliest(&stops, 0), vec![0, 0, 5, 0, 5]);
        assert_eq!(latest(&stops, 0), vec![0, 0, 5, 3, 8]);
    }

    #[rstest]
    fn departure_waits_for_first_window() {
        let problem = ProblemBuilder::line(3)
            .window(1, 4, 6)
            .window(2, 0, 100)
            .build();
        let routing = model(&problem);
        let stops = commit(&routing, &[1, 2]).expect("route commits");
        assert_eq!(earliest(&stops, 2), vec![3, 4, 5, 7]);
        assert_eq!(latest(&stops, 2), vec![5, 6, 7, 9]);
        assert_eq!(earliest(&stops, 1), vec![0, 1, 2, 4]);
    }

    #[rstest]
    fn committed_time_reports_latest_consistent_arrival() {
        let problem = ProblemBuilder::line(2).window(1, 0, 100).build();
        let routing = model(&problem);
        let stops = commit(&routing, &[1]).expect("route commits");
        assert_eq!(latest(&stops, 2), vec![99, 100, 101]);
        assert_eq!(earliest(&stops, 2), vec![0, 1, 2]);
    }

    #[rstest]
    fn missed_window_is_infeasible() {
        let problem = ProblemBuilder::line(3).window(1, 0, 1).build();
        let routing = model(&problem);
        assert!(is_feasible(&routing, &[1, 2]));
        assert!(!is_feasible(&routing, &[2, 1]));
        assert!(commit(&routing, &[2, 1]).is_none());
    }

    #[rstest]
    fn travel_budget_caps_route_length() {
        let problem = ProblemBuilder::line(4).travel_time(5).build();
        let routing = model(&problem);
        assert!(is_feasible(&routing, &[1, 2]));
        assert!(!is_feasible(&routing, &[3, 1]));
    }
}
