//! Cumulative resource tracks.
//!
//! Along a route, `cumul(next) = cumul(node) + transit(node, next) + slack(node)`.
//! Every cumul lies in `[0, capacity]` intersected with any per-node
//! restriction, and every slack in `[0, slack_max]` unless it was fixed.

use super::{Bounds, ModelError, Transit};

/// Declaration of a new dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSpec {
    /// Evaluator accumulated along the route.
    pub transit: Transit,
    /// Largest slack a stop may absorb.
    pub slack_max: i64,
    /// Upper bound of every cumul.
    pub capacity: i64,
    /// Pin the cumul of every route start to zero.
    pub fix_start_cumul_to_zero: bool,
    /// Unique dimension name.
    pub name: String,
}

/// Handle to a dimension within its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionIndex(pub(crate) usize);

impl DimensionIndex {
    /// Position of the dimension in [`RoutingModel::dimensions`](super::RoutingModel::dimensions).
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

/// A cumulative track with per-node slack and cumul restrictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    name: String,
    transit: Transit,
    slack_max: i64,
    capacity: i64,
    fix_start_cumul_to_zero: bool,
    fixed_slack: Vec<Option<i64>>,
    cumul_restriction: Vec<Option<Bounds>>,
}

impl Dimension {
    pub(super) fn new(spec: DimensionSpec, node_count: usize) -> Self {
        let DimensionSpec {
            transit,
            slack_max,
            capacity,
            fix_start_cumul_to_zero,
            name,
        } = spec;
        Self {
            name,
            transit,
            slack_max,
            capacity,
            fix_start_cumul_to_zero,
            fixed_slack: vec![None; node_count],
            cumul_restriction: vec![None; node_count],
        }
    }

    /// Dimension name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluator accumulated by this dimension.
    #[must_use]
    pub const fn transit(&self) -> Transit {
        self.transit
    }

    /// Largest slack any stop may absorb.
    #[must_use]
    pub const fn slack_max(&self) -> i64 {
        self.slack_max
    }

    /// Upper bound of every cumul.
    #[must_use]
    pub const fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Whether route starts are pinned to zero.
    #[must_use]
    pub const fn fixes_start_cumul_to_zero(&self) -> bool {
        self.fix_start_cumul_to_zero
    }

    /// Force the slack at every visit of `node` to `value`.
    ///
    /// # Errors
    /// Returns [`ModelError::NodeOutOfRange`] for unknown nodes and
    /// [`ModelError::SlackOutOfRange`] when `value` is outside `[0, slack_max]`.
    pub fn fix_slack(&mut self, node: usize, value: i64) -> Result<(), ModelError> {
        if !(0..=self.slack_max).contains(&value) {
            return Err(ModelError::SlackOutOfRange {
                node,
                value,
                slack_max: self.slack_max,
            });
        }
        let node_count = self.fixed_slack.len();
        let slot = self
            .fixed_slack
            .get_mut(node)
            .ok_or(ModelError::NodeOutOfRange { node, node_count })?;
        *slot = Some(value);
        Ok(())
    }

    /// Restrict the cumul at every visit of `node` to `[min, max]`.
    ///
    /// Repeated restrictions intersect.
    ///
    /// # Errors
    /// Returns [`ModelError::NodeOutOfRange`] for unknown nodes and
    /// [`ModelError::EmptyCumulRange`] when the restriction admits no value.
    pub fn restrict_cumul(&mut self, node: usize, min: i64, max: i64) -> Result<(), ModelError> {
        let node_count = self.cumul_restriction.len();
        let slot = self
            .cumul_restriction
            .get_mut(node)
            .ok_or(ModelError::NodeOutOfRange { node, node_count })?;
        let requested = Bounds::new(min, max);
        let restricted = slot.map_or(requested, |current| current.intersect(requested));
        if restricted.is_empty() {
            return Err(ModelError::EmptyCumulRange { node, min, max });
        }
        *slot = Some(restricted);
        Ok(())
    }

    /// Admissible slack when departing `node`.
    #[must_use]
    pub fn slack_bounds(&self, node: usize) -> Bounds {
        self.fixed_slack
            .get(node)
            .copied()
            .flatten()
            .map_or(Bounds::new(0, self.slack_max), Bounds::exactly)
    }

    /// Admissible cumul at a visit of `node`.
    #[must_use]
    pub fn cumul_bounds(&self, node: usize) -> Bounds {
        let base = Bounds::new(0, self.capacity);
        self.cumul_restriction
            .get(node)
            .copied()
            .flatten()
            .map_or(base, |restriction| base.intersect(restriction))
    }

    /// Admissible cumul at the start of a route leaving `depot`.
    #[must_use]
    pub fn start_bounds(&self, depot: usize) -> Bounds {
        let bounds = self.cumul_bounds(depot);
        if self.fix_start_cumul_to_zero {
            bounds.intersect(Bounds::exactly(0))
        } else {
            bounds
        }
    }

    /// Whether the cumul of `node` carries an explicit restriction.
    #[must_use]
    pub fn is_restricted(&self, node: usize) -> bool {
        matches!(self.cumul_restriction.get(node), Some(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EvaluatorIndex;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dimension() -> Dimension {
        Dimension::new(
            DimensionSpec {
                transit: Transit::Binary(EvaluatorIndex(0)),
                slack_max: 5,
                capacity: 100,
                fix_start_cumul_to_zero: true,
                name: "Time".to_owned(),
            },
            3,
        )
    }

    #[rstest]
    fn slack_defaults_to_slack_max(dimension: Dimension) {
        assert_eq!(dimension.slack_bounds(1), Bounds::new(0, 5));
    }

    #[rstest]
    fn fixed_slack_is_exact(mut dimension: Dimension) {
        dimension.fix_slack(1, 0).expect("slack in range");
        assert_eq!(dimension.slack_bounds(1), Bounds::exactly(0));
        assert_eq!(dimension.slack_bounds(2), Bounds::new(0, 5));
    }

    #[rstest]
    #[case(6)]
    #[case(-1)]
    fn fixed_slack_must_fit(mut dimension: Dimension, #[case] value: i64) {
        let err = dimension.fix_slack(1, value).expect_err("slack out of range");
        assert!(matches!(err, ModelError::SlackOutOfRange { .. }));
    }

    #[rstest]
    fn restrictions_intersect_with_capacity(mut dimension: Dimension) {
        dimension.restrict_cumul(2, 50, 500).expect("valid range");
        assert_eq!(dimension.cumul_bounds(2), Bounds::new(50, 100));
        dimension.restrict_cumul(2, 60, 70).expect("valid range");
        assert_eq!(dimension.cumul_bounds(2), Bounds::new(60, 70));
        assert!(dimension.is_restricted(2));
        assert!(!dimension.is_restricted(1));
    }

    #[rstest]
    fn disjoint_restriction_is_rejected(mut dimension: Dimension) {
        dimension.restrict_cumul(2, 10, 20).expect("valid range");
        let err = dimension
            .restrict_cumul(2, 30, 40)
            .expect_err("disjoint restriction");
        assert_eq!(
            err,
            ModelError::EmptyCumulRange {
                node: 2,
                min: 30,
                max: 40
            }
        );
    }

    #[rstest]
    fn unknown_node_is_rejected(mut dimension: Dimension) {
        let err = dimension.restrict_cumul(9, 0, 1).expect_err("unknown node");
        assert_eq!(
            err,
            ModelError::NodeOutOfRange {
                node: 9,
                node_count: 3
            }
        );
    }

    #[rstest]
    fn start_is_pinned_when_requested(dimension: Dimension) {
        assert_eq!(dimension.start_bounds(0), Bounds::exactly(0));
    }
}
