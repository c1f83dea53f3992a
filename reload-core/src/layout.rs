//! Node augmentation with synthetic reload stops.
//!
//! A reload node stands for "return to the depot and refill" at any point of
//! a route. Reload nodes follow the real nodes, so identities
//! `[nodes, nodes + reload_count)` are reloads and every physical lookup on
//! them is redirected to the depot.

use std::ops::Range;

use crate::Problem;

/// Classification of a node identity in the augmented node set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The shared start and end node of every route.
    Depot,
    /// A real delivery node.
    Customer,
    /// A synthetic reload stop.
    Reload,
}

/// Boundaries of the augmented node set.
///
/// # Examples
/// ```
/// use reload_core::{NodeKind, NodeLayout};
///
/// let layout = NodeLayout::new(3, 2, 0);
/// assert_eq!(layout.total_nodes(), 5);
/// assert_eq!(layout.kind(0), NodeKind::Depot);
/// assert_eq!(layout.kind(2), NodeKind::Customer);
/// assert_eq!(layout.kind(4), NodeKind::Reload);
/// assert_eq!(layout.physical(4), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLayout {
    node_count: usize,
    reload_count: usize,
    depot: usize,
}

impl NodeLayout {
    /// Describe a node set with `reload_count` reloads appended after
    /// `node_count` real nodes.
    #[must_use]
    pub const fn new(node_count: usize, reload_count: usize, depot: usize) -> Self {
        Self {
            node_count,
            reload_count,
            depot,
        }
    }

    /// Size the reload set for a validated problem.
    ///
    /// One reload is provisioned per full vehicle load of total demand, i.e.
    /// `ceil(sum(demand) / capacity)`. Unused reloads are optional and cost
    /// nothing, so over-provisioning is harmless.
    #[must_use]
    pub fn augment(problem: &Problem) -> Self {
        let reload_count = reload_count(problem.total_demand(), problem.capacity);
        log::debug!(
            "augmenting {} nodes with {reload_count} reload nodes (capacity {})",
            problem.nodes,
            problem.capacity
        );
        Self::new(problem.nodes, reload_count, problem.depot)
    }

    /// Number of real nodes, depot included.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of synthetic reload nodes.
    #[must_use]
    pub const fn reload_count(&self) -> usize {
        self.reload_count
    }

    /// Real plus synthetic node count.
    #[must_use]
    pub const fn total_nodes(&self) -> usize {
        self.node_count.saturating_add(self.reload_count)
    }

    /// The depot node.
    #[must_use]
    pub const fn depot(&self) -> usize {
        self.depot
    }

    /// Identities of the reload nodes.
    #[must_use]
    pub const fn reload_nodes(&self) -> Range<usize> {
        self.node_count..self.total_nodes()
    }

    /// Real nodes other than the depot.
    pub fn customers(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.node_count).filter(move |node| *node != self.depot)
    }

    /// Classify a node identity.
    #[must_use]
    pub const fn kind(&self, node: usize) -> NodeKind {
        if node == self.depot {
            NodeKind::Depot
        } else if node >= self.node_count && node < self.total_nodes() {
            NodeKind::Reload
        } else {
            NodeKind::Customer
        }
    }

    /// Whether `node` is a synthetic reload.
    #[must_use]
    pub const fn is_reload(&self, node: usize) -> bool {
        matches!(self.kind(node), NodeKind::Reload)
    }

    /// Map a node identity to the real node it stands for.
    #[must_use]
    pub const fn physical(&self, node: usize) -> usize {
        if self.is_reload(node) {
            self.depot
        } else {
            node
        }
    }
}

fn reload_count(total_demand: i64, capacity: i64) -> usize {
    let demand = u64::try_from(total_demand).unwrap_or(0);
    let capacity = u64::try_from(capacity).unwrap_or(0).max(1);
    usize::try_from(demand.div_ceil(capacity)).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimeWindow;
    use rstest::rstest;

    fn problem(demands: Vec<i64>, capacity: i64) -> Problem {
        let nodes = demands.len();
        Problem {
            nodes,
            vehicles: 1,
            depot: 0,
            demands,
            time_matrix: vec![vec![0; nodes]; nodes],
            time_windows: vec![TimeWindow::new(0, 100); nodes],
            service_time: vec![0; nodes],
            capacity,
            travel_time: 100,
            timeout: 1,
        }
    }

    #[rstest]
    #[case(vec![0, 5, 5], 8, 2)]
    #[case(vec![0, 4, 4], 8, 1)]
    #[case(vec![0, 0, 0], 8, 0)]
    #[case(vec![0, 1], 1, 1)]
    #[case(vec![0, 7, 7, 7], 3, 7)]
    fn reload_count_rounds_up(
        #[case] demands: Vec<i64>,
        #[case] capacity: i64,
        #[case] expected: usize,
    ) {
        let layout = NodeLayout::augment(&problem(demands, capacity));
        assert_eq!(layout.reload_count(), expected);
    }

    #[rstest]
    fn reload_nodes_follow_real_nodes() {
        let layout = NodeLayout::augment(&problem(vec![0, 5, 5], 8));
        assert_eq!(layout.reload_nodes(), 3..5);
        assert_eq!(layout.total_nodes(), 5);
        assert!(layout.reload_nodes().all(|node| layout.is_reload(node)));
        assert!(layout.reload_nodes().all(|node| layout.physical(node) == 0));
    }

    #[rstest]
    fn customers_exclude_depot() {
        let layout = NodeLayout::new(4, 1, 2);
        assert_eq!(layout.customers().collect::<Vec<_>>(), vec![0, 1, 3]);
        assert_eq!(layout.kind(2), NodeKind::Depot);
        assert_eq!(layout.kind(4), NodeKind::Reload);
        assert_eq!(layout.physical(3), 3);
    }
}
