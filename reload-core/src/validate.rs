//! Structural checks run before any encoding work.

use thiserror::Error;

use crate::Problem;

/// Reasons a [`Problem`] is rejected before encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemError {
    /// The depot index does not name a node.
    #[error("depot {depot} is outside the {nodes} declared nodes")]
    DepotOutOfRange {
        /// Declared depot index.
        depot: usize,
        /// Declared node count.
        nodes: usize,
    },
    /// The depot carries a demand.
    #[error("depot demand must be zero, found {demand}")]
    DepotDemand {
        /// Demand recorded for the depot.
        demand: i64,
    },
    /// The matrix row count differs from the node count.
    #[error("time matrix has {rows} rows but {nodes} nodes were declared")]
    MatrixRows {
        /// Number of rows supplied.
        rows: usize,
        /// Declared node count.
        nodes: usize,
    },
    /// A matrix row has the wrong length.
    #[error("time matrix row {row} has {columns} columns but {nodes} nodes were declared")]
    MatrixColumns {
        /// Offending row.
        row: usize,
        /// Number of columns in that row.
        columns: usize,
        /// Declared node count.
        nodes: usize,
    },
    /// The time window count differs from the node count.
    #[error("{windows} time windows supplied for {nodes} nodes")]
    TimeWindows {
        /// Number of windows supplied.
        windows: usize,
        /// Declared node count.
        nodes: usize,
    },
    /// The demand count differs from the node count.
    #[error("{demands} demands supplied for {nodes} nodes")]
    Demands {
        /// Number of demands supplied.
        demands: usize,
        /// Declared node count.
        nodes: usize,
    },
    /// The service time count differs from the node count.
    #[error("{service_times} service times supplied for {nodes} nodes")]
    ServiceTimes {
        /// Number of service times supplied.
        service_times: usize,
        /// Declared node count.
        nodes: usize,
    },
    /// A node demand is negative.
    #[error("node {node} has negative demand {demand}")]
    NegativeDemand {
        /// Offending node.
        node: usize,
        /// Its demand.
        demand: i64,
    },
    /// Demands add up to more than a 64-bit load can hold.
    #[error("total demand overflows a 64-bit load")]
    DemandOverflow,
    /// Vehicle capacity is zero or negative.
    #[error("vehicle capacity must be positive, found {capacity}")]
    NonPositiveCapacity {
        /// Declared capacity.
        capacity: i64,
    },
    /// The per-vehicle travel budget is negative.
    #[error("travel time budget must not be negative, found {travel_time}")]
    NegativeTravelBudget {
        /// Declared budget.
        travel_time: i64,
    },
    /// A time window closes before it opens.
    #[error("node {node} has time window [{earliest}, {latest}] that closes before it opens")]
    InvertedTimeWindow {
        /// Offending node.
        node: usize,
        /// Window start.
        earliest: i64,
        /// Window end.
        latest: i64,
    },
}

impl Problem {
    /// Check the structural preconditions of the problem.
    ///
    /// The depot must exist and carry zero demand, and every per-node table
    /// must have exactly `nodes` entries. Demands must be non-negative so the
    /// reload sizing stays meaningful, and capacity must be positive.
    ///
    /// # Examples
    /// ```
    /// use reload_core::{Problem, ProblemError, TimeWindow};
    ///
    /// let problem = Problem {
    ///     nodes: 1,
    ///     vehicles: 1,
    ///     depot: 0,
    ///     demands: vec![3],
    ///     time_matrix: vec![vec![0]],
    ///     time_windows: vec![TimeWindow::new(0, 10)],
    ///     service_time: vec![0],
    ///     capacity: 5,
    ///     travel_time: 10,
    ///     timeout: 1,
    /// };
    /// assert_eq!(problem.validate(), Err(ProblemError::DepotDemand { demand: 3 }));
    /// ```
    pub fn validate(&self) -> Result<(), ProblemError> {
        let nodes = self.nodes;
        if self.depot >= nodes {
            return Err(ProblemError::DepotOutOfRange {
                depot: self.depot,
                nodes,
            });
        }
        let depot_demand =
            self.demands
                .get(self.depot)
                .copied()
                .ok_or(ProblemError::Demands {
                    demands: self.demands.len(),
                    nodes,
                })?;
        if depot_demand != 0 {
            return Err(ProblemError::DepotDemand {
                demand: depot_demand,
            });
        }
        if self.time_matrix.len() != nodes {
            return Err(ProblemError::MatrixRows {
                rows: self.time_matrix.len(),
                nodes,
            });
        }
        if self.time_windows.len() != nodes {
            return Err(ProblemError::TimeWindows {
                windows: self.time_windows.len(),
                nodes,
            });
        }
        self.validate_tables()?;
        self.validate_values()
    }

    fn validate_tables(&self) -> Result<(), ProblemError> {
        let nodes = self.nodes;
        if let Some((row, columns)) = self
            .time_matrix
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, columns)| *columns != nodes)
        {
            return Err(ProblemError::MatrixColumns {
                row,
                columns,
                nodes,
            });
        }
        if self.demands.len() != nodes {
            return Err(ProblemError::Demands {
                demands: self.demands.len(),
                nodes,
            });
        }
        if self.service_time.len() != nodes {
            return Err(ProblemError::ServiceTimes {
                service_times: self.service_time.len(),
                nodes,
            });
        }
        Ok(())
    }

    fn validate_values(&self) -> Result<(), ProblemError> {
        if let Some((node, demand)) = self
            .demands
            .iter()
            .copied()
            .enumerate()
            .find(|(_, demand)| *demand < 0)
        {
            return Err(ProblemError::NegativeDemand { node, demand });
        }
        self.demands
            .iter()
            .try_fold(0_i64, |total, demand| total.checked_add(*demand))
            .ok_or(ProblemError::DemandOverflow)?;
        if self.capacity <= 0 {
            return Err(ProblemError::NonPositiveCapacity {
                capacity: self.capacity,
            });
        }
        if self.travel_time < 0 {
            return Err(ProblemError::NegativeTravelBudget {
                travel_time: self.travel_time,
            });
        }
        if let Some((node, window)) = self
            .time_windows
            .iter()
            .enumerate()
            .find(|(node, window)| *node != self.depot && window.earliest > window.latest)
        {
            return Err(ProblemError::InvertedTimeWindow {
                node,
                earliest: window.earliest,
                latest: window.latest,
            });
        }
        Ok(())
    }
}
