//! Delivery problems with per-node demand, time windows and service times.
//!
//! A [`Problem`] mirrors the JSON request accepted by the command-line tool.
//! Field names are fixed so that existing request files deserialise without
//! any mapping layer.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inclusive arrival window `[earliest, latest]` for a node.
///
/// On the wire a window is a two-element array, e.g. `[0, 480]`.
///
/// # Examples
/// ```
/// use reload_core::TimeWindow;
///
/// let window = TimeWindow::new(10, 20);
/// assert!(window.contains(10));
/// assert!(window.contains(20));
/// assert!(!window.contains(21));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[i64; 2]", into = "[i64; 2]"))]
pub struct TimeWindow {
    /// Earliest permitted arrival.
    pub earliest: i64,
    /// Latest permitted arrival.
    pub latest: i64,
}

impl TimeWindow {
    /// Construct a window from its bounds.
    #[must_use]
    pub const fn new(earliest: i64, latest: i64) -> Self {
        Self { earliest, latest }
    }

    /// Return whether `time` lies inside the window.
    #[must_use]
    pub const fn contains(&self, time: i64) -> bool {
        self.earliest <= time && time <= self.latest
    }
}

impl From<[i64; 2]> for TimeWindow {
    fn from([earliest, latest]: [i64; 2]) -> Self {
        Self::new(earliest, latest)
    }
}

impl From<TimeWindow> for [i64; 2] {
    fn from(window: TimeWindow) -> Self {
        [window.earliest, window.latest]
    }
}

/// A capacitated routing problem with time windows and a shared depot.
///
/// Every vehicle has the same `capacity` and the same `travel_time` budget.
/// A vehicle that runs out of capacity may return to the depot mid-route to
/// reload before serving further nodes.
///
/// # Examples
/// ```
/// use reload_core::{Problem, TimeWindow};
///
/// let problem = Problem {
///     nodes: 2,
///     vehicles: 1,
///     depot: 0,
///     demands: vec![0, 3],
///     time_matrix: vec![vec![0, 5], vec![5, 0]],
///     time_windows: vec![TimeWindow::new(0, 100); 2],
///     service_time: vec![0, 1],
///     capacity: 10,
///     travel_time: 100,
///     timeout: 1,
/// };
/// assert!(problem.validate().is_ok());
/// assert_eq!(problem.total_demand(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Problem {
    /// Number of real nodes, depot included.
    pub nodes: usize,
    /// Number of homogeneous vehicles.
    pub vehicles: usize,
    /// Index of the depot node.
    pub depot: usize,
    /// Demand of every node; the depot must carry zero.
    pub demands: Vec<i64>,
    /// Square travel-time matrix indexed `[from][to]`.
    pub time_matrix: Vec<Vec<i64>>,
    /// Arrival window of every node. The depot window is ignored.
    pub time_windows: Vec<TimeWindow>,
    /// Dwell time spent at every node before departing.
    pub service_time: Vec<i64>,
    /// Load a vehicle can carry between reloads.
    pub capacity: i64,
    /// Maximum drive plus service time per vehicle.
    pub travel_time: i64,
    /// Search budget in seconds.
    pub timeout: u64,
}

impl Problem {
    /// Search budget as a [`Duration`].
    #[must_use]
    pub const fn time_limit(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Sum of all node demands, saturating at [`i64::MAX`].
    ///
    /// [`Problem::validate`] rejects problems whose demands overflow, so the
    /// sum is exact for every validated problem.
    #[must_use]
    pub fn total_demand(&self) -> i64 {
        self.demands
            .iter()
            .fold(0_i64, |total, demand| total.saturating_add(*demand))
    }

    /// Travel time between two real nodes, if both are in range.
    #[must_use]
    pub fn travel(&self, from: usize, to: usize) -> Option<i64> {
        self.time_matrix.get(from)?.get(to).copied()
    }
}
