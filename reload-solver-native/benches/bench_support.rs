//! Benchmark support utilities for the native engine.
//!
//! Provides deterministic problem generation with customers scattered over a
//! square grid, so every benchmark run solves the same instances.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reload_core::test_support::ProblemBuilder;
use reload_core::{Problem, TimeWindow};

/// Seed for deterministic random number generation in benchmarks.
pub const BENCHMARK_SEED: u64 = 42;

/// Side of the square customers are scattered over.
const GRID_SIZE: i64 = 100;

/// Grid coordinate of the depot on both axes.
const DEPOT_POSITION: i64 = 50;

/// Vehicle capacity shared by every generated problem.
const CAPACITY: i64 = 30;

/// Latest arrival allowed anywhere.
const HORIZON: i64 = 2_000;

/// Latest time a customer window may open.
const LATEST_OPENING: i64 = 50;

/// Customers served per vehicle on average.
const CUSTOMERS_PER_VEHICLE: usize = 8;

/// Generate a problem with `customers` customers around a central depot.
///
/// Travel times are Manhattan distances between grid points. Demands range
/// over `1..=10`, so larger problems need several reload stops per vehicle.
#[must_use]
pub fn generate_problem(customers: usize, seed: u64) -> Problem {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let depot = (DEPOT_POSITION, DEPOT_POSITION);
    let points: Vec<(i64, i64)> = std::iter::once(depot)
        .chain((0..customers).map(|_| {
            (
                rng.gen_range(0..=GRID_SIZE),
                rng.gen_range(0..=GRID_SIZE),
            )
        }))
        .collect();
    let matrix = points
        .iter()
        .map(|(from_x, from_y)| {
            points
                .iter()
                .map(|(to_x, to_y)| (from_x - to_x).abs() + (from_y - to_y).abs())
                .collect()
        })
        .collect();
    let demands = std::iter::once(0)
        .chain((0..customers).map(|_| rng.gen_range(1..=10)))
        .collect();
    let windows = std::iter::once(TimeWindow::new(0, HORIZON))
        .chain((0..customers).map(|_| {
            let earliest = rng.gen_range(0..LATEST_OPENING);
            TimeWindow::new(earliest, HORIZON)
        }))
        .collect();
    let service = std::iter::once(0)
        .chain((0..customers).map(|_| rng.gen_range(0..5)))
        .collect();
    #[expect(
        clippy::integer_division,
        reason = "fleet size rounds down to whole vehicles"
    )]
    let vehicles = (customers / CUSTOMERS_PER_VEHICLE).max(1);

    ProblemBuilder::from_matrix(matrix)
        .vehicles(vehicles)
        .demands(demands)
        .windows(windows)
        .service_times(service)
        .capacity(CAPACITY)
        .travel_time(HORIZON)
        .build()
}
