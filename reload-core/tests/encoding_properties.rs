#![expect(
    clippy::expect_used,
    reason = "property tests use expect for readable failures"
)]

//! Property-based tests for augmentation and encoding.
//!
//! # Invariants tested
//!
//! - **Idempotent re-encoding:** two encodings of one problem agree on every
//!   arc cost, transit and demand.
//! - **Reload sizing:** the reload count covers total demand.
//! - **Sentinel arcs:** reload nodes never border each other or the depot.

use proptest::prelude::*;
use reload_core::test_support::ProblemBuilder;
use reload_core::{
    CAPACITY_DIMENSION, INFINITE_COST, NodeKind, NodeLayout, Problem, TRAVEL_TIME_DIMENSION,
    encode,
};

fn problem_strategy() -> impl Strategy<Value = Problem> {
    (2_usize..7, 1_i64..20)
        .prop_flat_map(|(nodes, capacity)| {
            (
                prop::collection::vec(0_i64..=capacity, nodes),
                prop::collection::vec(prop::collection::vec(0_i64..50, nodes), nodes),
                prop::collection::vec(0_i64..5, nodes),
                Just(capacity),
            )
        })
        .prop_map(|(mut demands, matrix, service, capacity)| {
            if let Some(depot) = demands.first_mut() {
                *depot = 0;
            }
            ProblemBuilder::from_matrix(matrix)
                .demands(demands)
                .service_times(service)
                .capacity(capacity)
                .build()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn encoding_is_deterministic(problem in problem_strategy()) {
        let layout = NodeLayout::augment(&problem);
        let first = encode(&problem, layout).expect("valid problem encodes");
        let second = encode(&problem, layout).expect("valid problem encodes");
        let capacity_a = first.model.dimension(CAPACITY_DIMENSION).expect("declared");
        let capacity_b = second.model.dimension(CAPACITY_DIMENSION).expect("declared");
        let total = layout.total_nodes();
        for from in 0..total {
            for to in 0..total {
                prop_assert_eq!(first.model.arc_cost(from, to), second.model.arc_cost(from, to));
                prop_assert_eq!(
                    first.model.transit(capacity_a, from, to),
                    second.model.transit(capacity_b, from, to)
                );
            }
        }
    }

    #[test]
    fn reloads_cover_total_demand(problem in problem_strategy()) {
        let layout = NodeLayout::augment(&problem);
        let reloads = i64::try_from(layout.reload_count()).expect("small reload count");
        prop_assert!(reloads * problem.capacity >= problem.total_demand());
        prop_assert!(reloads == 0 || (reloads - 1) * problem.capacity < problem.total_demand());
    }

    #[test]
    fn reloads_never_border_reloads_or_depot(problem in problem_strategy()) {
        let layout = NodeLayout::augment(&problem);
        let encoding = encode(&problem, layout).expect("valid problem encodes");
        let travel = encoding.model.dimension(TRAVEL_TIME_DIMENSION).expect("declared");
        let total = layout.total_nodes();
        for from in 0..total {
            for to in 0..total {
                let forbidden = matches!(
                    (layout.kind(from), layout.kind(to)),
                    (NodeKind::Reload, NodeKind::Reload | NodeKind::Depot)
                        | (NodeKind::Depot, NodeKind::Reload)
                );
                let cost = encoding.model.arc_cost(from, to);
                if forbidden {
                    prop_assert_eq!(cost, INFINITE_COST);
                    prop_assert_eq!(encoding.model.transit(travel, from, to), INFINITE_COST);
                } else {
                    prop_assert!(cost < INFINITE_COST);
                }
            }
        }
    }
}
