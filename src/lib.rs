//! Facade crate for reload-aware vehicle routing.
//!
//! This crate re-exports the core pipeline types and exposes the native
//! search engine behind the `solver-native` feature.

#![forbid(unsafe_code)]

pub use reload_core::{
    Assignment, EngineError, FirstSolutionStrategy, LocalSearchMetaheuristic, NodeKind,
    NodeLayout, Problem, ProblemError, RoutePlan, RoutingEngine, RoutingModel, SearchParameters,
    SolveError, TimeWindow, solve, solve_with,
};

#[cfg(feature = "solver-native")]
pub use reload_solver_native::{NativeEngine, NativeEngineConfig};
