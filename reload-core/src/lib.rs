//! Core types for capacitated routing with time windows and mid-route
//! reloads.
//!
//! A request flows through four stages:
//!
//! 1. [`Problem::validate`] rejects structurally broken input.
//! 2. [`NodeLayout::augment`] appends optional reload nodes that stand for a
//!    return to the depot.
//! 3. [`encode`] declares a [`RoutingModel`] with capacity, travel-budget and
//!    time-window dimensions.
//! 4. A [`RoutingEngine`] searches the model and [`decode`] turns its
//!    [`Assignment`] into a [`RoutePlan`].
//!
//! [`solve`] runs the whole pipeline.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod decode;
mod encode;
mod engine;
mod layout;
mod model;
mod problem;
mod solve;
mod validate;

#[doc(hidden)]
pub mod test_support;

pub use decode::{RoutePlan, decode};
pub use encode::{
    CAPACITY_DIMENSION, DemandTransit, Encoding, INFINITE_COST, TIME_WINDOW_DIMENSION,
    TRAVEL_TIME_DIMENSION, TravelTransit, encode,
};
pub use engine::{
    Assignment, EngineError, FirstSolutionStrategy, LocalSearchMetaheuristic, ParseStrategyError,
    RoutingEngine, SearchParameters, Stop, StopCursor, VehicleRoute,
};
pub use layout::{NodeKind, NodeLayout};
pub use model::{
    BinaryTransit, Bounds, Dimension, DimensionIndex, DimensionSpec, Disjunction, DisjunctionIndex,
    EvaluatorIndex, ModelError, RoutingModel, Transit, UnaryEvaluatorIndex, UnaryTransit,
};
pub use problem::{Problem, TimeWindow};
pub use solve::{SolveError, solve, solve_with};
pub use validate::ProblemError;
