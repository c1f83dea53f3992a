//! Transit evaluators registered with a [`RoutingModel`](super::RoutingModel).
//!
//! Evaluators are plain values: everything they consult is owned by the
//! implementing type, so registering the same evaluator twice yields the
//! same numbers.

use std::fmt::Debug;

/// Per-node transit, charged when a route departs `node`.
pub trait UnaryTransit: Debug + Send + Sync {
    /// Transit contributed by departing `node`.
    fn transit(&self, node: usize) -> i64;
}

/// Per-arc transit, charged when a route travels `from` → `to`.
pub trait BinaryTransit: Debug + Send + Sync {
    /// Transit of the arc `from` → `to`.
    fn transit(&self, from: usize, to: usize) -> i64;
}

/// Handle to a registered [`UnaryTransit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnaryEvaluatorIndex(pub(crate) usize);

/// Handle to a registered [`BinaryTransit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvaluatorIndex(pub(crate) usize);

/// The evaluator a dimension accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transit {
    /// Accumulate a per-node transit.
    Unary(UnaryEvaluatorIndex),
    /// Accumulate a per-arc transit.
    Binary(EvaluatorIndex),
}

impl From<UnaryEvaluatorIndex> for Transit {
    fn from(index: UnaryEvaluatorIndex) -> Self {
        Self::Unary(index)
    }
}

impl From<EvaluatorIndex> for Transit {
    fn from(index: EvaluatorIndex) -> Self {
        Self::Binary(index)
    }
}
