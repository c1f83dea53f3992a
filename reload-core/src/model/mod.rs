//! Declarative routing model handed to a [`RoutingEngine`](crate::RoutingEngine).
//!
//! The model follows the classic vehicle-routing capability surface: transit
//! evaluators are registered once, cumulative dimensions accumulate them along
//! routes, optional nodes are grouped into disjunctions with an omission
//! penalty, and every vehicle may carry a fixed cost charged when it is used.
//!
//! Building a model never runs a search; engines read it back through the
//! accessor methods.

mod bounds;
mod dimension;
mod evaluator;

use std::sync::Arc;

use thiserror::Error;

pub use bounds::Bounds;
pub use dimension::{Dimension, DimensionIndex, DimensionSpec};
pub use evaluator::{BinaryTransit, EvaluatorIndex, Transit, UnaryEvaluatorIndex, UnaryTransit};

/// Errors raised while declaring a [`RoutingModel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The depot does not name a node of the model.
    #[error("depot {depot} is outside the {node_count} model nodes")]
    DepotOutOfRange {
        /// Requested depot.
        depot: usize,
        /// Nodes in the model.
        node_count: usize,
    },
    /// A node does not exist in the model.
    #[error("node {node} is outside the {node_count} model nodes")]
    NodeOutOfRange {
        /// Requested node.
        node: usize,
        /// Nodes in the model.
        node_count: usize,
    },
    /// A vehicle does not exist in the model.
    #[error("vehicle {vehicle} is outside the {vehicles} model vehicles")]
    VehicleOutOfRange {
        /// Requested vehicle.
        vehicle: usize,
        /// Vehicles in the model.
        vehicles: usize,
    },
    /// An evaluator handle was not issued by this model.
    #[error("transit evaluator {0:?} is not registered")]
    UnknownEvaluator(Transit),
    /// A dimension name is already taken.
    #[error("dimension {name:?} is already declared")]
    DuplicateDimension {
        /// Conflicting name.
        name: String,
    },
    /// No dimension carries the requested name.
    #[error("dimension {name:?} is not declared")]
    UnknownDimension {
        /// Requested name.
        name: String,
    },
    /// A dimension was declared with a negative capacity or slack bound.
    #[error("dimension {name:?} needs non-negative capacity and slack, got {capacity} and {slack_max}")]
    NegativeDimensionBound {
        /// Dimension name.
        name: String,
        /// Declared capacity.
        capacity: i64,
        /// Declared slack bound.
        slack_max: i64,
    },
    /// A fixed slack lies outside `[0, slack_max]`.
    #[error("slack {value} at node {node} is outside [0, {slack_max}]")]
    SlackOutOfRange {
        /// Node whose slack was fixed.
        node: usize,
        /// Requested value.
        value: i64,
        /// Dimension slack bound.
        slack_max: i64,
    },
    /// A cumul restriction admits no value.
    #[error("cumul restriction [{min}, {max}] at node {node} admits no value")]
    EmptyCumulRange {
        /// Restricted node.
        node: usize,
        /// Requested lower bound.
        min: i64,
        /// Requested upper bound.
        max: i64,
    },
    /// The depot cannot be made optional.
    #[error("the depot cannot belong to a disjunction")]
    DepotInDisjunction,
    /// A node already belongs to another disjunction.
    #[error("node {node} already belongs to a disjunction")]
    NodeInTwoDisjunctions {
        /// Offending node.
        node: usize,
    },
    /// A disjunction lists no nodes.
    #[error("a disjunction must contain at least one node")]
    EmptyDisjunction,
}

/// Handle to a disjunction within its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisjunctionIndex(usize);

/// Optional-visit group: at most one member is visited; omitting all of
/// them costs `penalty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disjunction {
    nodes: Vec<usize>,
    penalty: i64,
}

impl Disjunction {
    /// Member nodes.
    #[must_use]
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Cost of visiting none of the members.
    #[must_use]
    pub const fn penalty(&self) -> i64 {
        self.penalty
    }
}

/// A routing model over `node_count` nodes and a homogeneous depot.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use reload_core::{BinaryTransit, DimensionSpec, RoutingModel};
///
/// #[derive(Debug)]
/// struct Unit;
///
/// impl BinaryTransit for Unit {
///     fn transit(&self, from: usize, to: usize) -> i64 {
///         i64::from(from != to)
///     }
/// }
///
/// # fn main() -> Result<(), reload_core::ModelError> {
/// let mut model = RoutingModel::new(3, 1, 0)?;
/// let unit = model.register_transit(Arc::new(Unit));
/// model.set_arc_cost_evaluator_of_all_vehicles(unit)?;
/// model.add_dimension(DimensionSpec {
///     transit: unit.into(),
///     slack_max: 0,
///     capacity: 10,
///     fix_start_cumul_to_zero: true,
///     name: "Steps".to_owned(),
/// })?;
/// assert_eq!(model.arc_cost(0, 1), 1);
/// assert!(model.dimension("Steps").is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RoutingModel {
    node_count: usize,
    vehicles: usize,
    depot: usize,
    unary: Vec<Arc<dyn UnaryTransit>>,
    binary: Vec<Arc<dyn BinaryTransit>>,
    arc_cost: Option<EvaluatorIndex>,
    dimensions: Vec<Dimension>,
    disjunctions: Vec<Disjunction>,
    disjunction_of: Vec<Option<DisjunctionIndex>>,
    fixed_costs: Vec<i64>,
}

impl RoutingModel {
    /// Create an empty model.
    ///
    /// # Errors
    /// Returns [`ModelError::DepotOutOfRange`] when `depot >= node_count`.
    pub fn new(node_count: usize, vehicles: usize, depot: usize) -> Result<Self, ModelError> {
        if depot >= node_count {
            return Err(ModelError::DepotOutOfRange { depot, node_count });
        }
        Ok(Self {
            node_count,
            vehicles,
            depot,
            unary: Vec::new(),
            binary: Vec::new(),
            arc_cost: None,
            dimensions: Vec::new(),
            disjunctions: Vec::new(),
            disjunction_of: vec![None; node_count],
            fixed_costs: vec![0; vehicles],
        })
    }

    /// Number of nodes, depot included.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of vehicles.
    #[must_use]
    pub const fn vehicles(&self) -> usize {
        self.vehicles
    }

    /// Start and end node of every route.
    #[must_use]
    pub const fn depot(&self) -> usize {
        self.depot
    }

    /// Register a per-node evaluator.
    pub fn register_unary_transit(
        &mut self,
        evaluator: Arc<dyn UnaryTransit>,
    ) -> UnaryEvaluatorIndex {
        self.unary.push(evaluator);
        UnaryEvaluatorIndex(self.unary.len() - 1)
    }

    /// Register a per-arc evaluator.
    pub fn register_transit(&mut self, evaluator: Arc<dyn BinaryTransit>) -> EvaluatorIndex {
        self.binary.push(evaluator);
        EvaluatorIndex(self.binary.len() - 1)
    }

    /// Use `evaluator` as the arc cost of every vehicle.
    ///
    /// # Errors
    /// Returns [`ModelError::UnknownEvaluator`] for handles from another model.
    pub fn set_arc_cost_evaluator_of_all_vehicles(
        &mut self,
        evaluator: EvaluatorIndex,
    ) -> Result<(), ModelError> {
        self.check_transit(Transit::Binary(evaluator))?;
        self.arc_cost = Some(evaluator);
        Ok(())
    }

    /// Declare a cumulative dimension.
    ///
    /// # Errors
    /// Rejects unknown evaluators, duplicate names and negative bounds.
    pub fn add_dimension(&mut self, spec: DimensionSpec) -> Result<DimensionIndex, ModelError> {
        self.check_transit(spec.transit)?;
        if self.dimension(&spec.name).is_some() {
            return Err(ModelError::DuplicateDimension { name: spec.name });
        }
        if spec.capacity < 0 || spec.slack_max < 0 {
            return Err(ModelError::NegativeDimensionBound {
                name: spec.name,
                capacity: spec.capacity,
                slack_max: spec.slack_max,
            });
        }
        self.dimensions.push(Dimension::new(spec, self.node_count));
        Ok(DimensionIndex(self.dimensions.len() - 1))
    }

    /// Look up a dimension by name.
    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|dimension| dimension.name() == name)
    }

    /// Index of the dimension called `name`.
    #[must_use]
    pub fn dimension_index(&self, name: &str) -> Option<DimensionIndex> {
        self.dimensions
            .iter()
            .position(|dimension| dimension.name() == name)
            .map(DimensionIndex)
    }

    /// Mutable access to the dimension called `name`.
    ///
    /// # Errors
    /// Returns [`ModelError::UnknownDimension`] when no such dimension exists.
    pub fn dimension_mut(&mut self, name: &str) -> Result<&mut Dimension, ModelError> {
        self.dimensions
            .iter_mut()
            .find(|dimension| dimension.name() == name)
            .ok_or_else(|| ModelError::UnknownDimension {
                name: name.to_owned(),
            })
    }

    /// All dimensions in declaration order.
    #[must_use]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Declare that the route may skip every node of `nodes` at `penalty`.
    ///
    /// # Errors
    /// Rejects empty groups, unknown nodes, the depot, and nodes that already
    /// belong to a disjunction.
    pub fn add_disjunction(
        &mut self,
        nodes: Vec<usize>,
        penalty: i64,
    ) -> Result<DisjunctionIndex, ModelError> {
        if nodes.is_empty() {
            return Err(ModelError::EmptyDisjunction);
        }
        for &node in &nodes {
            if node == self.depot {
                return Err(ModelError::DepotInDisjunction);
            }
            match self.disjunction_of.get(node) {
                None => {
                    return Err(ModelError::NodeOutOfRange {
                        node,
                        node_count: self.node_count,
                    });
                }
                Some(Some(_)) => return Err(ModelError::NodeInTwoDisjunctions { node }),
                Some(None) => {}
            }
        }
        let index = DisjunctionIndex(self.disjunctions.len());
        for &node in &nodes {
            if let Some(slot) = self.disjunction_of.get_mut(node) {
                *slot = Some(index);
            }
        }
        self.disjunctions.push(Disjunction { nodes, penalty });
        Ok(index)
    }

    /// All disjunctions in declaration order.
    #[must_use]
    pub fn disjunctions(&self) -> &[Disjunction] {
        &self.disjunctions
    }

    /// The disjunction `node` belongs to, if any.
    #[must_use]
    pub fn disjunction_of(&self, node: usize) -> Option<&Disjunction> {
        let DisjunctionIndex(index) = self.disjunction_of.get(node).copied().flatten()?;
        self.disjunctions.get(index)
    }

    /// Whether a route may leave `node` unvisited.
    #[must_use]
    pub fn is_optional(&self, node: usize) -> bool {
        self.disjunction_of(node).is_some()
    }

    /// Nodes every solution must visit: everything except the depot and
    /// disjunction members.
    pub fn mandatory_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.node_count).filter(move |node| *node != self.depot && !self.is_optional(*node))
    }

    /// Charge `cost` whenever `vehicle` serves at least one node.
    ///
    /// # Errors
    /// Returns [`ModelError::VehicleOutOfRange`] for unknown vehicles.
    pub fn set_fixed_cost_of_vehicle(
        &mut self,
        cost: i64,
        vehicle: usize,
    ) -> Result<(), ModelError> {
        let vehicles = self.vehicles;
        let slot = self
            .fixed_costs
            .get_mut(vehicle)
            .ok_or(ModelError::VehicleOutOfRange { vehicle, vehicles })?;
        *slot = cost;
        Ok(())
    }

    /// Fixed cost of `vehicle`, zero for unknown vehicles.
    #[must_use]
    pub fn fixed_cost(&self, vehicle: usize) -> i64 {
        self.fixed_costs.get(vehicle).copied().unwrap_or(0)
    }

    /// Arc cost of `from` → `to`; zero when no cost evaluator is set.
    #[must_use]
    pub fn arc_cost(&self, from: usize, to: usize) -> i64 {
        self.arc_cost
            .map_or(0, |evaluator| self.binary_transit(evaluator, from, to))
    }

    /// Transit of `dimension` on the arc `from` → `to`.
    #[must_use]
    pub fn transit(&self, dimension: &Dimension, from: usize, to: usize) -> i64 {
        match dimension.transit() {
            Transit::Unary(UnaryEvaluatorIndex(index)) => self
                .unary
                .get(index)
                .map_or(0, |evaluator| evaluator.transit(from)),
            Transit::Binary(evaluator) => self.binary_transit(evaluator, from, to),
        }
    }

    fn binary_transit(&self, EvaluatorIndex(index): EvaluatorIndex, from: usize, to: usize) -> i64 {
        self.binary
            .get(index)
            .map_or(0, |evaluator| evaluator.transit(from, to))
    }

    fn check_transit(&self, transit: Transit) -> Result<(), ModelError> {
        let registered = match transit {
            Transit::Unary(UnaryEvaluatorIndex(index)) => index < self.unary.len(),
            Transit::Binary(EvaluatorIndex(index)) => index < self.binary.len(),
        };
        if registered {
            Ok(())
        } else {
            Err(ModelError::UnknownEvaluator(transit))
        }
    }
}
