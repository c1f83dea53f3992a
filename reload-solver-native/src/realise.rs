//! Placement of optional stops in an ordered list of mandatory stops.
//!
//! The search only orders mandatory nodes. A route is realised by walking
//! that order with every dimension propagated at once; when the next stop is
//! unreachable, an unused optional node is spliced in just before it or just
//! before its predecessor. Optional nodes that look identical to the rest of
//! the model form one class, so a splice tries a single node per class and
//! the cost of realising a route stays linear in its length.

use std::collections::HashMap;
use std::iter;
use std::sync::Arc;

use reload_core::{Disjunction, RoutingModel};

use crate::schedule::Reach;

/// Optional nodes already placed on some route.
#[derive(Debug, Clone)]
pub(crate) struct Pool {
    used: Vec<bool>,
}

impl Pool {
    fn is_free(&self, node: usize) -> bool {
        self.used.get(node).is_some_and(|used| !used)
    }

    /// Claim `node` and every other member of its disjunction.
    fn take(&mut self, model: &RoutingModel, node: usize) {
        let members = model
            .disjunction_of(node)
            .map(Disjunction::nodes)
            .unwrap_or_default();
        for member in members.iter().copied().chain(iter::once(node)) {
            if let Some(slot) = self.used.get_mut(member) {
                *slot = true;
            }
        }
    }

    /// Summed penalty of the disjunctions without a placed member.
    pub(crate) fn omission_penalty(&self, model: &RoutingModel) -> i64 {
        model
            .disjunctions()
            .iter()
            .filter(|disjunction| disjunction.nodes().iter().all(|node| self.is_free(*node)))
            .fold(0_i64, |total, disjunction| {
                total.saturating_add(disjunction.penalty())
            })
    }
}

/// Realises mandatory orders into full routes.
#[derive(Debug)]
pub(crate) struct Realiser {
    model: Arc<RoutingModel>,
    classes: Vec<Vec<usize>>,
}

impl Realiser {
    pub(crate) fn new(model: Arc<RoutingModel>) -> Self {
        let anchors: Vec<usize> = iter::once(model.depot())
            .chain(model.mandatory_nodes())
            .collect();
        let mut index: HashMap<Vec<i64>, usize> = HashMap::new();
        let mut classes: Vec<Vec<usize>> = Vec::new();
        for node in (0..model.node_count()).filter(|node| model.is_optional(*node)) {
            let key = signature(&model, &anchors, node);
            if let Some(members) = index.get(&key).and_then(|class| classes.get_mut(*class)) {
                members.push(node);
            } else {
                index.insert(key, classes.len());
                classes.push(vec![node]);
            }
        }
        log::debug!(
            "grouped optional nodes into {} interchangeable class(es)",
            classes.len()
        );
        Self { model, classes }
    }

    pub(crate) fn model(&self) -> &RoutingModel {
        &self.model
    }

    pub(crate) fn shared_model(&self) -> Arc<RoutingModel> {
        Arc::clone(&self.model)
    }

    /// A pool in which every optional node is still free.
    pub(crate) fn pool(&self) -> Pool {
        Pool {
            used: vec![false; self.model.node_count()],
        }
    }

    /// Route visiting `order` with optional nodes spliced in where needed,
    /// or `None` when no placement of free optional nodes makes it feasible.
    ///
    /// Optional nodes used by the returned route are claimed from `pool`.
    pub(crate) fn realise(&self, order: &[usize], pool: &mut Pool) -> Option<Vec<usize>> {
        let model = self.model();
        let depot = model.depot();
        let mut tokens = vec![depot];
        let mut reaches = vec![Reach::start(model)?];

        for next in order.iter().copied().chain(iter::once(depot)) {
            let (last, reach) = tokens.last().zip(reaches.last())?;
            if let Some(advanced) = reach.advance(model, *last, next) {
                tokens.push(next);
                reaches.push(advanced);
                continue;
            }
            let splice = [tokens.len(), tokens.len().saturating_sub(1)]
                .into_iter()
                .filter(|at| *at > 0)
                .find_map(|at| self.splice(&tokens, &reaches, at, next, pool))?;
            pool.take(model, splice.optional);
            tokens.truncate(splice.at);
            reaches.truncate(splice.at);
            tokens.extend(splice.path);
            reaches.extend(splice.reaches);
        }

        tokens.pop();
        Some(tokens.into_iter().skip(1).collect())
    }

    /// Cheapest free optional node that makes `tokens[at..]` followed by
    /// `next` reachable when placed before `tokens[at]`.
    fn splice(
        &self,
        tokens: &[usize],
        reaches: &[Reach],
        at: usize,
        next: usize,
        pool: &Pool,
    ) -> Option<Splice> {
        let model = self.model();
        let before = at.checked_sub(1)?;
        let from = *tokens.get(before)?;
        let base = reaches.get(before)?;
        let tail: Vec<usize> = tokens
            .get(at..)?
            .iter()
            .copied()
            .chain(iter::once(next))
            .collect();
        let first = *tail.first()?;

        self.classes
            .iter()
            .filter_map(|class| class.iter().copied().find(|node| pool.is_free(*node)))
            .filter_map(|optional| {
                let path: Vec<usize> = iter::once(optional).chain(tail.iter().copied()).collect();
                let reaches = replay(model, base, from, &path)?;
                let detour = model
                    .arc_cost(from, optional)
                    .saturating_add(model.arc_cost(optional, first));
                Some(Splice {
                    at,
                    optional,
                    path,
                    reaches,
                    detour,
                })
            })
            .min_by_key(|splice| splice.detour)
    }
}

#[derive(Debug)]
struct Splice {
    at: usize,
    optional: usize,
    path: Vec<usize>,
    reaches: Vec<Reach>,
    detour: i64,
}

fn replay(model: &RoutingModel, start: &Reach, from: usize, path: &[usize]) -> Option<Vec<Reach>> {
    let mut reaches: Vec<Reach> = Vec::with_capacity(path.len());
    let mut previous = from;
    for node in path.iter().copied() {
        let reach = reaches.last().unwrap_or(start).advance(model, previous, node)?;
        reaches.push(reach);
        previous = node;
    }
    Some(reaches)
}

/// Everything a route can observe about an optional node.
fn signature(model: &RoutingModel, anchors: &[usize], node: usize) -> Vec<i64> {
    let mut key = vec![model.disjunction_of(node).map_or(0, Disjunction::penalty)];
    for anchor in anchors.iter().copied() {
        key.push(model.arc_cost(anchor, node));
        key.push(model.arc_cost(node, anchor));
    }
    for dimension in model.dimensions() {
        let slack = dimension.slack_bounds(node);
        let cumul = dimension.cumul_bounds(node);
        key.extend([slack.min, slack.max, cumul.min, cumul.max]);
        for anchor in anchors.iter().copied() {
            key.push(model.transit(dimension, anchor, node));
            key.push(model.transit(dimension, node, anchor));
        }
    }
    key
}

/// Arc cost of driving `route` from and back to the depot.
pub(crate) fn travel_cost(model: &RoutingModel, route: &[usize]) -> i64 {
    let depot = model.depot();
    let tokens: Vec<usize> = iter::once(depot)
        .chain(route.iter().copied())
        .chain(iter::once(depot))
        .collect();
    tokens
        .windows(2)
        .filter_map(|arc| match arc {
            [from, to] => Some(model.arc_cost(*from, *to)),
            _ => None,
        })
        .fold(0_i64, i64::saturating_add)
}

/// Travel cost of `route` plus the fixed cost of `vehicle` when it serves
/// anything.
pub(crate) fn route_cost(model: &RoutingModel, vehicle: usize, route: &[usize]) -> i64 {
    if route.is_empty() {
        return 0;
    }
    travel_cost(model, route).saturating_add(model.fixed_cost(vehicle))
}
