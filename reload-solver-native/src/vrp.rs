//! `vrp-core` modelling helpers for `NativeEngine`.
//!
//! This module turns a routing model into a `vrp-core` problem, runs the
//! solver, and reads the visiting order of every vehicle back out. Only
//! mandatory nodes become jobs; optional nodes are placed by [`Realiser`]
//! whenever a route is costed or checked, so the search always sees the
//! reloads a route needs.

use std::fmt;
use std::sync::Arc;

use reload_core::{EngineError, RoutingModel};
use vrp_core::construction::heuristics::ActivityContext;
use vrp_core::models::common::{Location, Profile};
use vrp_core::models::problem::TravelTime;
use vrp_core::models::solution::{Activity, Route as VrpRoute};
use vrp_core::prelude::*;

use crate::realise::{Realiser, route_cost, travel_cost};

custom_dimension!(JobNode typeof usize);
custom_dimension!(VehicleIndex typeof usize);

#[expect(
    clippy::cast_precision_loss,
    reason = "vrp-core costs are floating point; model costs stay far below 2^53"
)]
const fn to_cost(value: i64) -> Cost {
    value as Cost
}

fn job_node(activity: &Activity) -> Option<usize> {
    activity
        .job
        .as_ref()
        .and_then(|single| single.dimens.get_job_node().copied())
}

fn vehicle_of(route: &VrpRoute) -> Option<usize> {
    route.actor.vehicle.dimens.get_vehicle_index().copied()
}

/// Mandatory nodes of `route` in visiting order.
fn route_order(route: &VrpRoute) -> Vec<usize> {
    route.tour.all_activities().filter_map(job_node).collect()
}

/// Visiting order of `route` after inserting the activity of `activity_ctx`.
fn candidate_order(route: &VrpRoute, activity_ctx: &ActivityContext<'_>) -> Vec<usize> {
    let target = job_node(activity_ctx.target);
    let mut order = Vec::with_capacity(route.tour.job_count().saturating_add(1));
    let mut placed = false;
    for (position, activity) in route.tour.all_activities().enumerate() {
        order.extend(job_node(activity));
        if !placed && (std::ptr::eq(activity, activity_ctx.prev) || position == activity_ctx.index)
        {
            order.extend(target);
            placed = true;
        }
    }
    order
}

/// Cost of the realised route, without the vehicle's fixed cost.
fn realised_travel(realiser: &Realiser, order: &[usize]) -> Option<i64> {
    let mut pool = realiser.pool();
    realiser
        .realise(order, &mut pool)
        .map(|route| travel_cost(realiser.model(), &route))
}

/// Rejects insertions whose route admits no schedule in any dimension.
struct RouteScheduleConstraint {
    realiser: Arc<Realiser>,
    code: ViolationCode,
}

impl FeatureConstraint for RouteScheduleConstraint {
    fn evaluate(&self, move_ctx: &MoveContext<'_>) -> Option<ConstraintViolation> {
        match move_ctx {
            MoveContext::Route { .. } => None,
            MoveContext::Activity {
                route_ctx,
                activity_ctx,
                ..
            } => {
                let order = candidate_order(route_ctx.route(), activity_ctx);
                let mut pool = self.realiser.pool();
                if self.realiser.realise(&order, &mut pool).is_some() {
                    None
                } else {
                    ConstraintViolation::fail(self.code)
                }
            }
        }
    }

    fn merge(&self, source: Job, _candidate: Job) -> Result<Job, ViolationCode> {
        Ok(source)
    }
}

/// Arc costs of the realised routes, fixed vehicle costs and omission
/// penalties.
struct RouteCostObjective {
    realiser: Arc<Realiser>,
}

impl RouteCostObjective {
    fn solution_cost(&self, solution: &InsertionContext) -> i64 {
        let model = self.realiser.model();
        let mut pool = self.realiser.pool();
        let routes = solution
            .solution
            .routes
            .iter()
            .map(|route_ctx| route_ctx.route())
            .fold(0_i64, |total, route| {
                let vehicle = vehicle_of(route).unwrap_or_default();
                let cost = self
                    .realiser
                    .realise(&route_order(route), &mut pool)
                    .map_or(i64::MAX, |realised| route_cost(model, vehicle, &realised));
                total.saturating_add(cost)
            });
        routes.saturating_add(pool.omission_penalty(model))
    }
}

impl FeatureObjective for RouteCostObjective {
    fn fitness(&self, solution: &InsertionContext) -> Cost {
        to_cost(self.solution_cost(solution))
    }

    fn estimate(&self, move_ctx: &MoveContext<'_>) -> Cost {
        match move_ctx {
            MoveContext::Route { route_ctx, .. } => {
                let route = route_ctx.route();
                if route.tour.job_count() == 0 {
                    let vehicle = vehicle_of(route).unwrap_or_default();
                    to_cost(self.realiser.model().fixed_cost(vehicle))
                } else {
                    0.0
                }
            }
            MoveContext::Activity {
                route_ctx,
                activity_ctx,
                ..
            } => {
                let route = route_ctx.route();
                let before = realised_travel(&self.realiser, &route_order(route));
                let after = realised_travel(&self.realiser, &candidate_order(route, activity_ctx));
                before
                    .zip(after)
                    .map_or(0.0, |(before, after)| to_cost(after.saturating_sub(before)))
            }
        }
    }
}

fn define_goal(realiser: &Arc<Realiser>) -> GenericResult<GoalContext> {
    let minimize_unassigned = MinimizeUnassignedBuilder::new("min-unassigned").build()?;

    let route_cost_feature = FeatureBuilder::default()
        .with_name("min-route-cost")
        .with_objective(RouteCostObjective {
            realiser: Arc::clone(realiser),
        })
        .with_constraint(RouteScheduleConstraint {
            realiser: Arc::clone(realiser),
            code: ViolationCode::default(),
        })
        .build()?;

    GoalContextBuilder::with_features(&[minimize_unassigned, route_cost_feature])?.build()
}

fn define_problem(
    model: &RoutingModel,
    goal: GoalContext,
    transport: Arc<dyn TransportCost>,
) -> GenericResult<Problem> {
    let jobs = model
        .mandatory_nodes()
        .map(|node| {
            SingleBuilder::default()
                .id(format!("node{node}").as_str())
                .dimension(|dimens| {
                    dimens.set_job_node(node);
                })
                .location(node)?
                .build_as_job()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let depot = model.depot();
    let vehicles = (0..model.vehicles())
        .map(|vehicle| {
            VehicleBuilder::default()
                .id(format!("vehicle{vehicle}").as_str())
                .add_detail(
                    VehicleDetailBuilder::default()
                        .set_start_location(depot)
                        .set_end_location(depot)
                        .build()?,
                )
                .dimension(|dimens| {
                    dimens.set_vehicle_index(vehicle);
                })
                .build()
        })
        .collect::<Result<Vec<_>, _>>()?;

    ProblemBuilder::default()
        .add_jobs(jobs.into_iter())
        .add_vehicles(vehicles.into_iter())
        .with_goal(goal)
        .with_transport_cost(transport)
        .build()
}

/// Arc costs of the routing model, as seen by `vrp-core` neighbourhoods.
struct ModelTransportCost {
    model: Arc<RoutingModel>,
}

impl ModelTransportCost {
    fn arc(&self, from: Location, to: Location) -> f64 {
        to_cost(self.model.arc_cost(from, to))
    }
}

impl TransportCost for ModelTransportCost {
    fn distance(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        _departure: TravelTime,
    ) -> Cost {
        self.arc(from, to)
    }

    fn duration(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        _departure: TravelTime,
    ) -> f64 {
        self.arc(from, to)
    }

    fn distance_approx(&self, profile: &Profile, from: usize, to: usize) -> f64 {
        self.duration_approx(profile, from, to)
    }

    fn duration_approx(&self, _profile: &Profile, from: usize, to: usize) -> f64 {
        self.arc(from, to)
    }
}

/// Termination settings for one `vrp-core` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchBudget {
    pub(crate) max_generations: usize,
    pub(crate) max_seconds: usize,
}

fn rejected(error: &dyn fmt::Display) -> EngineError {
    EngineError::Rejected {
        reason: error.to_string(),
    }
}

/// Visiting order of mandatory nodes per vehicle, or `None` when
/// `vrp-core` leaves some mandatory node unassigned.
///
/// # Errors
/// Returns [`EngineError::Rejected`] when `vrp-core` refuses the problem or
/// its configuration, and [`EngineError::Contract`] when a route comes back
/// without a known vehicle.
pub(crate) fn search(
    realiser: &Arc<Realiser>,
    budget: SearchBudget,
) -> Result<Option<Vec<Vec<usize>>>, EngineError> {
    let model = realiser.model();
    let transport = Arc::new(ModelTransportCost {
        model: realiser.shared_model(),
    });
    let goal = define_goal(realiser).map_err(|error| rejected(&error))?;
    let problem =
        Arc::new(define_problem(model, goal, transport).map_err(|error| rejected(&error))?);

    let config = VrpConfigBuilder::new(problem.clone())
        .prebuild()
        .map_err(|error| rejected(&error))?
        .with_max_time(Some(budget.max_seconds))
        .with_max_generations(Some(budget.max_generations))
        .build()
        .map_err(|error| rejected(&error))?;

    let solution = vrp_core::solver::Solver::new(problem, config)
        .solve()
        .map_err(|error| rejected(&error))?;

    if !solution.unassigned.is_empty() {
        log::warn!(
            "{} mandatory node(s) fit no route; no feasible assignment",
            solution.unassigned.len()
        );
        return Ok(None);
    }

    let mut orders = vec![Vec::new(); model.vehicles()];
    for route in &solution.routes {
        let slot = vehicle_of(route)
            .and_then(|vehicle| orders.get_mut(vehicle))
            .ok_or_else(|| EngineError::Contract {
                reason: format!("route of vehicle {:?} is not in the fleet", vehicle_of(route)),
            })?;
        *slot = route_order(route);
    }
    Ok(Some(orders))
}
