//! Insertion enumeration (§4.4) and the quick reachability filter (§4.5).

use crate::model::{Order, Route, Vehicle, Waypoint};
use crate::router::{RouteMode, Router};

use super::validate::{validate_schedule, ValidationOutcome, ViolationClass};

/// Result of trying to serve a trip (one or more orders) with one vehicle.
#[derive(Debug, Clone)]
pub struct SchedulingResult {
    pub success: bool,
    pub vehicle_id: usize,
    pub trip_ids: Vec<usize>,
    pub feasible_schedules: Vec<Vec<Waypoint>>,
    pub best_schedule_idx: Option<usize>,
    pub best_schedule_cost_ms: u64,
    /// Meaning depends on the assignment strategy (§4.9): increased-delay
    /// for GI, count-biased for SBA/OSP.
    pub score: f64,
}

impl SchedulingResult {
    fn empty(vehicle_id: usize) -> Self {
        Self {
            success: false,
            vehicle_id,
            trip_ids: Vec::new(),
            feasible_schedules: Vec::new(),
            best_schedule_idx: None,
            best_schedule_cost_ms: u64::MAX,
            score: f64::NEG_INFINITY,
        }
    }

    pub fn best_schedule(&self) -> Option<&Vec<Waypoint>> {
        self.best_schedule_idx.map(|i| &self.feasible_schedules[i])
    }
}

/// §4.5: short-circuit a probe when the order cannot possibly be picked up
/// even by an otherwise-empty schedule.
pub fn passes_quick_filter(order: &Order, vehicle: &Vehicle, system_time_ms: u64, router: &dyn Router) -> bool {
    let Some(route) = router.route(vehicle.pos, order.origin, RouteMode::TimeOnly) else {
        return false;
    };
    let step_to_pos_ms = vehicle.step_to_pos.map(|s| s.duration_ms).unwrap_or(0);
    route.duration_ms() + step_to_pos_ms + system_time_ms <= order.max_pickup_time_ms
}

/// §4.4: enumerate all feasible schedules obtained by inserting `order`'s
/// pickup/dropoff into some basic schedule in `basic_schedules`, and return
/// the minimum-cost one.
pub fn compute_schedule_of_inserting_order(
    order: &Order,
    orders: &[Order],
    vehicle: &Vehicle,
    basic_schedules: &[Vec<Waypoint>],
    system_time_ms: u64,
    router: &dyn Router,
) -> SchedulingResult {
    use super::cost::schedule_cost_ms;

    let mut result = SchedulingResult::empty(vehicle.id);

    for basic_schedule in basic_schedules {
        let num_wps = basic_schedule.len();

        'pickup: for pickup_idx in 0..=num_wps {
            for dropoff_idx in pickup_idx..=num_wps {
                let Some(candidate) = generate_schedule_from_subschedule(
                    order,
                    vehicle,
                    basic_schedule,
                    pickup_idx,
                    dropoff_idx,
                    router,
                ) else {
                    // Router miss: treat as infeasible for this pair, keep scanning.
                    continue;
                };

                let outcome = validate_schedule(
                    &candidate,
                    pickup_idx,
                    dropoff_idx,
                    order.id,
                    orders,
                    vehicle,
                    system_time_ms,
                );

                match outcome {
                    ValidationOutcome::Ok => {
                        let cost_ms = schedule_cost_ms(&candidate, orders, vehicle, system_time_ms);
                        if cost_ms < result.best_schedule_cost_ms {
                            result.best_schedule_idx = Some(result.feasible_schedules.len());
                            result.best_schedule_cost_ms = cost_ms;
                        }
                        result.success = true;
                        result.feasible_schedules.push(candidate);
                    }
                    ValidationOutcome::Violation(ViolationClass::TerminalForOrder) => break 'pickup,
                    ValidationOutcome::Violation(ViolationClass::TryLargerDropoff) => break,
                    ValidationOutcome::Violation(ViolationClass::TryNextPair) => continue,
                }
            }
        }
    }

    result
}

/// Rebuild a schedule in time-only mode: walk `sub_schedule` from the
/// vehicle's current position, splicing in `order`'s pickup at `pickup_idx`
/// and dropoff at `dropoff_idx`. Returns `None` on any router miss.
fn generate_schedule_from_subschedule(
    order: &Order,
    vehicle: &Vehicle,
    sub_schedule: &[Waypoint],
    pickup_idx: usize,
    dropoff_idx: usize,
    router: &dyn Router,
) -> Option<Vec<Waypoint>> {
    let mut new_schedule = Vec::with_capacity(sub_schedule.len() + 2);
    let mut pos = vehicle.pos;

    for idx in 0..=sub_schedule.len() {
        if idx == pickup_idx {
            let route = router.route(pos, order.origin, RouteMode::TimeOnly)?;
            pos = order.origin;
            new_schedule.push(Waypoint::pickup(pos, order.id, route));
        }
        if idx == dropoff_idx {
            let route = router.route(pos, order.destination, RouteMode::TimeOnly)?;
            pos = order.destination;
            new_schedule.push(Waypoint::dropoff(pos, order.id, route));
        }
        if idx == sub_schedule.len() {
            break;
        }

        let wp = &sub_schedule[idx];
        let route: Route = router.route(pos, wp.pos, RouteMode::TimeOnly)?;
        pos = wp.pos;
        let mut rebuilt = Waypoint {
            pos,
            op: wp.op,
            order_id: wp.order_id,
            route,
            direct_time_from_vehicle_ms: wp.direct_time_from_vehicle_ms,
        };
        if wp.op == crate::model::WaypointOp::Reposition {
            rebuilt.direct_time_from_vehicle_ms =
                router.route(vehicle.pos, wp.pos, RouteMode::TimeOnly).map(|r| r.duration_ms());
        }
        new_schedule.push(rebuilt);
    }

    debug_assert!(!new_schedule.is_empty());
    Some(new_schedule)
}
