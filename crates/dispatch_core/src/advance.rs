//! Vehicle state advancer (§4.11) and route truncation (§4.12).

use crate::model::{Order, OrderStatus, Route, Step, Vehicle, VehicleStatus, Waypoint, WaypointOp};

/// Events fired while advancing one vehicle by one epoch's Δ.
#[derive(Debug, Clone, Default)]
pub struct AdvanceReport {
    pub picked_ids: Vec<usize>,
    pub dropped_ids: Vec<usize>,
}

/// Advance `vehicle` by `delta_ms`, firing pickup/dropoff events into
/// `orders` as they occur. `debug` gates the `eprintln!` trace of each
/// waypoint consumed (§9: explicit parameter, not a global flag).
pub fn advance_vehicle(
    vehicle: &mut Vehicle,
    orders: &mut [Order],
    system_time_ms: u64,
    delta_ms: u64,
    debug: bool,
) -> AdvanceReport {
    let mut report = AdvanceReport::default();
    if delta_ms == 0 {
        return report;
    }

    if vehicle.status == VehicleStatus::Idle {
        if let Some(step) = vehicle.step_to_pos {
            if step.duration_ms > 0 {
                consume_idle_step(vehicle, step, delta_ms, debug);
                return report;
            }
        }
    }

    vehicle.step_to_pos = None;
    let mut remaining_ms = delta_ms;
    let mut now_ms = system_time_ms;

    loop {
        if vehicle.schedule.is_empty() {
            break;
        }

        let duration_ms = vehicle.schedule[0].route.duration_ms();
        if duration_ms <= remaining_ms {
            let status = vehicle.status;
            let load = vehicle.load;
            let wp = vehicle.schedule.remove(0);
            let distance_mm = wp.route.distance_mm();
            accumulate(vehicle, distance_mm, duration_ms, status, load);
            now_ms += duration_ms;
            remaining_ms -= duration_ms;
            vehicle.pos = wp.pos;
            if debug {
                eprintln!(
                    "advance: vehicle {} reached waypoint {:?}@{} at t={now_ms}",
                    vehicle.id, wp.op, wp.pos.node_id
                );
            }
            fire_event(vehicle, orders, &wp, now_ms, &mut report);
            if remaining_ms == 0 {
                break;
            }
            continue;
        }

        let status = vehicle.status;
        let load = vehicle.load;
        let route = vehicle.schedule[0].route.clone();
        let truncated = truncate_route(&route, remaining_ms);
        let consumed_distance_mm = route.distance_mm().saturating_sub(truncated.distance_mm());
        accumulate(vehicle, consumed_distance_mm, remaining_ms, status, load);
        vehicle.pos = truncated.start_pos();
        let self_loop_remainder = truncated.steps()[0].is_self_loop();
        vehicle.schedule[0].route = truncated;
        vehicle.step_to_pos = if self_loop_remainder {
            Some(vehicle.schedule[0].route.steps()[0])
        } else {
            None
        };
        return report;
    }

    if vehicle.schedule.is_empty() {
        vehicle.status = VehicleStatus::Idle;
    }
    report
}

fn consume_idle_step(vehicle: &mut Vehicle, step: Step, delta_ms: u64, debug: bool) {
    if step.duration_ms <= delta_ms {
        vehicle.pos = step.end;
        vehicle.step_to_pos = None;
        accumulate_empty(vehicle, step.distance_mm, step.duration_ms);
        if debug {
            eprintln!("advance: idle vehicle {} reached node {}", vehicle.id, step.end.node_id);
        }
    } else {
        let truncated = truncate_step(step, delta_ms);
        let consumed_distance_mm = step.distance_mm.saturating_sub(truncated.distance_mm);
        vehicle.pos = truncated.start;
        vehicle.step_to_pos = Some(truncated);
        accumulate_empty(vehicle, consumed_distance_mm, delta_ms);
    }
}

fn accumulate(vehicle: &mut Vehicle, distance_mm: u64, duration_ms: u64, status: VehicleStatus, load: usize) {
    vehicle.dist_traveled_mm += distance_mm;
    vehicle.dur_traveled_ms += duration_ms;
    if status == VehicleStatus::Rebalancing {
        vehicle.rebl_dist_traveled_mm += distance_mm;
        vehicle.rebl_dur_traveled_ms += duration_ms;
    } else if load > 0 {
        vehicle.loaded_dist_traveled_mm += distance_mm;
        vehicle.loaded_dur_traveled_ms += duration_ms;
    } else {
        vehicle.empty_dist_traveled_mm += distance_mm;
        vehicle.empty_dur_traveled_ms += duration_ms;
    }
}

fn accumulate_empty(vehicle: &mut Vehicle, distance_mm: u64, duration_ms: u64) {
    vehicle.dist_traveled_mm += distance_mm;
    vehicle.dur_traveled_ms += duration_ms;
    vehicle.empty_dist_traveled_mm += distance_mm;
    vehicle.empty_dur_traveled_ms += duration_ms;
}

fn fire_event(vehicle: &mut Vehicle, orders: &mut [Order], wp: &Waypoint, now_ms: u64, report: &mut AdvanceReport) {
    match wp.op {
        WaypointOp::Pickup => {
            assert!(vehicle.load < vehicle.capacity, "vehicle {} pickup would exceed capacity", vehicle.id);
            assert_eq!(orders[wp.order_id].status, OrderStatus::Picking);
            orders[wp.order_id].pickup_time_ms = Some(now_ms);
            orders[wp.order_id].status = OrderStatus::Onboard;
            vehicle.load += 1;
            vehicle.onboard_order_ids.push(wp.order_id);
            report.picked_ids.push(wp.order_id);
        }
        WaypointOp::Dropoff => {
            assert!(vehicle.load > 0, "vehicle {} dropoff with zero load", vehicle.id);
            assert_eq!(orders[wp.order_id].status, OrderStatus::Onboard);
            orders[wp.order_id].dropoff_time_ms = Some(now_ms);
            orders[wp.order_id].status = OrderStatus::Complete;
            vehicle.load -= 1;
            vehicle.onboard_order_ids.retain(|&id| id != wp.order_id);
            report.dropped_ids.push(wp.order_id);
        }
        WaypointOp::Reposition => {}
    }
}

/// §4.12: truncate a single step by `t_ms` (`0 <= t_ms < step.duration_ms`).
/// The new start pose is interpolated toward the step's end and tagged with
/// the end's node id, marking "on an edge approaching end". Duration is
/// decremented directly (not scaled) to avoid a rounding hazard; distance is
/// scaled by the remaining fraction.
pub fn truncate_step(step: Step, t_ms: u64) -> Step {
    debug_assert!(t_ms < step.duration_ms);
    let ratio = t_ms as f64 / step.duration_ms as f64;
    let start = crate::model::Pos::new(
        step.end.node_id,
        step.start.lon + ratio * (step.end.lon - step.start.lon),
        step.start.lat + ratio * (step.end.lat - step.start.lat),
    );
    Step {
        start,
        end: step.end,
        distance_mm: (step.distance_mm as f64 * (1.0 - ratio)) as u64,
        duration_ms: step.duration_ms - t_ms,
    }
}

/// §4.12: drop whole prefix steps of `route` until the next step would
/// exceed `t_ms`, then truncate that step. Requires `route.steps().len() >=
/// 2` (a body step plus the flag step) and `0 <= t_ms < route.duration_ms()`.
pub fn truncate_route(route: &Route, t_ms: u64) -> Route {
    debug_assert!(route.steps().len() >= 2);
    debug_assert!(t_ms < route.duration_ms());

    let steps = route.steps();
    let mut remaining_ms = t_ms;
    let mut idx = 0;
    while idx < steps.len() && steps[idx].duration_ms <= remaining_ms {
        remaining_ms -= steps[idx].duration_ms;
        idx += 1;
    }

    let mut new_steps = Vec::with_capacity(steps.len() - idx + 1);
    if remaining_ms > 0 {
        new_steps.push(truncate_step(steps[idx], remaining_ms));
        idx += 1;
    }
    new_steps.extend_from_slice(&steps[idx..]);
    Route::from_steps(new_steps)
}
