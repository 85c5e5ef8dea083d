//! Single-request Batch Assignment (SBA, §4.8): enumerate every feasible
//! (vehicle, new-order) pair plus a per-vehicle "keep current schedule"
//! pair, score with the count-biased function, and solve a one-to-one
//! matching ILP.

use crate::model::{Order, OrderStatus, Vehicle, VehicleStatus, Waypoint};
use crate::router::Router;
use crate::scheduling::{compute_schedule_of_inserting_order, passes_quick_filter, schedule_cost_ms};

use super::scoring::{count_biased_score, delay_scale, increased_delay_score};
use super::solver::{sort_pairs_for_ilp, AssignmentSolver, Pair};

pub fn run_sba(
    new_order_ids: &[usize],
    orders: &mut [Order],
    vehicles: &mut [Vehicle],
    system_time_ms: u64,
    router: &dyn Router,
    solver: &dyn AssignmentSolver,
) {
    let mut pairs: Vec<Pair> = Vec::with_capacity(vehicles.len() + new_order_ids.len());
    for vehicle in vehicles.iter() {
        let cost_ms = schedule_cost_ms(&vehicle.schedule, orders, vehicle, system_time_ms);
        pairs.push(Pair {
            vehicle_id: vehicle.id,
            trip_ids: Vec::new(),
            schedule: vehicle.schedule.clone(),
            cost_ms,
            score: 0.0,
        });
    }

    // Collect every feasible (vehicle, order) candidate first so the
    // count-biased score (§4.9) can be scaled against the whole pool's
    // worst delay, not just whatever has been seen so far.
    let mut candidates: Vec<(usize, usize, Vec<Waypoint>, u64, f64)> = Vec::new();
    let mut max_abs_delay_ms = 0.0f64;
    for &order_id in new_order_ids {
        let order = &orders[order_id];
        for vehicle in vehicles.iter() {
            if !passes_quick_filter(order, vehicle, system_time_ms, router) {
                continue;
            }
            let basic_schedules = vec![vehicle.schedule.clone()];
            let result =
                compute_schedule_of_inserting_order(order, orders, vehicle, &basic_schedules, system_time_ms, router);
            let Some(schedule) = result.best_schedule() else {
                continue;
            };
            let current_cost_ms = schedule_cost_ms(&vehicle.schedule, orders, vehicle, system_time_ms);
            let delay_ms = increased_delay_score(current_cost_ms, result.best_schedule_cost_ms);
            max_abs_delay_ms = max_abs_delay_ms.max(delay_ms.abs());
            candidates.push((order_id, vehicle.id, schedule.clone(), result.best_schedule_cost_ms, delay_ms));
        }
    }

    let scale = delay_scale(max_abs_delay_ms);
    for (order_id, vehicle_id, schedule, cost_ms, delay_ms) in candidates {
        pairs.push(Pair {
            vehicle_id,
            trip_ids: vec![order_id],
            schedule,
            cost_ms,
            score: count_biased_score(1, delay_ms, scale),
        });
    }

    sort_pairs_for_ilp(&mut pairs);

    // New orders are never yet Picking, so the reassignment guarantee
    // (§4.10 constraint 3) is vacuous here.
    let selected = solver.solve(&pairs, new_order_ids, &[]);

    for idx in selected {
        let pair = &pairs[idx];
        if pair.trip_ids.is_empty() {
            continue;
        }
        let vehicle = &mut vehicles[pair.vehicle_id];
        vehicle.schedule = pair.schedule.clone();
        vehicle.status = VehicleStatus::Working;
        vehicle.schedule_updated_this_epoch = true;
        for &order_id in &pair.trip_ids {
            orders[order_id].status = OrderStatus::Picking;
        }
    }
}
