//! Optimal Schedule Pool (OSP, §4.8): build every feasible (vehicle, trip)
//! pair via size-increasing trip enumeration, solve a set-partitioning ILP
//! that allows already-Picking orders to be reassigned, and collapse any
//! untouched Working vehicle whose pickups were released elsewhere.

use crate::model::{Order, OrderStatus, Vehicle, VehicleStatus};
use crate::router::Router;
use crate::scheduling::{
    basic_schedules_for_vehicle, enumerate_trips_for_vehicle, schedule_cost_ms, TripEnumerationConfig,
};

use super::scoring::{count_biased_score, delay_scale, increased_delay_score};
use super::solver::{sort_pairs_for_ilp, AssignmentSolver, Pair};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// `considered_order_ids` must be all orders with status Picking or
/// Pending. Reoptimisation (dropping stale pickups from Working vehicles'
/// basic schedules) is always enabled for OSP.
pub fn run_osp(
    considered_order_ids: &[usize],
    orders: &mut [Order],
    vehicles: &mut [Vehicle],
    system_time_ms: u64,
    router: &dyn Router,
    solver: &dyn AssignmentSolver,
    trip_config: TripEnumerationConfig,
) {
    let was_working: Vec<bool> = vehicles.iter().map(|v| v.status == VehicleStatus::Working).collect();

    let mut pairs: Vec<Pair> = Vec::new();
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

    let per_vehicle_pairs = |vehicle: &Vehicle| {
        let basic_schedules = basic_schedules_for_vehicle(vehicle, true, router);
        let trip_pairs = enumerate_trips_for_vehicle(
            vehicle,
            considered_order_ids,
            orders,
            &basic_schedules,
            system_time_ms,
            router,
            trip_config,
        );
        let current_cost_ms = schedule_cost_ms(&vehicle.schedule, orders, vehicle, system_time_ms);
        trip_pairs
            .into_iter()
            .filter_map(|tp| {
                let best_idx = tp.result.best_schedule_idx?;
                let schedule = tp.result.feasible_schedules[best_idx].clone();
                let delay_ms = increased_delay_score(current_cost_ms, tp.result.best_schedule_cost_ms);
                Some((vehicle.id, tp.trip_ids, schedule, tp.result.best_schedule_cost_ms, delay_ms))
            })
            .collect::<Vec<_>>()
    };

    #[cfg(feature = "parallel")]
    let raw: Vec<_> = vehicles.par_iter().flat_map(per_vehicle_pairs).collect();
    #[cfg(not(feature = "parallel"))]
    let raw: Vec<_> = vehicles.iter().flat_map(per_vehicle_pairs).collect();

    let max_abs_delay_ms = raw.iter().map(|(.., delay)| delay.abs()).fold(0.0f64, f64::max);
    let scale = delay_scale(max_abs_delay_ms);

    for (vehicle_id, trip_ids, schedule, cost_ms, delay_ms) in raw {
        let score = count_biased_score(trip_ids.len(), delay_ms, scale);
        pairs.push(Pair {
            vehicle_id,
            trip_ids,
            schedule,
            cost_ms,
            score,
        });
    }

    sort_pairs_for_ilp(&mut pairs);

    let must_assign: Vec<usize> = considered_order_ids
        .iter()
        .copied()
        .filter(|&id| orders[id].status == OrderStatus::Picking)
        .collect();

    let selected = solver.solve(&pairs, considered_order_ids, &must_assign);

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

    // §4.8 post-commit rule: a Working vehicle that kept its "empty" pair
    // (so never got `schedule_updated_this_epoch`) but whose stale pickups
    // were reassigned elsewhere now has a schedule longer than its load.
    // Collapse it to the onboard-dropoffs-only basic schedule.
    for (i, vehicle) in vehicles.iter_mut().enumerate() {
        if vehicle.schedule_updated_this_epoch || !was_working[i] {
            continue;
        }
        if vehicle.schedule.len() == vehicle.load {
            continue;
        }
        if let Some(basic) = basic_schedules_for_vehicle(vehicle, true, router).into_iter().next() {
            vehicle.schedule = basic;
        }
    }
}
