//! Greedy Insertion (GI, §4.8): process new orders first-in-first-out,
//! commit each to the vehicle whose insertion scores best.

use crate::model::{Order, OrderStatus, Vehicle, VehicleStatus};
use crate::router::Router;
use crate::scheduling::{compute_schedule_of_inserting_order, passes_quick_filter, schedule_cost_ms};

use super::scoring::increased_delay_score;

/// Commit `new_order_ids` (in arrival order) to the best-scoring vehicle
/// each, mutating `orders` and `vehicles` in place. An order with no
/// feasible vehicle stays `Pending`.
pub fn run_gi(new_order_ids: &[usize], orders: &mut [Order], vehicles: &mut [Vehicle], system_time_ms: u64, router: &dyn Router) {
    for &order_id in new_order_ids {
        let best = {
            let order = &orders[order_id];
            let mut best: Option<(usize, Vec<crate::model::Waypoint>, f64)> = None;
            for vehicle in vehicles.iter() {
                if !passes_quick_filter(order, vehicle, system_time_ms, router) {
                    continue;
                }
                let basic_schedules = vec![vehicle.schedule.clone()];
                let result =
                    compute_schedule_of_inserting_order(order, orders, vehicle, &basic_schedules, system_time_ms, router);
                let Some(candidate) = result.best_schedule() else {
                    continue;
                };
                let current_cost_ms = schedule_cost_ms(&vehicle.schedule, orders, vehicle, system_time_ms);
                let score = increased_delay_score(current_cost_ms, result.best_schedule_cost_ms);
                let is_better = best.as_ref().map_or(true, |(_, _, best_score)| score > *best_score);
                if is_better {
                    best = Some((vehicle.id, candidate.clone(), score));
                }
            }
            best
        };

        if let Some((vehicle_id, schedule, score)) = best {
            debug_assert!(
                score <= 1e-6,
                "a valid insertion cannot reduce cumulative drop-off delay below the baseline, got {score}"
            );
            let vehicle = &mut vehicles[vehicle_id];
            vehicle.schedule = schedule;
            vehicle.status = VehicleStatus::Working;
            vehicle.schedule_updated_this_epoch = true;
            orders[order_id].status = OrderStatus::Picking;
        }
    }
}
