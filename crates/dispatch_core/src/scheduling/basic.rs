//! Basic schedules for OSP (§4.6): the per-vehicle starting point(s) from
//! which size-1 trips are enumerated.

use crate::model::{Vehicle, VehicleStatus, Waypoint};
use crate::router::{RouteMode, Router};

/// Derive the basic schedule(s) for `vehicle`.
///
/// Idle/Rebalancing vehicles (or when reoptimisation is disabled) keep
/// their schedule verbatim: a single basic schedule. Working vehicles with
/// reoptimisation enabled drop all Pickup waypoints and evaluate every
/// permutation of the remaining Dropoffs, keeping the feasible ones.
pub fn basic_schedules_for_vehicle(
    vehicle: &Vehicle,
    reoptimize: bool,
    router: &dyn Router,
) -> Vec<Vec<Waypoint>> {
    if vehicle.status != VehicleStatus::Working || !reoptimize {
        return vec![vehicle.schedule.clone()];
    }

    let dropoffs: Vec<&Waypoint> = vehicle
        .schedule
        .iter()
        .filter(|wp| wp.op == crate::model::WaypointOp::Dropoff)
        .collect();
    assert_eq!(dropoffs.len(), vehicle.load, "basic schedule dropoff count must equal load");

    if dropoffs.is_empty() {
        return vec![Vec::new()];
    }

    let order_ids: Vec<usize> = dropoffs.iter().map(|wp| wp.order_id).collect();
    let mut out = Vec::new();
    let mut perm: Vec<usize> = (0..order_ids.len()).collect();
    permute(&mut perm, 0, &mut |order: &[usize]| {
        if let Some(schedule) = rebuild_dropoff_only_schedule(vehicle, &order_ids, order, router) {
            out.push(schedule);
        }
    });
    if out.is_empty() {
        // No permutation produced a router-reachable schedule; fall back to
        // the natural order so the vehicle still has a basic schedule.
        if let Some(schedule) = rebuild_dropoff_only_schedule(vehicle, &order_ids, &perm, router) {
            out.push(schedule);
        }
    }
    out
}

/// Rebuild a dropoffs-only schedule visiting `order_ids[order[i]]` in order,
/// re-querying routes from the vehicle's current position.
fn rebuild_dropoff_only_schedule(
    vehicle: &Vehicle,
    order_ids: &[usize],
    order: &[usize],
    router: &dyn Router,
) -> Option<Vec<Waypoint>> {
    let mut pos = vehicle.pos;
    let mut schedule = Vec::with_capacity(order.len());
    for &idx in order {
        let order_id = order_ids[idx];
        let wp = vehicle
            .schedule
            .iter()
            .find(|wp| wp.op == crate::model::WaypointOp::Dropoff && wp.order_id == order_id)?;
        let route = router.route(pos, wp.pos, RouteMode::TimeOnly)?;
        pos = wp.pos;
        schedule.push(Waypoint::dropoff(pos, order_id, route));
    }
    Some(schedule)
}

/// Heap's algorithm, iterative via recursion. `n!` permutations of `0..n`;
/// `n` is `vehicle.load`, bounded by fleet capacity, so this stays cheap.
fn permute(arr: &mut [usize], k: usize, visit: &mut impl FnMut(&[usize])) {
    if k == arr.len() {
        visit(arr);
        return;
    }
    for i in k..arr.len() {
        arr.swap(k, i);
        permute(arr, k + 1, visit);
        arr.swap(k, i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pos, Route};
    use crate::test_helpers::GridRouter;

    fn pos(id: u64) -> Pos {
        Pos::new(id, 0.0, 0.0)
    }

    #[test]
    fn idle_vehicle_keeps_schedule_verbatim() {
        let mut vehicle = Vehicle::new(0, pos(1), 2);
        vehicle.status = VehicleStatus::Idle;
        vehicle.schedule = vec![Waypoint::dropoff(pos(2), 0, Route::single_leg(pos(1), pos(2), 100, 1_000))];
        let router = GridRouter::new();
        let schedules = basic_schedules_for_vehicle(&vehicle, true, &router);
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].len(), 1);
    }

    #[test]
    fn working_vehicle_drops_pickups_and_permutes_dropoffs() {
        let mut vehicle = Vehicle::new(0, pos(1), 2);
        vehicle.status = VehicleStatus::Working;
        vehicle.load = 2;
        vehicle.onboard_order_ids = vec![0, 1];
        vehicle.schedule = vec![
            Waypoint::pickup(pos(2), 2, Route::single_leg(pos(1), pos(2), 100, 1_000)),
            Waypoint::dropoff(pos(3), 0, Route::single_leg(pos(2), pos(3), 100, 1_000)),
            Waypoint::dropoff(pos(4), 1, Route::single_leg(pos(3), pos(4), 100, 1_000)),
        ];
        let router = GridRouter::new();
        let schedules = basic_schedules_for_vehicle(&vehicle, true, &router);
        // Two dropoffs => up to 2 permutations, none contain a Pickup.
        assert!(!schedules.is_empty());
        assert!(schedules.len() <= 2);
        for s in &schedules {
            assert!(s.iter().all(|wp| wp.op == crate::model::WaypointOp::Dropoff));
            assert_eq!(s.len(), 2);
        }
    }

    #[test]
    fn working_vehicle_without_reoptimize_keeps_schedule_verbatim() {
        let mut vehicle = Vehicle::new(0, pos(1), 2);
        vehicle.status = VehicleStatus::Working;
        vehicle.load = 1;
        vehicle.schedule = vec![Waypoint::dropoff(pos(2), 0, Route::single_leg(pos(1), pos(2), 100, 1_000))];
        let router = GridRouter::new();
        let schedules = basic_schedules_for_vehicle(&vehicle, false, &router);
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].len(), 1);
    }
}
