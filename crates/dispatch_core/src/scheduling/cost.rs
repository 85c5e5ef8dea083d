//! Schedule cost (§4.2): the sum over `Dropoff` waypoints of arrival-time
//! delay relative to each order's shortest direct travel time.

use crate::model::{Order, Vehicle, Waypoint, WaypointOp};

/// Cost of `schedule` given the vehicle's current position and system time.
/// Empty schedule costs 0.
///
/// Edge case: if the schedule's first waypoint route already begins with a
/// self-loop step (same node id on both ends), that route was built by
/// `truncate_route` and already bakes in `vehicle.step_to_pos`'s duration.
/// Adding it again would double-count, so this is detected by inspecting the
/// first step's endpoints rather than tracking provenance separately.
pub fn schedule_cost_ms(schedule: &[Waypoint], orders: &[Order], vehicle: &Vehicle, system_time_ms: u64) -> u64 {
    if schedule.is_empty() {
        return 0;
    }

    let first_step_is_prefix = schedule[0].route.steps()[0].is_self_loop();

    let mut acc_time_ms = system_time_ms;
    if !first_step_is_prefix {
        if let Some(step) = vehicle.step_to_pos {
            acc_time_ms += step.duration_ms;
        }
    }

    let mut cost_ms: u64 = 0;
    for wp in schedule {
        acc_time_ms += wp.route.duration_ms();
        if wp.op == WaypointOp::Dropoff {
            let order = &orders[wp.order_id];
            let target_ms = order.request_time_ms + order.shortest_travel_time_ms;
            let delay_ms = acc_time_ms.saturating_sub(target_ms);
            cost_ms += delay_ms;
        }
    }
    cost_ms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pos, Route, VehicleStatus};

    fn pos(id: u64) -> Pos {
        Pos::new(id, 0.0, 0.0)
    }

    #[test]
    fn empty_schedule_costs_zero() {
        let vehicle = Vehicle::new(0, pos(1), 1);
        assert_eq!(schedule_cost_ms(&[], &[], &vehicle, 0), 0);
    }

    #[test]
    fn no_wait_no_detour_costs_zero() {
        let order = Order::new(
            0,
            &crate::model::Request {
                origin: pos(1),
                destination: pos(2),
                request_time_ms: 0,
                wall_clock: None,
            },
            60_000,
            crate::model::DeadlineConstraints::default(),
        );
        let vehicle = Vehicle::new(0, pos(1), 1);
        let schedule = vec![
            Waypoint::pickup(pos(1), 0, Route::single_leg(pos(1), pos(1), 0, 0)),
            Waypoint::dropoff(pos(2), 0, Route::single_leg(pos(1), pos(2), 600, 60_000)),
        ];
        assert_eq!(schedule_cost_ms(&schedule, &[order], &vehicle, 0), 0);
        assert_eq!(vehicle.status, VehicleStatus::Idle);
    }

    #[test]
    fn step_to_pos_is_added_once_when_not_already_prefixed() {
        let order = Order::new(
            0,
            &crate::model::Request {
                origin: pos(2),
                destination: pos(3),
                request_time_ms: 0,
                wall_clock: None,
            },
            60_000,
            crate::model::DeadlineConstraints::default(),
        );
        let mut vehicle = Vehicle::new(0, pos(1), 1);
        vehicle.step_to_pos = Some(crate::model::Step::new(pos(1), pos(2), 100, 10_000));
        let schedule = vec![
            Waypoint::pickup(pos(2), 0, Route::single_leg(pos(1), pos(2), 600, 20_000)),
            Waypoint::dropoff(pos(3), 0, Route::single_leg(pos(2), pos(3), 600, 60_000)),
        ];
        // acc after step_to_pos (10s) + pickup leg (20s) + dropoff leg (60s) = 90s
        // target = request_time (0) + shortest_travel_time (60s) = 60s -> delay 30s
        assert_eq!(schedule_cost_ms(&schedule, &[order], &vehicle, 0), 30_000);
    }
}
