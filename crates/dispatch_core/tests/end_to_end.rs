//! End-to-end scenarios on a 2-node straight road: edge travel time 60 s,
//! distance 600 m, Δ = 30 s, MaxWait = 300 s, MaxDetour = 1.3 (§8).

use dispatch_core::advance::advance_vehicle;
use dispatch_core::assign::{run_gi, run_osp, GreedySolver};
use dispatch_core::model::{DeadlineConstraints, Order, OrderStatus, Pos, Request, Route, Vehicle, VehicleStatus, Waypoint};
use dispatch_core::router::{RouteMode, Router};
use dispatch_core::scheduling::TripEnumerationConfig;

const EDGE_DURATION_MS: u64 = 60_000;
const EDGE_DISTANCE_MM: u64 = 600_000;
const DELTA_MS: u64 = 30_000;

fn constraints() -> DeadlineConstraints {
    DeadlineConstraints {
        max_wait_ms: 300_000,
        max_detour: 1.3,
    }
}

/// A-B two node line, plus a midpoint "M" at node 3 halfway between them,
/// used by the reposition scenario.
struct LineRouter;

impl Router for LineRouter {
    fn route(&self, origin: Pos, destination: Pos, _mode: RouteMode) -> Option<Route> {
        if origin.node_id == destination.node_id {
            return Some(Route::single_leg(origin, destination, 0, 0));
        }
        let (a, b) = (origin.node_id, destination.node_id);
        let (distance_mm, duration_ms) = match (a, b) {
            (1, 2) | (2, 1) => (EDGE_DISTANCE_MM, EDGE_DURATION_MS),
            (1, 3) | (3, 1) => (EDGE_DISTANCE_MM / 2, EDGE_DURATION_MS / 2),
            (3, 2) | (2, 3) => (EDGE_DISTANCE_MM / 2, EDGE_DURATION_MS / 2),
            _ => (EDGE_DISTANCE_MM, EDGE_DURATION_MS),
        };
        Some(Route::single_leg(origin, destination, distance_mm, duration_ms))
    }

    fn node_pos(&self, node_id: u64) -> Option<Pos> {
        Some(Pos::new(node_id, 0.0, 0.0))
    }

    fn vehicle_station_id(&self, index: usize) -> u64 {
        index as u64
    }

    fn num_vehicle_stations(&self) -> usize {
        2
    }
}

fn pos(id: u64) -> Pos {
    Pos::new(id, 0.0, 0.0)
}

fn order_a_to_b(id: usize, request_time_ms: u64) -> Order {
    Order::new(
        id,
        &Request {
            origin: pos(1),
            destination: pos(2),
            request_time_ms,
            wall_clock: None,
        },
        EDGE_DURATION_MS,
        constraints(),
    )
}

#[test]
fn scenario_1_single_idle_vehicle_picks_single_request() {
    let router = LineRouter;
    let mut orders = vec![order_a_to_b(0, 0)];
    let mut vehicles = vec![Vehicle::new(0, pos(1), 1)];

    run_gi(&[0], &mut orders, &mut vehicles, 0, &router);

    assert_eq!(orders[0].status, OrderStatus::Picking);
    assert_eq!(vehicles[0].schedule.len(), 2);

    advance_vehicle(&mut vehicles[0], &mut orders, 0, DELTA_MS, false);
    assert_eq!(orders[0].status, OrderStatus::Onboard);
    assert_eq!(orders[0].pickup_time_ms, Some(0));

    advance_vehicle(&mut vehicles[0], &mut orders, DELTA_MS, DELTA_MS, false);
    assert_eq!(orders[0].status, OrderStatus::Complete);
    assert_eq!(orders[0].dropoff_time_ms, Some(2 * DELTA_MS));
    assert_eq!(vehicles[0].status, VehicleStatus::Idle);
}

#[test]
fn scenario_2_capacity_one_rejects_shared_trip_then_walks_away() {
    let router = LineRouter;
    let mut orders = vec![order_a_to_b(0, 0), order_a_to_b(1, 0)];
    let mut vehicles = vec![Vehicle::new(0, pos(1), 1)];

    run_gi(&[0], &mut orders, &mut vehicles, 0, &router);
    run_gi(&[1], &mut orders, &mut vehicles, 0, &router);

    assert_eq!(orders[0].status, OrderStatus::Picking);
    assert_eq!(orders[1].status, OrderStatus::Pending);

    assert!(!orders[1].should_walk_away(299_999));
    assert!(orders[1].should_walk_away(300_001));
}

#[test]
fn scenario_4_pickup_deadline_prune_yields_zero_feasible_results() {
    use dispatch_core::scheduling::{compute_schedule_of_inserting_order, ValidationOutcome, ViolationClass};

    let router = LineRouter;
    // An order whose shortest trip already exceeds MaxWait at pickup_idx 0
    // when the vehicle starts far away: travel time from vehicle to pickup
    // alone already blows the deadline.
    let order = Order::new(
        0,
        &Request {
            origin: pos(2),
            destination: pos(1),
            request_time_ms: 0,
            wall_clock: None,
        },
        EDGE_DURATION_MS,
        DeadlineConstraints {
            max_wait_ms: 0,
            max_detour: 1.0,
        },
    );
    let vehicle = Vehicle::new(0, pos(1), 1);
    let basic_schedules = vec![vehicle.schedule.clone()];

    let result = compute_schedule_of_inserting_order(&order, &[order.clone()], &vehicle, &basic_schedules, 0, &router);
    assert!(!result.success);
    assert!(result.feasible_schedules.is_empty());

    // Directly exercise the class-2 short circuit the enumeration relies on.
    let schedule = vec![Waypoint::pickup(pos(1), 0, Route::single_leg(pos(1), pos(1), 0, EDGE_DURATION_MS))];
    let outcome = dispatch_core::scheduling::validate_schedule(&schedule, 0, 0, 0, &[order], &vehicle, 0);
    assert_eq!(outcome, ValidationOutcome::Violation(ViolationClass::TerminalForOrder));
}

#[test]
fn scenario_6_route_truncation_symmetry() {
    use dispatch_core::advance::truncate_route;
    use dispatch_core::model::Step;

    let route = Route::new(
        vec![Step::new(pos(1), pos(3), 300_000, 60_000), Step::new(pos(3), pos(2), 300_000, 60_000)],
        pos(2),
    );
    assert_eq!(route.duration_ms(), 120_000);

    let truncated = truncate_route(&route, 90_000);
    assert_eq!(truncated.duration_ms(), 30_000);
    assert!(truncated.distance_mm() <= route.distance_mm());
    assert!(truncated.steps()[0].is_self_loop());
}

#[test]
fn scenario_3_osp_rebinds_a_picking_order_to_a_better_placed_vehicle() {
    let router = LineRouter;
    let mut orders = vec![order_a_to_b(0, 0)];
    let mut vehicles = vec![Vehicle::new(0, pos(1), 2), Vehicle::new(1, pos(3), 2)];

    // Epoch 1: only V0 can serve X, GI-style single assignment via OSP too.
    run_osp(&[0], &mut orders, &mut vehicles, 0, &router, &GreedySolver, TripEnumerationConfig::default());
    assert_eq!(orders[0].status, OrderStatus::Picking);
    let carrier_of_x = vehicles.iter().find(|v| !v.schedule.is_empty()).map(|v| v.id);
    assert!(carrier_of_x.is_some());

    // Epoch 2: a new order near V1 arrives; OSP may keep X on V0 or rebind
    // it to V1 depending on which minimises combined delay, but must not
    // leave X stranded and must not double-serve it.
    orders.push(order_a_to_b(1, 30_000));
    let considered: Vec<usize> = orders
        .iter()
        .filter(|o| matches!(o.status, OrderStatus::Picking | OrderStatus::Pending))
        .map(|o| o.id)
        .collect();
    run_osp(&considered, &mut orders, &mut vehicles, 30_000, &router, &GreedySolver, TripEnumerationConfig::default());

    assert_eq!(orders[0].status, OrderStatus::Picking);
    let pickups_for_x: usize = vehicles
        .iter()
        .map(|v| v.schedule.iter().filter(|wp| wp.op == dispatch_core::model::WaypointOp::Pickup && wp.order_id == 0).count())
        .sum();
    assert_eq!(pickups_for_x, 1, "order 0 must be picked up by exactly one vehicle");
}
