//! Data model: road-network positions, routes, schedules, orders and vehicles.
//!
//! Orders and vehicles live in dense `Vec`s owned by the epoch loop and are
//! referenced by `usize` id everywhere else (waypoints, schedules, results),
//! an arena-plus-dense-index pattern, not a graph of pointers or an entity
//! framework. See `DESIGN.md` for the rationale.

use serde::{Deserialize, Serialize};

/// A road-network node: integer node id plus longitude/latitude.
///
/// Equality and hashing are defined on `node_id` alone (coordinates are
/// informational and never compared), the same way a cell-index newtype gets
/// hashed rather than its raw float coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pos {
    pub node_id: u64,
    pub lon: f64,
    pub lat: f64,
}

impl Pos {
    pub fn new(node_id: u64, lon: f64, lat: f64) -> Self {
        Self { node_id, lon, lat }
    }
}

impl PartialEq for Pos {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id
    }
}
impl Eq for Pos {}

impl std::hash::Hash for Pos {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.node_id.hash(state);
    }
}

/// A single directed edge traversal along a route.
///
/// `distance_mm` and `duration_ms` are both `>= 0`. A *flag step* has
/// `start == end` and zero distance/duration; it marks end-of-route.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Step {
    pub start: Pos,
    pub end: Pos,
    pub distance_mm: u64,
    pub duration_ms: u64,
}

impl Step {
    pub fn new(start: Pos, end: Pos, distance_mm: u64, duration_ms: u64) -> Self {
        Self {
            start,
            end,
            distance_mm,
            duration_ms,
        }
    }

    /// The distinguished flag step marking end-of-route at `pos`.
    pub fn flag(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
            distance_mm: 0,
            duration_ms: 0,
        }
    }

    /// A step whose endpoints share a node id: either the flag step or a
    /// mid-edge remainder approaching a node (see `Vehicle::step_to_pos` and
    /// `truncate_route`).
    pub fn is_self_loop(&self) -> bool {
        self.start.node_id == self.end.node_id
    }
}

/// An ordered, non-empty sequence of [`Step`]s. Invariant: the last step is
/// the flag step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    steps: Vec<Step>,
}

impl Route {
    /// Build a route from a body of steps plus an implicit flag step at
    /// `end`. `body` may be empty (time-only queries may return a placeholder
    /// route with no detailed geometry, just the flag step).
    pub fn new(mut body: Vec<Step>, end: Pos) -> Self {
        body.push(Step::flag(end));
        Self { steps: body }
    }

    /// A single-leg route: one body step plus the flag step.
    pub fn single_leg(start: Pos, end: Pos, distance_mm: u64, duration_ms: u64) -> Self {
        Self::new(vec![Step::new(start, end, distance_mm, duration_ms)], end)
    }

    /// Build a route from an already-complete step sequence (the last step
    /// being the flag step). Used by route truncation, which repackages a
    /// suffix of an existing route's steps rather than appending a fresh
    /// flag step.
    pub fn from_steps(steps: Vec<Step>) -> Self {
        debug_assert!(!steps.is_empty());
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn duration_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }

    pub fn distance_mm(&self) -> u64 {
        self.steps.iter().map(|s| s.distance_mm).sum()
    }

    /// The pose the route currently starts from (the vehicle's position at
    /// the start of this leg).
    pub fn start_pos(&self) -> Pos {
        self.steps[0].start
    }

    pub fn end_pos(&self) -> Pos {
        self.steps[self.steps.len() - 1].end
    }
}

/// A stop in a vehicle's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaypointOp {
    Pickup,
    Dropoff,
    Reposition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub pos: Pos,
    pub op: WaypointOp,
    pub order_id: usize,
    /// Route from the previous waypoint (or the vehicle's current position)
    /// to this waypoint's `pos`.
    pub route: Route,
    /// For `Reposition` waypoints only: the direct travel time from the
    /// vehicle's current position to `pos`, queried once when the waypoint
    /// is created. Used by the validator's reachability check (§4.3); kept
    /// as a field rather than re-queried so `validate_schedule` stays a pure
    /// function of the candidate schedule.
    pub direct_time_from_vehicle_ms: Option<u64>,
}

impl Waypoint {
    pub fn pickup(pos: Pos, order_id: usize, route: Route) -> Self {
        Self {
            pos,
            op: WaypointOp::Pickup,
            order_id,
            route,
            direct_time_from_vehicle_ms: None,
        }
    }

    pub fn dropoff(pos: Pos, order_id: usize, route: Route) -> Self {
        Self {
            pos,
            op: WaypointOp::Dropoff,
            order_id,
            route,
            direct_time_from_vehicle_ms: None,
        }
    }

    pub fn reposition(pos: Pos, route: Route, direct_time_from_vehicle_ms: u64) -> Self {
        Self {
            pos,
            op: WaypointOp::Reposition,
            order_id: usize::MAX,
            route,
            direct_time_from_vehicle_ms: Some(direct_time_from_vehicle_ms),
        }
    }
}

/// Raw input from the demand trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub origin: Pos,
    pub destination: Pos,
    pub request_time_ms: u64,
    pub wall_clock: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Picking,
    Onboard,
    Complete,
    Walkaway,
}

/// Global deadline constraints (`MaxWait`, `MaxDetour` from config).
#[derive(Debug, Clone, Copy)]
pub struct DeadlineConstraints {
    pub max_wait_ms: u64,
    pub max_detour: f64,
}

impl Default for DeadlineConstraints {
    fn default() -> Self {
        Self {
            max_wait_ms: 300_000,
            max_detour: 1.3,
        }
    }
}

/// Safety-net age cap on top of the pickup deadline (§3): an order older
/// than `max_pickup_time_ms - request_time_ms + WALKAWAY_AGE_CAP_MS` walks
/// away even if the deadline arithmetic produced an unexpectedly generous
/// `max_pickup_time_ms`.
pub const WALKAWAY_AGE_CAP_MS: u64 = 150_000;

/// Lifecycle object derived from a [`Request`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: usize,
    pub origin: Pos,
    pub destination: Pos,
    pub status: OrderStatus,
    pub request_time_ms: u64,
    pub shortest_travel_time_ms: u64,
    pub max_pickup_time_ms: u64,
    pub max_dropoff_time_ms: u64,
    pub pickup_time_ms: Option<u64>,
    pub dropoff_time_ms: Option<u64>,
}

impl Order {
    /// Derive an `Order` from a `Request`, given the shortest (time-only)
    /// travel time between origin and destination.
    pub fn new(
        id: usize,
        request: &Request,
        shortest_travel_time_ms: u64,
        constraints: DeadlineConstraints,
    ) -> Self {
        let max_pickup_time_ms = request.request_time_ms
            + std::cmp::min(
                constraints.max_wait_ms,
                (shortest_travel_time_ms as f64 * (2.0 - constraints.max_detour)).max(0.0) as u64,
            );
        let pickup_slack_ms = max_pickup_time_ms - request.request_time_ms;
        let detour_allowance_ms =
            (shortest_travel_time_ms as f64 * (constraints.max_detour - 1.0)).max(0.0) as u64;
        let max_dropoff_time_ms = request.request_time_ms
            + shortest_travel_time_ms
            + std::cmp::min(
                2 * constraints.max_wait_ms,
                pickup_slack_ms + detour_allowance_ms,
            );

        Self {
            id,
            origin: request.origin,
            destination: request.destination,
            status: OrderStatus::Pending,
            request_time_ms: request.request_time_ms,
            shortest_travel_time_ms,
            max_pickup_time_ms,
            max_dropoff_time_ms,
            pickup_time_ms: None,
            dropoff_time_ms: None,
        }
    }

    /// Whether this order, still `Pending` at `now_ms`, must auto-expire into
    /// `Walkaway` (§3).
    pub fn should_walk_away(&self, now_ms: u64) -> bool {
        if self.status != OrderStatus::Pending {
            return false;
        }
        if now_ms > self.max_pickup_time_ms {
            return true;
        }
        let age_ms = now_ms.saturating_sub(self.request_time_ms);
        let hard_cap_ms =
            (self.max_pickup_time_ms - self.request_time_ms) + WALKAWAY_AGE_CAP_MS;
        age_ms > hard_cap_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleStatus {
    Idle,
    Working,
    Rebalancing,
}

/// A mobile server in the fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: usize,
    pub pos: Pos,
    pub status: VehicleStatus,
    pub capacity: usize,
    pub load: usize,
    pub schedule: Vec<Waypoint>,
    pub onboard_order_ids: Vec<usize>,
    /// When mid-edge: the remainder of the current step from `pos` to the
    /// next network node. `None` when the vehicle sits exactly on a node.
    pub step_to_pos: Option<Step>,
    /// Reset at the start of every epoch; set when the scheduler commits a
    /// new schedule to this vehicle during the epoch.
    pub schedule_updated_this_epoch: bool,
    pub dist_traveled_mm: u64,
    pub loaded_dist_traveled_mm: u64,
    pub empty_dist_traveled_mm: u64,
    pub rebl_dist_traveled_mm: u64,
    pub dur_traveled_ms: u64,
    pub loaded_dur_traveled_ms: u64,
    pub empty_dur_traveled_ms: u64,
    pub rebl_dur_traveled_ms: u64,
}

impl Vehicle {
    pub fn new(id: usize, pos: Pos, capacity: usize) -> Self {
        Self {
            id,
            pos,
            status: VehicleStatus::Idle,
            capacity,
            load: 0,
            schedule: Vec::new(),
            onboard_order_ids: Vec::new(),
            step_to_pos: None,
            schedule_updated_this_epoch: false,
            dist_traveled_mm: 0,
            loaded_dist_traveled_mm: 0,
            empty_dist_traveled_mm: 0,
            rebl_dist_traveled_mm: 0,
            dur_traveled_ms: 0,
            loaded_dur_traveled_ms: 0,
            empty_dur_traveled_ms: 0,
            rebl_dur_traveled_ms: 0,
        }
    }

    /// Count of `Pickup` waypoints still outstanding in `schedule`.
    pub fn pickups_in_schedule(&self) -> usize {
        self.schedule
            .iter()
            .filter(|wp| wp.op == WaypointOp::Pickup)
            .count()
    }

    /// Count of `Dropoff` waypoints still outstanding in `schedule`.
    pub fn dropoffs_in_schedule(&self) -> usize {
        self.schedule
            .iter()
            .filter(|wp| wp.op == WaypointOp::Dropoff)
            .count()
    }

    /// Structural invariants that must hold after every epoch tick (§3).
    /// Load accounting and schedule conservation: kept as real `assert!`s
    /// rather than `debug_assert!`, since a release build silently carrying
    /// a torn schedule is worse than the cost of checking it.
    pub fn assert_invariants(&self, orders: &[Order]) {
        assert_eq!(self.load, self.onboard_order_ids.len());
        for &order_id in &self.onboard_order_ids {
            let dropoffs = self
                .schedule
                .iter()
                .filter(|wp| wp.op == WaypointOp::Dropoff && wp.order_id == order_id)
                .count();
            assert_eq!(dropoffs, 1, "onboard order {order_id} needs exactly one dropoff");
            assert!(
                !self
                    .schedule
                    .iter()
                    .any(|wp| wp.op == WaypointOp::Pickup && wp.order_id == order_id),
                "onboard order {order_id} must not have a pending pickup"
            );
        }
        for wp in &self.schedule {
            if wp.op == WaypointOp::Pickup {
                let has_dropoff = self.schedule.iter().any(|other| {
                    other.op == WaypointOp::Dropoff && other.order_id == wp.order_id
                });
                assert!(has_dropoff, "pickup for order {} has no matching dropoff", wp.order_id);
            }
        }
        assert_eq!(
            self.pickups_in_schedule() + self.load,
            self.dropoffs_in_schedule()
        );
        let _ = orders;
    }
}
