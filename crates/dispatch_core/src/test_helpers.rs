//! Test-only collaborators shared across unit tests in this crate.

use crate::model::{Pos, Route};
use crate::router::{RouteMode, Router};

/// A router over a 1-D line of node ids: travel time/distance between two
/// node ids is proportional to the difference in id, at a fixed speed.
/// Every node id is reachable from every other; `node_pos`/vehicle stations
/// are trivial. Deliberately not grounded in any production routing
/// algorithm, it exists only so scheduling-kernel tests don't need a real
/// road network.
pub struct GridRouter {
    speed_mm_per_ms: f64,
}

impl GridRouter {
    pub fn new() -> Self {
        Self {
            speed_mm_per_ms: 10.0,
        }
    }
}

impl Default for GridRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Router for GridRouter {
    fn route(&self, origin: Pos, destination: Pos, _mode: RouteMode) -> Option<Route> {
        if origin.node_id == destination.node_id {
            return Some(Route::single_leg(origin, destination, 0, 0));
        }
        let delta = (origin.node_id as i64 - destination.node_id as i64).unsigned_abs();
        let distance_mm = delta * 1_000;
        let duration_ms = (distance_mm as f64 / self.speed_mm_per_ms) as u64;
        Some(Route::single_leg(origin, destination, distance_mm, duration_ms))
    }

    fn node_pos(&self, node_id: u64) -> Option<Pos> {
        Some(Pos::new(node_id, 0.0, 0.0))
    }

    fn vehicle_station_id(&self, index: usize) -> u64 {
        index as u64
    }

    fn num_vehicle_stations(&self) -> usize {
        100
    }
}
