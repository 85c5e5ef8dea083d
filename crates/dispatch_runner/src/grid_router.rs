//! A small in-memory grid router (§4.1 "added"): a demo/test `Router`
//! implementation over a square grid of nodes with constant edge speed,
//! in the same zero-dependency spirit as a hex-cell route provider. This is
//! explicitly not the CSV-ingesting production router the core's OUT OF
//! SCOPE section excludes; it exists so examples, tests and the CLI have
//! something to route against without a real road network.

use dispatch_core::model::{Pos, Route};
use dispatch_core::router::{RouteMode, Router};

/// Nodes are laid out on a `side x side` grid, id = `row * side + col`,
/// Manhattan-routed at a constant speed. Distances are in millimetres,
/// durations in milliseconds.
#[derive(Debug, Clone)]
pub struct GridRouter {
    side: usize,
    cell_size_mm: u64,
    speed_mm_per_ms: f64,
}

impl GridRouter {
    pub fn new(side: usize, cell_size_mm: u64, speed_mm_per_ms: f64) -> Self {
        assert!(side > 0, "grid router needs at least one node");
        assert!(speed_mm_per_ms > 0.0, "grid router speed must be positive");
        Self {
            side,
            cell_size_mm,
            speed_mm_per_ms,
        }
    }

    fn row_col(&self, node_id: u64) -> (i64, i64) {
        let id = node_id as i64;
        (id / self.side as i64, id % self.side as i64)
    }
}

impl Router for GridRouter {
    fn route(&self, origin: Pos, destination: Pos, _mode: RouteMode) -> Option<Route> {
        if origin.node_id >= (self.side * self.side) as u64
            || destination.node_id >= (self.side * self.side) as u64
        {
            return None;
        }
        if origin.node_id == destination.node_id {
            return Some(Route::single_leg(origin, destination, 0, 0));
        }
        let (r0, c0) = self.row_col(origin.node_id);
        let (r1, c1) = self.row_col(destination.node_id);
        let manhattan_cells = (r0 - r1).unsigned_abs() + (c0 - c1).unsigned_abs();
        let distance_mm = manhattan_cells * self.cell_size_mm;
        let duration_ms = (distance_mm as f64 / self.speed_mm_per_ms) as u64;
        Some(Route::single_leg(origin, destination, distance_mm, duration_ms))
    }

    fn node_pos(&self, node_id: u64) -> Option<Pos> {
        if node_id >= (self.side * self.side) as u64 {
            return None;
        }
        let (row, col) = self.row_col(node_id);
        Some(Pos::new(node_id, col as f64, row as f64))
    }

    fn vehicle_station_id(&self, index: usize) -> u64 {
        let total = self.side * self.side;
        assert!(index < total, "vehicle station index {index} out of range (grid has {total} nodes)");
        index as u64
    }

    fn num_vehicle_stations(&self) -> usize {
        self.side * self.side
    }
}
