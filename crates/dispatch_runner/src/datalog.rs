//! Append-only per-epoch datalog (§6 "Outputs from the core"): one JSON Lines
//! record per epoch containing a vehicle snapshot and an order snapshot,
//! written one line per epoch (rather than one document per run) so a long
//! run can be tailed while it's still executing.

use std::io::Write;

use dispatch_core::model::{Order, Vehicle};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct VehicleSnapshot {
    pub id: usize,
    pub node_id: u64,
    pub status: dispatch_core::model::VehicleStatus,
    pub load: usize,
    pub schedule_len: usize,
}

impl From<&Vehicle> for VehicleSnapshot {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id,
            node_id: vehicle.pos.node_id,
            status: vehicle.status,
            load: vehicle.load,
            schedule_len: vehicle.schedule.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderSnapshot {
    pub id: usize,
    pub status: dispatch_core::model::OrderStatus,
    pub pickup_time_ms: Option<u64>,
    pub dropoff_time_ms: Option<u64>,
}

impl From<&Order> for OrderSnapshot {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            status: order.status,
            pickup_time_ms: order.pickup_time_ms,
            dropoff_time_ms: order.dropoff_time_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EpochRecord {
    pub system_time_ms: u64,
    pub vehicles: Vec<VehicleSnapshot>,
    pub orders: Vec<OrderSnapshot>,
}

/// Appends one JSON line to `writer` for the epoch ending at
/// `system_time_ms`. Returns a descriptive error string on any I/O or
/// serialization failure, per the workspace's `Result<T, String>` idiom.
pub fn append_epoch(
    writer: &mut impl Write,
    system_time_ms: u64,
    vehicles: &[Vehicle],
    orders: &[Order],
) -> Result<(), String> {
    let record = EpochRecord {
        system_time_ms,
        vehicles: vehicles.iter().map(VehicleSnapshot::from).collect(),
        orders: orders.iter().map(OrderSnapshot::from).collect(),
    };
    let line = serde_json::to_string(&record)
        .map_err(|error| format!("failed to serialize epoch {system_time_ms}: {error}"))?;
    writeln!(writer, "{line}").map_err(|error| format!("failed to write datalog line: {error}"))
}
