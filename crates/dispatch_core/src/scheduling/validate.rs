//! Schedule validation (§4.3): given a candidate schedule and the indices of
//! the newly-inserted pickup/dropoff, check time-window and capacity
//! constraints, producing a three-valued violation class that drives the
//! enumeration's loop pruning.
//!
//! A tagged variant instead of an integer code (§9 redesign note), but the
//! three-valued semantics from the source are preserved exactly:
//! terminal-for-order / try-larger-dropoff / try-next-pair.

use crate::model::{Order, Vehicle, Waypoint, WaypointOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationClass {
    /// Break the outer pickup loop: a later pickup index can only worsen.
    TerminalForOrder,
    /// Break the inner dropoff loop; try a later pickup index.
    TryLargerDropoff,
    /// Try the next dropoff index.
    TryNextPair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Ok,
    Violation(ViolationClass),
}

impl ValidationOutcome {
    pub fn is_ok(self) -> bool {
        matches!(self, ValidationOutcome::Ok)
    }
}

/// Validate `schedule`, produced by inserting `inserted_order_id`'s pickup at
/// `pickup_idx` and dropoff at `dropoff_idx`.
///
/// Waypoints before `pickup_idx` are unaffected by the insertion and are not
/// re-checked for time-window violations (they were already checked when the
/// basic/sub-schedule they came from was validated) but still count toward
/// the running capacity `load`.
pub fn validate_schedule(
    schedule: &[Waypoint],
    pickup_idx: usize,
    dropoff_idx: usize,
    inserted_order_id: usize,
    orders: &[Order],
    vehicle: &Vehicle,
    system_time_ms: u64,
) -> ValidationOutcome {
    let mut load = vehicle.load;
    let mut acc_time_ms = system_time_ms + vehicle.step_to_pos.map(|s| s.duration_ms).unwrap_or(0);

    for (idx, wp) in schedule.iter().enumerate() {
        acc_time_ms += wp.route.duration_ms();

        if idx >= pickup_idx {
            match wp.op {
                WaypointOp::Pickup => {
                    if acc_time_ms > orders[wp.order_id].max_pickup_time_ms {
                        if wp.order_id == inserted_order_id {
                            return ValidationOutcome::Violation(ViolationClass::TerminalForOrder);
                        }
                        if idx <= dropoff_idx {
                            return ValidationOutcome::Violation(ViolationClass::TryLargerDropoff);
                        }
                        return ValidationOutcome::Violation(ViolationClass::TryNextPair);
                    }
                }
                WaypointOp::Dropoff => {
                    if acc_time_ms > orders[wp.order_id].max_dropoff_time_ms {
                        if idx <= dropoff_idx || wp.order_id == inserted_order_id {
                            return ValidationOutcome::Violation(ViolationClass::TryLargerDropoff);
                        }
                        return ValidationOutcome::Violation(ViolationClass::TryNextPair);
                    }
                }
                WaypointOp::Reposition => {
                    let direct_ms = wp.direct_time_from_vehicle_ms.unwrap_or(0);
                    let step_to_pos_ms = vehicle.step_to_pos.map(|s| s.duration_ms).unwrap_or(0);
                    if acc_time_ms > 2 * (direct_ms + step_to_pos_ms) {
                        return ValidationOutcome::Violation(ViolationClass::TryNextPair);
                    }
                }
            }
        }

        match wp.op {
            WaypointOp::Pickup => {
                load += 1;
                if load > vehicle.capacity {
                    return ValidationOutcome::Violation(ViolationClass::TryNextPair);
                }
            }
            WaypointOp::Dropoff => {
                load -= 1;
            }
            WaypointOp::Reposition => {}
        }
    }

    assert_eq!(load, 0, "a fully traversed schedule must end with zero load");
    ValidationOutcome::Ok
}
