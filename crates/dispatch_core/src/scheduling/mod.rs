//! Scheduling kernel: validate candidate schedules, enumerate feasible
//! insertions, and score them by cost. Shared by all three assignment
//! strategies (§1).

pub mod cost;
pub mod validate;
pub mod insertion;
pub mod basic;
pub mod trips;

pub use basic::basic_schedules_for_vehicle;
pub use cost::schedule_cost_ms;
pub use insertion::{compute_schedule_of_inserting_order, passes_quick_filter, SchedulingResult};
pub use trips::{enumerate_trips_for_vehicle, TripEnumerationConfig, TripPair};
pub use validate::{validate_schedule, ValidationOutcome, ViolationClass};
