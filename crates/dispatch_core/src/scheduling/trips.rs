//! Trip enumeration for OSP (§4.7): grow feasible (vehicle, trip) pairs from
//! size 1 upward, pruning by join/combine and a per-vehicle wall-clock
//! budget.

use std::collections::HashSet;
use std::time::Instant;

use crate::model::{Order, Vehicle, Waypoint};
use crate::router::Router;

use super::insertion::{compute_schedule_of_inserting_order, passes_quick_filter, SchedulingResult};

#[derive(Debug, Clone, Copy)]
pub struct TripEnumerationConfig {
    pub time_budget_ms: u64,
}

impl Default for TripEnumerationConfig {
    fn default() -> Self {
        Self { time_budget_ms: 1_000 }
    }
}

/// A feasible (vehicle, trip) pair: `result.trip_ids` gives the order ids,
/// `result` carries the feasible schedules and their cost/score.
#[derive(Debug, Clone)]
pub struct TripPair {
    pub trip_ids: Vec<usize>,
    pub result: SchedulingResult,
}

/// Enumerate all feasible trips (of every size) for one vehicle out of
/// `considered_order_ids`, starting from `basic_schedules` (§4.6).
pub fn enumerate_trips_for_vehicle(
    vehicle: &Vehicle,
    considered_order_ids: &[usize],
    orders: &[Order],
    basic_schedules: &[Vec<Waypoint>],
    system_time_ms: u64,
    router: &dyn Router,
    config: TripEnumerationConfig,
) -> Vec<TripPair> {
    let start = Instant::now();
    let elapsed_ms = || start.elapsed().as_millis() as u64;

    let mut all_pairs: Vec<TripPair> = Vec::new();
    let mut current_level: Vec<TripPair> = Vec::new();

    for &order_id in considered_order_ids {
        if elapsed_ms() >= config.time_budget_ms {
            break;
        }
        if !passes_quick_filter(&orders[order_id], vehicle, system_time_ms, router) {
            continue;
        }
        let result =
            compute_schedule_of_inserting_order(&orders[order_id], orders, vehicle, basic_schedules, system_time_ms, router);
        if result.success {
            current_level.push(TripPair {
                trip_ids: vec![order_id],
                result,
            });
        }
    }
    all_pairs.extend(current_level.iter().cloned());

    let mut k = 1usize;
    while !current_level.is_empty() && elapsed_ms() < config.time_budget_ms {
        k += 1;
        let known_trips: HashSet<Vec<usize>> = current_level.iter().map(|p| p.trip_ids.clone()).collect();
        let mut seen_this_size: HashSet<Vec<usize>> = HashSet::new();
        let mut next_level: Vec<TripPair> = Vec::new();
        let inner_cutoff_ms = config.time_budget_ms / 10;

        'outer: for i in 0..current_level.len() {
            if elapsed_ms() >= config.time_budget_ms {
                break 'outer;
            }
            for j in (i + 1)..current_level.len() {
                if elapsed_ms() >= inner_cutoff_ms {
                    break;
                }
                let trip = union_sorted(&current_level[i].trip_ids, &current_level[j].trip_ids);
                if trip.len() != k || seen_this_size.contains(&trip) {
                    continue;
                }
                if !all_subtrips_present(&trip, &known_trips) {
                    continue;
                }
                seen_this_size.insert(trip.clone());

                let d_order_id = match trip.iter().find(|id| !current_level[i].trip_ids.contains(id)) {
                    Some(&id) => id,
                    None => continue,
                };
                let sub_schedules = &current_level[i].result.feasible_schedules;
                let result = compute_schedule_of_inserting_order(
                    &orders[d_order_id],
                    orders,
                    vehicle,
                    sub_schedules,
                    system_time_ms,
                    router,
                );
                if result.success {
                    next_level.push(TripPair { trip_ids: trip, result });
                }
            }
        }

        if next_level.is_empty() {
            break;
        }
        all_pairs.extend(next_level.iter().cloned());
        current_level = next_level;
    }

    all_pairs
}

fn union_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut trip: Vec<usize> = a.iter().chain(b.iter()).copied().collect();
    trip.sort_unstable();
    trip.dedup();
    trip
}

/// All `k` size-(k-1) sub-trips of `trip` (each obtained by removing one
/// element) must already be present in `known_trips`.
fn all_subtrips_present(trip: &[usize], known_trips: &HashSet<Vec<usize>>) -> bool {
    for skip in 0..trip.len() {
        let sub: Vec<usize> = trip
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != skip)
            .map(|(_, &id)| id)
            .collect();
        if !known_trips.contains(&sub) {
            return false;
        }
    }
    true
}
