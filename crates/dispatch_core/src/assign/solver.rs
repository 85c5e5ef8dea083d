//! ILP assignment (§4.10): select a subset of (vehicle, trip) pairs such
//! that each vehicle and each considered order appears at most once.

use std::collections::HashSet;

use crate::model::Waypoint;

/// The ILP atom: a candidate `(vehicle, trip)` combined with its best
/// schedule, cost and score.
#[derive(Debug, Clone)]
pub struct Pair {
    pub vehicle_id: usize,
    /// Sorted, deduplicated order ids this pair proposes to serve. Empty for
    /// the per-vehicle "keep current schedule" pair.
    pub trip_ids: Vec<usize>,
    pub schedule: Vec<Waypoint>,
    pub cost_ms: u64,
    pub score: f64,
}

/// Sort pairs for stable ordering ahead of solving (§4.10): primarily by
/// vehicle id, secondarily by decreasing trip size, ties broken by
/// ascending cost. Fixes the ILP's variable order and the greedy fallback's
/// iteration order so identical inputs reproduce identical outputs.
pub fn sort_pairs_for_ilp(pairs: &mut [Pair]) {
    pairs.sort_by(|a, b| {
        a.vehicle_id
            .cmp(&b.vehicle_id)
            .then(b.trip_ids.len().cmp(&a.trip_ids.len()))
            .then(a.cost_ms.cmp(&b.cost_ms))
    });
}

/// Selects a conflict-free subset of `pairs`: one per vehicle, each
/// considered order served at most once. Orders in `must_assign_order_ids`
/// should end up served by the chosen pairs whenever at all possible
/// (`y_r == 0` in the ILP, §4.10 constraint 3).
pub trait AssignmentSolver {
    /// Returns the indices into `pairs` that were selected.
    fn solve(&self, pairs: &[Pair], considered_order_ids: &[usize], must_assign_order_ids: &[usize]) -> Vec<usize>;
}

/// Always-available fallback: pick pairs in decreasing score, skipping any
/// whose vehicle or order has already been claimed. Used both as the
/// default solver and as the recovery path when the ILP solver fails (§7).
#[derive(Debug, Default)]
pub struct GreedySolver;

impl AssignmentSolver for GreedySolver {
    fn solve(&self, pairs: &[Pair], _considered_order_ids: &[usize], _must_assign_order_ids: &[usize]) -> Vec<usize> {
        let mut order_indices: Vec<usize> = (0..pairs.len()).collect();
        order_indices.sort_by(|&a, &b| {
            pairs[b]
                .score
                .partial_cmp(&pairs[a].score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut claimed_vehicles: HashSet<usize> = HashSet::new();
        let mut claimed_orders: HashSet<usize> = HashSet::new();
        let mut selected = Vec::new();

        for idx in order_indices {
            let pair = &pairs[idx];
            if claimed_vehicles.contains(&pair.vehicle_id) {
                continue;
            }
            if pair.trip_ids.iter().any(|id| claimed_orders.contains(id)) {
                continue;
            }
            claimed_vehicles.insert(pair.vehicle_id);
            claimed_orders.extend(pair.trip_ids.iter().copied());
            selected.push(idx);
        }

        selected
    }
}

#[cfg(feature = "ilp")]
pub use ilp::IlpSolver;

#[cfg(feature = "ilp")]
mod ilp {
    use super::{AssignmentSolver, GreedySolver, Pair};
    use good_lp::{constraint, variable, variables, Expression, ProblemVariables, Solution, SolverModel, Variable};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// 0/1-ILP set-partitioning solve via `good_lp`'s `coin_cbc` backend,
    /// falling back to [`GreedySolver`] on any solver failure (§7: "ILP
    /// solver failure -> fall back to greedy assignment; log once"). The
    /// "once" is tracked per `IlpSolver` instance, not a process-wide flag,
    /// so two solvers (e.g. in tests) don't silence each other.
    #[derive(Debug, Default)]
    pub struct IlpSolver {
        solver_failure_logged: AtomicBool,
    }

    impl IlpSolver {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl AssignmentSolver for IlpSolver {
        fn solve(&self, pairs: &[Pair], considered_order_ids: &[usize], must_assign_order_ids: &[usize]) -> Vec<usize> {
            match try_solve(pairs, considered_order_ids, must_assign_order_ids) {
                Ok(selected) => selected,
                Err(_) => {
                    if !self.solver_failure_logged.swap(true, Ordering::Relaxed) {
                        eprintln!("dispatch_core: ilp solve failed, falling back to greedy assignment (further failures this run are silenced)");
                    }
                    GreedySolver.solve(pairs, considered_order_ids, must_assign_order_ids)
                }
            }
        }
    }

    fn try_solve(
        pairs: &[Pair],
        considered_order_ids: &[usize],
        must_assign_order_ids: &[usize],
    ) -> Result<Vec<usize>, String> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let mut vars = variables!();
        let x: Vec<Variable> = (0..pairs.len()).map(|_| vars.add(variable().binary())).collect();

        let must_assign: HashSet<usize> = must_assign_order_ids.iter().copied().collect();
        let mut y: HashMap<usize, Variable> = HashMap::new();
        for &order_id in considered_order_ids {
            if !must_assign.contains(&order_id) {
                y.insert(order_id, vars.add(variable().binary()));
            }
        }

        let objective: Expression = pairs
            .iter()
            .enumerate()
            .map(|(i, p)| x[i] * p.score)
            .sum();

        let mut model = vars.maximise(objective).using(good_lp::default_solver);

        let mut by_vehicle: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, p) in pairs.iter().enumerate() {
            by_vehicle.entry(p.vehicle_id).or_default().push(i);
        }
        for (_vehicle_id, idxs) in &by_vehicle {
            let sum: Expression = idxs.iter().map(|&i| x[i]).sum();
            model = model.with(constraint!(sum == 1));
        }

        let mut by_order: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, p) in pairs.iter().enumerate() {
            for &order_id in &p.trip_ids {
                by_order.entry(order_id).or_default().push(i);
            }
        }
        for &order_id in considered_order_ids {
            let idxs = by_order.get(&order_id).cloned().unwrap_or_default();
            let sum: Expression = idxs.iter().map(|&i| x[i]).sum();
            match y.get(&order_id) {
                Some(&y_r) => model = model.with(constraint!(sum + y_r == 1)),
                None => model = model.with(constraint!(sum == 1)),
            }
        }

        let solution = model.solve().map_err(|e| e.to_string())?;

        Ok((0..pairs.len())
            .filter(|&i| solution.value(x[i]) > 0.5)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(vehicle_id: usize, trip_ids: &[usize], score: f64) -> Pair {
        Pair {
            vehicle_id,
            trip_ids: trip_ids.to_vec(),
            schedule: Vec::new(),
            cost_ms: 0,
            score,
        }
    }

    #[test]
    fn greedy_prefers_higher_score_and_respects_conflicts() {
        let pairs = vec![
            pair(0, &[0], 10.0),
            pair(0, &[1], 5.0),
            pair(1, &[0], 1.0),
        ];
        let selected = GreedySolver.solve(&pairs, &[0, 1], &[]);
        assert_eq!(selected, vec![0]);
    }

    #[test]
    fn greedy_can_select_disjoint_pairs() {
        let pairs = vec![pair(0, &[0], 10.0), pair(1, &[1], 9.0)];
        let mut selected = GreedySolver.solve(&pairs, &[0, 1], &[]);
        selected.sort_unstable();
        assert_eq!(selected, vec![0, 1]);
    }

    #[test]
    fn sort_pairs_for_ilp_orders_by_vehicle_then_trip_size_then_cost() {
        let mut pairs = vec![
            pair(1, &[0], 1.0),
            pair(0, &[0, 1], 1.0),
            pair(0, &[0], 1.0),
        ];
        pairs[2].cost_ms = 5;
        sort_pairs_for_ilp(&mut pairs);
        assert_eq!(pairs[0].vehicle_id, 0);
        assert_eq!(pairs[0].trip_ids.len(), 2);
        assert_eq!(pairs[1].vehicle_id, 0);
        assert_eq!(pairs[1].trip_ids.len(), 1);
        assert_eq!(pairs[2].vehicle_id, 1);
    }
}
