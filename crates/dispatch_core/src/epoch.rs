//! The epoch loop (§2): advance -> ingest -> assign -> rebalance -> log,
//! repeated every Δ. This module owns no state across epochs; the caller
//! (`dispatch_runner`) keeps the orders table and vehicle list and drives
//! `run_epoch` in a loop.

use crate::advance::advance_vehicle;
use crate::assign::{run_gi, run_osp, run_sba, AssignmentSolver};
use crate::model::{DeadlineConstraints, Order, OrderStatus, Request, Vehicle};
use crate::rebalance::Rebalancer;
use crate::router::{RouteMode, Router};
use crate::scheduling::TripEnumerationConfig;

/// Given a target epoch timestamp, return the requests that materialise at
/// or before it. A pure query, like [`Router`] (§6).
pub trait DemandGenerator: Send + Sync {
    fn generate(&self, target_system_time_ms: u64) -> Vec<Request>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStrategy {
    GreedyInsertion,
    SingleRequestBatch,
    OptimalSchedulePool,
}

#[derive(Debug, Clone, Copy)]
pub struct EpochConfig {
    pub delta_ms: u64,
    pub strategy: DispatchStrategy,
    pub constraints: DeadlineConstraints,
    pub trip_enumeration: TripEnumerationConfig,
    pub debug: bool,
}

impl Default for EpochConfig {
    fn default() -> Self {
        Self {
            delta_ms: 30_000,
            strategy: DispatchStrategy::OptimalSchedulePool,
            constraints: DeadlineConstraints::default(),
            trip_enumeration: TripEnumerationConfig::default(),
            debug: false,
        }
    }
}

/// What happened during one `run_epoch` call, for the caller's datalog
/// emitter and final statistics report.
#[derive(Debug, Clone, Default)]
pub struct EpochSummary {
    pub system_time_ms: u64,
    pub picked_ids: Vec<usize>,
    pub dropped_ids: Vec<usize>,
    pub walkaway_ids: Vec<usize>,
    pub new_order_ids: Vec<usize>,
}

/// Run one epoch of length `config.delta_ms` starting at `system_time_ms`.
/// Returns the new system time (`system_time_ms + delta_ms`) inside the
/// summary.
#[allow(clippy::too_many_arguments)]
pub fn run_epoch(
    system_time_ms: u64,
    vehicles: &mut [Vehicle],
    orders: &mut Vec<Order>,
    demand_gen: &dyn DemandGenerator,
    router: &dyn Router,
    rebalancer: &dyn Rebalancer,
    solver: &dyn AssignmentSolver,
    config: &EpochConfig,
) -> EpochSummary {
    let mut picked_ids = Vec::new();
    let mut dropped_ids = Vec::new();
    for vehicle in vehicles.iter_mut() {
        vehicle.schedule_updated_this_epoch = false;
        let report = advance_vehicle(vehicle, orders, system_time_ms, config.delta_ms, config.debug);
        picked_ids.extend(report.picked_ids);
        dropped_ids.extend(report.dropped_ids);
    }
    let next_system_time_ms = system_time_ms + config.delta_ms;

    let mut walkaway_ids = Vec::new();
    for order in orders.iter_mut() {
        if order.should_walk_away(next_system_time_ms) {
            order.status = OrderStatus::Walkaway;
            walkaway_ids.push(order.id);
        }
    }

    let requests = demand_gen.generate(next_system_time_ms);
    let mut new_order_ids = Vec::with_capacity(requests.len());
    for request in requests {
        let id = orders.len();
        let shortest_travel_time_ms = router
            .route(request.origin, request.destination, RouteMode::TimeOnly)
            .map(|r| r.duration_ms())
            .unwrap_or(0);
        orders.push(Order::new(id, &request, shortest_travel_time_ms, config.constraints));
        new_order_ids.push(id);
    }

    match config.strategy {
        DispatchStrategy::GreedyInsertion => {
            run_gi(&new_order_ids, orders, vehicles, next_system_time_ms, router);
        }
        DispatchStrategy::SingleRequestBatch => {
            run_sba(&new_order_ids, orders, vehicles, next_system_time_ms, router, solver);
        }
        DispatchStrategy::OptimalSchedulePool => {
            let considered: Vec<usize> = orders
                .iter()
                .filter(|o| matches!(o.status, OrderStatus::Picking | OrderStatus::Pending))
                .map(|o| o.id)
                .collect();
            run_osp(
                &considered,
                orders,
                vehicles,
                next_system_time_ms,
                router,
                solver,
                config.trip_enumeration,
            );
        }
    }

    rebalancer.rebalance(vehicles, orders, router, next_system_time_ms);

    for vehicle in vehicles.iter() {
        vehicle.assert_invariants(orders);
    }
    if config.debug {
        eprintln!(
            "epoch t={next_system_time_ms}: {} new, {} picked, {} dropped, {} walkaway",
            new_order_ids.len(),
            picked_ids.len(),
            dropped_ids.len(),
            walkaway_ids.len()
        );
    }

    EpochSummary {
        system_time_ms: next_system_time_ms,
        picked_ids,
        dropped_ids,
        walkaway_ids,
        new_order_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::GreedySolver;
    use crate::model::Pos;
    use crate::rebalance::NullRebalancer;
    use crate::test_helpers::GridRouter;

    struct NoDemand;
    impl DemandGenerator for NoDemand {
        fn generate(&self, _target_system_time_ms: u64) -> Vec<Request> {
            Vec::new()
        }
    }

    struct OneShotDemand {
        request: std::cell::RefCell<Option<Request>>,
    }
    impl DemandGenerator for OneShotDemand {
        fn generate(&self, _target_system_time_ms: u64) -> Vec<Request> {
            self.request.borrow_mut().take().into_iter().collect()
        }
    }

    #[test]
    fn empty_advance_with_no_demand_is_a_no_op() {
        let router = GridRouter::new();
        let rebalancer = NullRebalancer;
        let solver = GreedySolver;
        let demand = NoDemand;
        let mut vehicles = vec![Vehicle::new(0, Pos::new(1, 0.0, 0.0), 2)];
        let mut orders = Vec::new();
        let config = EpochConfig::default();

        let summary = run_epoch(0, &mut vehicles, &mut orders, &demand, &router, &rebalancer, &solver, &config);

        assert_eq!(summary.system_time_ms, config.delta_ms);
        assert!(summary.new_order_ids.is_empty());
        assert!(orders.is_empty());
    }

    #[test]
    fn single_idle_vehicle_picks_single_request_via_osp() {
        let router = GridRouter::new();
        let rebalancer = NullRebalancer;
        let solver = GreedySolver;
        let demand = OneShotDemand {
            request: std::cell::RefCell::new(Some(Request {
                origin: Pos::new(1, 0.0, 0.0),
                destination: Pos::new(2, 0.0, 0.0),
                request_time_ms: 0,
                wall_clock: None,
            })),
        };
        let mut vehicles = vec![Vehicle::new(0, Pos::new(1, 0.0, 0.0), 1)];
        let mut orders = Vec::new();
        let config = EpochConfig::default();

        let summary = run_epoch(0, &mut vehicles, &mut orders, &demand, &router, &rebalancer, &solver, &config);

        assert_eq!(summary.new_order_ids, vec![0]);
        assert_eq!(orders[0].status, OrderStatus::Picking);
        assert_eq!(vehicles[0].schedule.len(), 2);
    }
}
