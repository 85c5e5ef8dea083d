//! A toy demand generator (§6 `demand_gen`): Poisson-ish arrivals of
//! origin/destination pairs drawn uniformly from a node range. Arrival state
//! (next spawn time) is tracked across calls, but the `DemandGenerator`
//! trait takes `&self`, so the mutable bookkeeping sits behind
//! `RefCell`/`Cell` the same way `epoch`'s `OneShotDemand` test double does.

use std::cell::{Cell, RefCell};

use dispatch_core::epoch::DemandGenerator;
use dispatch_core::model::{Pos, Request};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct PoissonDemandGenerator {
    rate_per_ms: f64,
    num_nodes: u64,
    rng: RefCell<StdRng>,
    last_called_ms: Cell<u64>,
}

impl PoissonDemandGenerator {
    pub fn new(rate_per_ms: f64, num_nodes: u64, seed: u64) -> Self {
        assert!(num_nodes >= 2, "demand generator needs at least two nodes");
        Self {
            rate_per_ms,
            num_nodes,
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
            last_called_ms: Cell::new(0),
        }
    }

    fn sample_pair(&self, rng: &mut StdRng) -> (u64, u64) {
        let origin = rng.gen_range(0..self.num_nodes);
        let mut destination = rng.gen_range(0..self.num_nodes);
        while destination == origin {
            destination = rng.gen_range(0..self.num_nodes);
        }
        (origin, destination)
    }
}

impl DemandGenerator for PoissonDemandGenerator {
    fn generate(&self, target_system_time_ms: u64) -> Vec<Request> {
        let from_ms = self.last_called_ms.get();
        self.last_called_ms.set(target_system_time_ms);
        if target_system_time_ms <= from_ms {
            return Vec::new();
        }

        let mut rng = self.rng.borrow_mut();
        let window_ms = (target_system_time_ms - from_ms) as f64;
        let expected = self.rate_per_ms * window_ms;
        let mut count = expected.floor() as u64;
        if rng.gen::<f64>() < expected.fract() {
            count += 1;
        }

        (0..count)
            .map(|_| {
                let (origin, destination) = self.sample_pair(&mut rng);
                Request {
                    origin: Pos::new(origin, 0.0, 0.0),
                    destination: Pos::new(destination, 0.0, 0.0),
                    request_time_ms: rng.gen_range(from_ms..target_system_time_ms),
                    wall_clock: None,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_requests_before_the_first_window_elapses() {
        let gen = PoissonDemandGenerator::new(0.01, 10, 1);
        let requests = gen.generate(0);
        assert!(requests.is_empty());
    }

    #[test]
    fn origin_and_destination_are_always_distinct() {
        let gen = PoissonDemandGenerator::new(1.0, 4, 7);
        let requests = gen.generate(1_000);
        for request in &requests {
            assert_ne!(request.origin.node_id, request.destination.node_id);
        }
    }

    #[test]
    fn repeated_calls_only_cover_the_new_window() {
        let gen = PoissonDemandGenerator::new(0.5, 8, 42);
        let first = gen.generate(10_000);
        let second = gen.generate(10_000);
        assert!(!first.is_empty() || second.is_empty());
        assert!(second.is_empty(), "calling generate twice for the same timestamp yields nothing new");
    }
}
