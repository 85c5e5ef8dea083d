//! Pluggable idle-vehicle rebalancing: the seam the epoch loop calls into
//! after assignment (§2 step 4). Policy design (`NR`/`RVS`/`NPO`) is out of
//! the core's scope; only the trait and a no-op implementation ship here,
//! following the same `Box<dyn Trait>`-as-resource pattern used for the
//! other injected collaborators.

use crate::model::{Order, Vehicle};
use crate::router::Router;

pub trait Rebalancer: Send + Sync {
    fn rebalance(
        &self,
        vehicles: &mut [Vehicle],
        orders: &[Order],
        router: &dyn Router,
        system_time_ms: u64,
    );
}

/// `dispatch.rebalancer = NONE`: idle vehicles stay put.
#[derive(Debug, Default)]
pub struct NullRebalancer;

impl Rebalancer for NullRebalancer {
    fn rebalance(
        &self,
        _vehicles: &mut [Vehicle],
        _orders: &[Order],
        _router: &dyn Router,
        _system_time_ms: u64,
    ) {
    }
}
