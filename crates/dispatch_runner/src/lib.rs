//! Scenario construction and execution glue around `dispatch_core`: config
//! loading, a toy grid router and demand generator, and the datalog writer.
//! Not part of the dispatcher core itself, this crate exists so the CLI
//! and integration tests have something concrete to drive.

pub mod config;
pub mod datalog;
pub mod demand;
pub mod grid_router;

use std::io::Write;

use dispatch_core::assign::{AssignmentSolver, GreedySolver};
use dispatch_core::epoch::{run_epoch, EpochConfig, EpochSummary};
use dispatch_core::model::{Pos, Vehicle};
use dispatch_core::rebalance::{NullRebalancer, Rebalancer};
use dispatch_core::router::Router;

use config::SimConfig;
use demand::PoissonDemandGenerator;
use grid_router::GridRouter;

/// A fully wired scenario: config plus the collaborators the core needs.
/// Plays the same role as a world-populate step, adapted from populating an
/// ECS world to building the plain `Vec`s `dispatch_core::epoch::run_epoch`
/// owns directly.
pub struct Scenario {
    pub config: SimConfig,
    pub router: GridRouter,
    pub demand_gen: PoissonDemandGenerator,
    pub rebalancer: Box<dyn Rebalancer>,
    pub solver: Box<dyn AssignmentSolver>,
    pub vehicles: Vec<Vehicle>,
}

/// Build a scenario from `config`: vehicles start parked at the grid's
/// vehicle stations (`Router::vehicle_station_id`), one per fleet slot,
/// wrapping around if `fleet.size` exceeds the number of stations.
pub fn build_scenario(config: SimConfig, grid_side: usize, demand_rate_per_ms: f64, seed: u64) -> Scenario {
    let router = GridRouter::new(grid_side, 1_000, 10.0);
    let num_stations = router.num_vehicle_stations();
    let vehicles = (0..config.fleet.size)
        .map(|i| {
            let station_id = router.vehicle_station_id(i % num_stations);
            let pos = router.node_pos(station_id).unwrap_or(Pos::new(station_id, 0.0, 0.0));
            Vehicle::new(i, pos, config.fleet.capacity)
        })
        .collect();

    let demand_gen = PoissonDemandGenerator::new(demand_rate_per_ms, num_stations as u64, seed);

    Scenario {
        config,
        router,
        demand_gen,
        rebalancer: Box::new(NullRebalancer),
        solver: Box::new(GreedySolver),
        vehicles,
    }
}

/// Run `scenario` to completion (§6's warmup/main/winddown phase lengths),
/// writing one JSON Lines record per epoch to `datalog_writer`. Returns the
/// final epoch summaries in order. The loop runs a fixed number of epochs
/// rather than running until an event queue drains, since §6's config
/// specifies phase lengths rather than an end condition.
pub fn run(scenario: &mut Scenario, mut datalog_writer: Option<&mut dyn Write>) -> Result<Vec<EpochSummary>, String> {
    let mut orders = Vec::new();
    let epoch_config = EpochConfig {
        delta_ms: scenario.config.sim.delta_ms(),
        strategy: scenario.config.dispatch.dispatcher.into(),
        constraints: scenario.config.request.constraints(),
        trip_enumeration: Default::default(),
        debug: false,
    };

    let total_epochs = scenario.config.sim.total_epochs();
    let mut summaries = Vec::with_capacity(total_epochs as usize);
    let mut system_time_ms = 0u64;

    for _ in 0..total_epochs {
        let summary = run_epoch(
            system_time_ms,
            &mut scenario.vehicles,
            &mut orders,
            &scenario.demand_gen,
            &scenario.router,
            scenario.rebalancer.as_ref(),
            scenario.solver.as_ref(),
            &epoch_config,
        );
        system_time_ms = summary.system_time_ms;

        if let Some(writer) = datalog_writer.as_deref_mut() {
            datalog::append_epoch(writer, system_time_ms, &scenario.vehicles, &orders)?;
        }

        summaries.push(summary);
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{FleetConfig, SimTimingConfig};

    #[test]
    fn a_short_scenario_runs_without_panicking() {
        let config = SimConfig::default()
            .with_fleet(FleetConfig { size: 3, capacity: 2 })
            .with_sim(SimTimingConfig {
                start_time: "00:00:00".to_string(),
                cycle_s: 30,
                warmup_min: 0,
                main_min: 2,
                winddown_min: 0,
            });
        let mut scenario = build_scenario(config, 4, 0.01, 1);

        let summaries = run(&mut scenario, None).expect("scenario should run");

        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries.last().unwrap().system_time_ms, 120_000);
    }

    #[test]
    fn datalog_writer_receives_one_line_per_epoch() {
        let config = SimConfig::default()
            .with_fleet(FleetConfig { size: 2, capacity: 1 })
            .with_sim(SimTimingConfig {
                start_time: "00:00:00".to_string(),
                cycle_s: 60,
                warmup_min: 0,
                main_min: 3,
                winddown_min: 0,
            });
        let mut scenario = build_scenario(config, 3, 0.0, 2);
        let mut buf: Vec<u8> = Vec::new();

        run(&mut scenario, Some(&mut buf)).expect("scenario should run");

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
