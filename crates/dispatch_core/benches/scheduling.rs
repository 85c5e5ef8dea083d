//! Benchmarks for the scheduling kernel's hottest paths: insertion
//! enumeration and OSP trip enumeration, across fleet sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use dispatch_core::model::{DeadlineConstraints, Order, Pos, Request, Vehicle};
use dispatch_core::router::{RouteMode, Router};
use dispatch_core::scheduling::{basic_schedules_for_vehicle, compute_schedule_of_inserting_order, enumerate_trips_for_vehicle, TripEnumerationConfig};

struct LineRouter;

impl Router for LineRouter {
    fn route(&self, origin: Pos, destination: Pos, _mode: RouteMode) -> Option<dispatch_core::model::Route> {
        let delta = (origin.node_id as i64 - destination.node_id as i64).unsigned_abs();
        Some(dispatch_core::model::Route::single_leg(
            origin,
            destination,
            delta * 1_000,
            delta * 100,
        ))
    }

    fn node_pos(&self, node_id: u64) -> Option<Pos> {
        Some(Pos::new(node_id, 0.0, 0.0))
    }

    fn vehicle_station_id(&self, index: usize) -> u64 {
        index as u64
    }

    fn num_vehicle_stations(&self) -> usize {
        1_000
    }
}

fn make_order(id: usize, origin: u64, dest: u64) -> Order {
    Order::new(
        id,
        &Request {
            origin: Pos::new(origin, 0.0, 0.0),
            destination: Pos::new(dest, 0.0, 0.0),
            request_time_ms: 0,
            wall_clock: None,
        },
        (dest as i64 - origin as i64).unsigned_abs() * 100,
        DeadlineConstraints {
            max_wait_ms: 3_600_000,
            max_detour: 10.0,
        },
    )
}

fn bench_insertion_enumeration(c: &mut Criterion) {
    let router = LineRouter;
    let vehicle = Vehicle::new(0, Pos::new(500, 0.0, 0.0), 4);
    let basic_schedules = vec![vehicle.schedule.clone()];

    let mut group = c.benchmark_group("insertion_enumeration");
    for order_count in [1usize, 10, 50] {
        let orders: Vec<Order> = (0..order_count).map(|i| make_order(i, 500 + i as u64, 600 + i as u64)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(order_count), &order_count, |b, _| {
            b.iter(|| {
                for order in &orders {
                    black_box(compute_schedule_of_inserting_order(
                        order,
                        &orders,
                        &vehicle,
                        &basic_schedules,
                        0,
                        &router,
                    ));
                }
            });
        });
    }
    group.finish();
}

fn bench_trip_enumeration(c: &mut Criterion) {
    let router = LineRouter;
    let vehicle = Vehicle::new(0, Pos::new(500, 0.0, 0.0), 4);

    let mut group = c.benchmark_group("trip_enumeration");
    for order_count in [2usize, 4, 8] {
        let orders: Vec<Order> = (0..order_count).map(|i| make_order(i, 500 + i as u64, 600 + i as u64)).collect();
        let order_ids: Vec<usize> = (0..order_count).collect();
        let basic_schedules = basic_schedules_for_vehicle(&vehicle, true, &router);
        group.bench_with_input(BenchmarkId::from_parameter(order_count), &order_count, |b, _| {
            b.iter(|| {
                black_box(enumerate_trips_for_vehicle(
                    &vehicle,
                    &order_ids,
                    &orders,
                    &basic_schedules,
                    0,
                    &router,
                    TripEnumerationConfig::default(),
                ));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insertion_enumeration, bench_trip_enumeration);
criterion_main!(benches);
