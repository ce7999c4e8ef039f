// benches/bench_record_arrival.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use signal_grid::config::ArrivalPolicy;
use signal_grid::models::intersection::Intersection;
use signal_grid::simulation_engine::arrival_simulator::ArrivalSimulator;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn bench_record_arrival(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_arrival");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("single_writer", |b| {
        let intersection = Intersection::new("I1", "Main St");
        b.iter(|| black_box(intersection.record_arrival()));
    });

    // Contended counter: several threads hammering the same intersection.
    for &threads in [2usize, 4, 8].iter() {
        group.bench_function(format!("threads_{}", threads), |b| {
            b.iter(|| {
                let intersection = Arc::new(Intersection::new("I1", "Main St"));
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let intersection = Arc::clone(&intersection);
                        thread::spawn(move || {
                            for _ in 0..1_000 {
                                intersection.record_arrival();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
                black_box(intersection.vehicle_count());
            });
        });
    }

    group.bench_function("simulate_arrival", |b| {
        let intersection = Arc::new(Intersection::new("I1", "Main St"));
        let mut simulator = ArrivalSimulator::seeded(intersection, ArrivalPolicy::default(), 1);
        b.iter(|| black_box(simulator.simulate_arrival()));
    });

    group.finish();
}

criterion_group!(benches, bench_record_arrival);
criterion_main!(benches);
