use signal_grid::config::SimulationConfig;
use signal_grid::models::signal::{Direction, SignalPhase};
use signal_grid::persistence::csv_store;
use signal_grid::{IntersectionRegistry, TrafficError};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio::time::sleep;

fn assert_well_formed(registry: &IntersectionRegistry) {
    for snapshot in registry.snapshots() {
        assert_eq!(snapshot.signals.len(), 4);
        let directions: Vec<_> = snapshot.signals.iter().map(|s| s.direction).collect();
        assert_eq!(directions, Direction::ALL.to_vec());
        for signal in &snapshot.signals {
            assert_eq!(signal.duration, signal.phase.default_duration());
        }
        let ns = snapshot.phase_of(Direction::North).unwrap();
        let ew = snapshot.phase_of(Direction::East).unwrap();
        assert!(!(ns.is_permissive() && ew.is_permissive()));
    }
}

#[test]
fn duplicate_add_keeps_single_intersection() {
    let registry = IntersectionRegistry::default();
    registry.add("I1", "Main St").unwrap();
    assert!(matches!(
        registry.add("I1", "Main St"),
        Err(TrafficError::DuplicateIntersection(_))
    ));
    let report = registry.report();
    assert_eq!(report.intersection_count, 1);
    assert_eq!(report.intersections[0].id, "I1");
}

#[tokio::test(start_paused = true)]
async fn sixty_five_seconds_of_operation() {
    let registry = IntersectionRegistry::default();
    registry.add("I1", "Main St").unwrap();
    registry.start("I1").unwrap();

    sleep(Duration::from_millis(57_500)).await;
    let snapshot = registry.snapshot("I1").unwrap();
    assert_eq!(snapshot.phase_of(Direction::East), Some(SignalPhase::Yellow));
    assert_eq!(snapshot.phase_of(Direction::North), Some(SignalPhase::Red));

    sleep(Duration::from_millis(7_500)).await;
    assert!(registry.stop("I1"));
    let snapshot = registry.snapshot("I1").unwrap();
    // Second cycle has begun.
    assert_eq!(snapshot.phase_of(Direction::North), Some(SignalPhase::Green));
    assert!(snapshot.vehicle_count >= 1);
    assert!(snapshot.vehicle_count <= 33, "got {}", snapshot.vehicle_count);

    assert_eq!(registry.shutdown(Duration::from_secs(2)).await, 0);
    let frozen = registry.snapshot("I1").unwrap().vehicle_count;
    sleep(Duration::from_secs(30)).await;
    assert_eq!(registry.snapshot("I1").unwrap().vehicle_count, frozen);
}

#[tokio::test(start_paused = true)]
async fn many_intersections_stay_well_formed() {
    let registry = IntersectionRegistry::default();
    for n in 0..5 {
        registry.add(&format!("I{}", n), "Grid").unwrap();
        registry.start(&format!("I{}", n)).unwrap();
    }
    for _ in 0..130 {
        sleep(Duration::from_millis(500)).await;
        assert_well_formed(&registry);
    }
    assert_eq!(registry.running_count(), 5);
    assert_eq!(registry.shutdown(Duration::from_secs(2)).await, 0);
    assert_eq!(registry.running_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_arrivals_are_counted_exactly() {
    let registry = IntersectionRegistry::default();
    registry.add("I1", "Main St").unwrap();
    let intersection = registry.get("I1").unwrap();
    let tasks: Vec<_> = (0..500)
        .map(|_| {
            let intersection = Arc::clone(&intersection);
            tokio::spawn(async move {
                intersection.record_arrival();
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(registry.snapshot("I1").unwrap().vehicle_count, 500);
}

#[tokio::test(start_paused = true)]
async fn save_then_load_restores_intersections() {
    let dir = tempdir().unwrap();
    let config = SimulationConfig {
        data_dir: dir.path().to_path_buf(),
        ..SimulationConfig::default()
    };

    let registry = IntersectionRegistry::from_config(&config);
    registry.add("I2", "Elm St").unwrap();
    registry.add("I1", "Main St").unwrap();
    registry.start("I1").unwrap();
    sleep(Duration::from_secs(27)).await;
    registry.shutdown(config.shutdown_grace).await;
    csv_store::save(&registry, &config).unwrap();
    let before = registry.report();

    let restored = IntersectionRegistry::from_config(&config);
    assert_eq!(csv_store::load(&restored, &config).unwrap(), 2);
    let after = restored.report();
    assert_eq!(after.total_vehicles, before.total_vehicles);
    for (a, b) in after.intersections.iter().zip(&before.intersections) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.location, b.location);
        assert_eq!(a.vehicle_count, b.vehicle_count);
        // Signals are not restored.
        assert!(a.signals.iter().all(|s| s.phase == SignalPhase::Red));
    }
}
