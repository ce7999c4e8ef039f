use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::time::Duration;

use crate::config::ArrivalPolicy;
use crate::control_system::shutdown::ShutdownListener;
use crate::models::intersection::Intersection;
use crate::models::vehicle::{Vehicle, VehicleKind};

/// Generates vehicle arrivals at one intersection at random intervals.
pub struct ArrivalSimulator {
    intersection: Arc<Intersection>,
    policy: ArrivalPolicy,
    rng: SmallRng,
    next_sequence: u64,
}

impl ArrivalSimulator {
    pub fn new(intersection: Arc<Intersection>, policy: ArrivalPolicy) -> Self {
        let rng = SmallRng::from_rng(&mut rand::rng());
        Self::with_rng(intersection, policy, rng)
    }

    pub fn seeded(intersection: Arc<Intersection>, policy: ArrivalPolicy, seed: u64) -> Self {
        Self::with_rng(intersection, policy, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(intersection: Arc<Intersection>, policy: ArrivalPolicy, rng: SmallRng) -> Self {
        Self {
            intersection,
            policy,
            rng,
            next_sequence: 1,
        }
    }

    fn pick_kind(&mut self) -> VehicleKind {
        let one_in = self.policy.emergency_one_in;
        if one_in > 0 && self.rng.random_range(0..one_in) == 0 {
            VehicleKind::Emergency
        } else {
            VehicleKind::Ordinary
        }
    }

    /// Uniform in `[min_interval, max_interval)`.
    pub fn next_interval(&mut self) -> Duration {
        let (min, max) = (self.policy.min_interval, self.policy.max_interval);
        if max <= min {
            return min;
        }
        self.rng.random_range(min..max)
    }

    /// Synthesizes one vehicle and counts it at the intersection. The vehicle
    /// itself is not retained.
    pub fn simulate_arrival(&mut self) -> Vehicle {
        let kind = self.pick_kind();
        let vehicle = Vehicle::new(self.intersection.id(), self.next_sequence, kind);
        self.next_sequence += 1;
        let total = self.intersection.record_arrival();
        info!(
            "Vehicle {} ({}, priority {}) arrived at {} [total {}]",
            vehicle.id,
            vehicle.kind,
            vehicle.kind.priority(),
            vehicle.intersection_id,
            total
        );
        vehicle
    }

    /// Stop is checked before every arrival and raced against every wait, so a
    /// stopped simulator exits within one inter-arrival interval (< 5s) at worst.
    pub async fn run(mut self, mut shutdown: ShutdownListener) {
        info!("Traffic simulator started for {}", self.intersection.id());
        while !shutdown.is_shutdown() {
            self.simulate_arrival();
            let wait = self.next_interval();
            if !shutdown.hold(wait).await {
                break;
            }
        }
        info!(
            "Traffic simulator stopped for {} after {} arrivals",
            self.intersection.id(),
            self.next_sequence - 1
        );
    }
}
