use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{TrafficError, TrafficResult};
use crate::models::signal::{current_timestamp_millis, Direction, Signal, SignalPhase};

/// A simulated junction: four directional signals plus an arrival counter.
///
/// The signals sit behind one lock so a whole phase batch is committed at once;
/// the counter is a plain atomic because arrivals never need to see the signals.
#[derive(Debug)]
pub struct Intersection {
    id: String,
    location: String,
    signals: RwLock<Vec<Signal>>,
    vehicle_count: AtomicU64,
}

/// Point-in-time copy of an intersection, used by reports and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntersectionSnapshot {
    pub id: String,
    pub location: String,
    pub vehicle_count: u64,
    pub signals: Vec<Signal>,
}

impl Intersection {
    /// Creates the intersection with one RED signal per direction.
    pub fn new(id: &str, location: &str) -> Self {
        Self::with_vehicle_count(id, location, 0)
    }

    /// Used when restoring from a saved table; signals still start RED.
    pub fn with_vehicle_count(id: &str, location: &str, vehicle_count: u64) -> Self {
        let intersection = Self::bare(id, location, vehicle_count);
        for direction in Direction::ALL {
            intersection.add_signal(direction);
        }
        intersection
    }

    pub(crate) fn bare(id: &str, location: &str, vehicle_count: u64) -> Self {
        Self {
            id: id.to_string(),
            location: location.to_string(),
            signals: RwLock::new(Vec::with_capacity(Direction::ALL.len())),
            vehicle_count: AtomicU64::new(vehicle_count),
        }
    }

    // Creation-time only.
    pub(crate) fn add_signal(&self, direction: Direction) {
        let mut signals = self.write_signals();
        if signals.iter().all(|s| s.direction != direction) {
            signals.push(Signal::new(&self.id, direction));
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn vehicle_count(&self) -> u64 {
        self.vehicle_count.load(Ordering::Acquire)
    }

    /// Counts one arrival and returns the new total.
    pub fn record_arrival(&self) -> u64 {
        self.vehicle_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn signal_count(&self) -> usize {
        self.read_signals().len()
    }

    /// Moves a single signal to `phase`, resetting its duration and timestamp.
    pub fn change_phase(&self, direction: Direction, phase: SignalPhase) -> TrafficResult<()> {
        let mut signals = self.write_signals();
        let found = signals.len();
        match signals.iter_mut().find(|s| s.direction == direction) {
            Some(signal) => {
                signal.change_phase(phase, current_timestamp_millis());
                Ok(())
            }
            None => Err(TrafficError::InvalidSignalConfiguration {
                id: self.id.clone(),
                found,
            }),
        }
    }

    /// Commits one phase per direction under a single write lock, so readers see
    /// either the previous batch or this one. Fails without touching any signal
    /// unless every direction has exactly one signal.
    pub fn apply_phases(&self, phases: &[(Direction, SignalPhase)]) -> TrafficResult<()> {
        let mut signals = self.write_signals();
        let complete = signals.len() == Direction::ALL.len()
            && Direction::ALL
                .iter()
                .all(|d| signals.iter().filter(|s| s.direction == *d).count() == 1);
        if !complete {
            return Err(TrafficError::InvalidSignalConfiguration {
                id: self.id.clone(),
                found: signals.len(),
            });
        }

        let now = current_timestamp_millis();
        for (direction, phase) in phases {
            if let Some(signal) = signals.iter_mut().find(|s| s.direction == *direction) {
                signal.change_phase(*phase, now);
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> IntersectionSnapshot {
        let mut signals = self.read_signals().clone();
        signals.sort_by_key(|s| s.direction);
        IntersectionSnapshot {
            id: self.id.clone(),
            location: self.location.clone(),
            vehicle_count: self.vehicle_count(),
            signals,
        }
    }

    // A panicked writer cannot leave a torn batch behind (each batch is validated
    // before any signal changes), so a poisoned lock is still safe to use.
    fn read_signals(&self) -> RwLockReadGuard<'_, Vec<Signal>> {
        self.signals.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_signals(&self) -> RwLockWriteGuard<'_, Vec<Signal>> {
        self.signals.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IntersectionSnapshot {
    pub fn phase_of(&self, direction: Direction) -> Option<SignalPhase> {
        self.signals
            .iter()
            .find(|s| s.direction == direction)
            .map(|s| s.phase)
    }
}

impl fmt::Display for IntersectionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Intersection[{}] at {} - Vehicles: {}",
            self.id, self.location, self.vehicle_count
        )
    }
}
