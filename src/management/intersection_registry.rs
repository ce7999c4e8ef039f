use log::{info, warn};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Duration, Instant};

use crate::config::{ArrivalPolicy, SimulationConfig, TimingPolicy};
use crate::control_system::shutdown::{shutdown_channel, ShutdownSignal};
use crate::control_system::signal_cycle_controller::SignalCycleController;
use crate::error::{TrafficError, TrafficResult};
use crate::models::intersection::{Intersection, IntersectionSnapshot};
use crate::monitoring::traffic_report::TrafficReport;
use crate::simulation_engine::arrival_simulator::ArrivalSimulator;

/// The controller/simulator pair running for one intersection.
struct ActiveUnits {
    shutdown: ShutdownSignal,
    controller: JoinHandle<()>,
    simulator: JoinHandle<()>,
}

impl ActiveUnits {
    fn is_alive(&self) -> bool {
        !self.controller.is_finished() || !self.simulator.is_finished()
    }
}

#[derive(Default)]
struct UnitTable {
    active: HashMap<String, ActiveUnits>,
    /// Stopped units whose tasks may still be winding down.
    draining: Vec<(String, JoinHandle<()>)>,
}

impl UnitTable {
    fn retire(&mut self, id: &str, units: ActiveUnits) {
        units.shutdown.trigger();
        self.draining.retain(|(_, handle)| !handle.is_finished());
        self.draining.push((id.to_string(), units.controller));
        self.draining.push((id.to_string(), units.simulator));
    }
}

/// Owns every intersection and supervises the control units bound to them.
///
/// All operations take `&self`; share it behind an `Arc` for multiple callers.
/// `start` spawns onto the current tokio runtime.
pub struct IntersectionRegistry {
    intersections: RwLock<BTreeMap<String, Arc<Intersection>>>,
    units: Mutex<UnitTable>,
    timing: TimingPolicy,
    arrivals: ArrivalPolicy,
}

impl Default for IntersectionRegistry {
    fn default() -> Self {
        Self::new(TimingPolicy::default(), ArrivalPolicy::default())
    }
}

impl IntersectionRegistry {
    pub fn new(timing: TimingPolicy, arrivals: ArrivalPolicy) -> Self {
        Self {
            intersections: RwLock::new(BTreeMap::new()),
            units: Mutex::new(UnitTable::default()),
            timing,
            arrivals,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.timing, config.arrivals)
    }

    /// Creates an intersection with four RED signals.
    pub fn add(&self, id: &str, location: &str) -> TrafficResult<()> {
        self.insert(Intersection::new(id, location))
    }

    /// Inserts a prebuilt intersection, e.g. one restored from disk.
    pub fn insert(&self, intersection: Intersection) -> TrafficResult<()> {
        let mut intersections = self
            .intersections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match intersections.entry(intersection.id().to_string()) {
            Entry::Occupied(entry) => Err(TrafficError::DuplicateIntersection(entry.key().clone())),
            Entry::Vacant(entry) => {
                info!(
                    "Added intersection: {} at {}",
                    intersection.id(),
                    intersection.location()
                );
                entry.insert(Arc::new(intersection));
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Intersection>> {
        self.intersections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> Vec<String> {
        self.intersections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.intersections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawns one signal controller and one arrival simulator for `id`.
    ///
    /// Fails with `AlreadyRunning` while a previous pair is still active; call
    /// `stop` first to restart. Outside a tokio runtime it fails with
    /// `RuntimeUnavailable` and leaves the registry untouched.
    pub fn start(&self, id: &str) -> TrafficResult<()> {
        let intersection = self
            .get(id)
            .ok_or_else(|| TrafficError::IntersectionNotFound(id.to_string()))?;
        let runtime =
            Handle::try_current().map_err(|_| TrafficError::RuntimeUnavailable(id.to_string()))?;

        let mut units = self.lock_units();
        if let Some(existing) = units.active.remove(id) {
            if existing.is_alive() {
                units.active.insert(id.to_string(), existing);
                return Err(TrafficError::AlreadyRunning(id.to_string()));
            }
            units.retire(id, existing);
        }

        let (shutdown, listener) = shutdown_channel();
        let controller = SignalCycleController::new(Arc::clone(&intersection), self.timing);
        let simulator = ArrivalSimulator::new(intersection, self.arrivals);
        let active = ActiveUnits {
            shutdown,
            controller: runtime.spawn(controller.run(listener.clone())),
            simulator: runtime.spawn(simulator.run(listener)),
        };
        units.active.insert(id.to_string(), active);
        info!("Intersection {} started", id);
        Ok(())
    }

    /// Asks both units for `id` to stop without waiting for them. Returns whether
    /// anything was running; unknown or idle ids are a no-op.
    pub fn stop(&self, id: &str) -> bool {
        let mut units = self.lock_units();
        match units.active.remove(id) {
            Some(active) => {
                units.retire(id, active);
                info!("Intersection {} stopped", id);
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&self) {
        for id in self.ids() {
            self.stop(&id);
        }
    }

    pub fn is_running(&self, id: &str) -> bool {
        self.lock_units()
            .active
            .get(id)
            .map(ActiveUnits::is_alive)
            .unwrap_or(false)
    }

    pub fn running_count(&self) -> usize {
        self.lock_units()
            .active
            .values()
            .filter(|units| units.is_alive())
            .count()
    }

    /// Stops everything, then waits up to `grace` for the units to exit.
    /// Units that miss the deadline are logged and aborted; their number is returned.
    pub async fn shutdown(&self, grace: Duration) -> usize {
        self.stop_all();
        let draining = std::mem::take(&mut self.lock_units().draining);
        let deadline = Instant::now() + grace;
        let mut leaked = 0;
        for (id, mut handle) in draining {
            match timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Control unit for {} ended abnormally: {}", id, e),
                Err(_) => {
                    warn!(
                        "Control unit for {} did not exit within {:?}; aborting",
                        id, grace
                    );
                    handle.abort();
                    leaked += 1;
                }
            }
        }
        leaked
    }

    pub fn snapshot(&self, id: &str) -> Option<IntersectionSnapshot> {
        self.get(id).map(|intersection| intersection.snapshot())
    }

    /// Snapshots of every intersection, sorted by id.
    pub fn snapshots(&self) -> Vec<IntersectionSnapshot> {
        let intersections: Vec<Arc<Intersection>> = self
            .intersections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        intersections.iter().map(|i| i.snapshot()).collect()
    }

    pub fn report(&self) -> TrafficReport {
        TrafficReport::from_snapshots(self.snapshots())
    }

    fn lock_units(&self) -> MutexGuard<'_, UnitTable> {
        self.units.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
