use std::path::PathBuf;
use std::time::Duration;

use crate::global_variables::{
    DEFAULT_SHUTDOWN_GRACE_SECS, EMERGENCY_ONE_IN, INTERSECTIONS_FILE, MAX_ARRIVAL_SECS,
    MIN_ARRIVAL_SECS, SIGNALS_FILE,
};
use crate::models::signal::SignalPhase;

/// Hold times used by the signal cycle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingPolicy {
    pub green: Duration,
    pub yellow: Duration,
    /// Optional all-red clearance after each yellow.
    pub all_red: Option<Duration>,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            green: secs(SignalPhase::Green.default_duration()),
            yellow: secs(SignalPhase::Yellow.default_duration()),
            all_red: None,
        }
    }
}

impl TimingPolicy {
    pub fn with_all_red(mut self, clearance: Duration) -> Self {
        self.all_red = Some(clearance);
        self
    }

    /// Divides every hold by `factor`; used to run demos faster than real time.
    pub fn scaled(self, factor: u32) -> Self {
        let factor = factor.max(1);
        Self {
            green: self.green / factor,
            yellow: self.yellow / factor,
            all_red: self.all_red.map(|d| d / factor),
        }
    }

    /// Length of one full N-S plus E-W cycle.
    pub fn cycle_length(&self) -> Duration {
        let clearance = self.all_red.unwrap_or_default();
        (self.green + self.yellow + clearance) * 2
    }
}

/// Inter-arrival bounds and emergency odds for the arrival simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalPolicy {
    pub min_interval: Duration,
    /// Exclusive upper bound.
    pub max_interval: Duration,
    pub emergency_one_in: u32,
}

impl Default for ArrivalPolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(MIN_ARRIVAL_SECS),
            max_interval: Duration::from_secs(MAX_ARRIVAL_SECS),
            emergency_one_in: EMERGENCY_ONE_IN,
        }
    }
}

impl ArrivalPolicy {
    pub fn scaled(self, factor: u32) -> Self {
        let factor = factor.max(1);
        Self {
            min_interval: self.min_interval / factor,
            max_interval: self.max_interval / factor,
            emergency_one_in: self.emergency_one_in,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub data_dir: PathBuf,
    pub intersections_file: String,
    pub signals_file: String,
    /// How long `shutdown` waits for stopped units before giving up on them.
    pub shutdown_grace: Duration,
    pub timing: TimingPolicy,
    pub arrivals: ArrivalPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            intersections_file: INTERSECTIONS_FILE.to_string(),
            signals_file: SIGNALS_FILE.to_string(),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
            timing: TimingPolicy::default(),
            arrivals: ArrivalPolicy::default(),
        }
    }
}

impl SimulationConfig {
    pub fn intersections_path(&self) -> PathBuf {
        self.data_dir.join(&self.intersections_file)
    }

    pub fn signals_path(&self) -> PathBuf {
        self.data_dir.join(&self.signals_file)
    }
}

fn secs(seconds: u32) -> Duration {
    Duration::from_secs(u64::from(seconds))
}
