use log::{debug, error, info};
use std::sync::Arc;
use tokio::time::Duration;

use crate::config::TimingPolicy;
use crate::control_system::shutdown::ShutdownListener;
use crate::models::intersection::Intersection;
use crate::models::signal::{Direction, SignalPhase};

/// One step of the fixed two-axis cycle.
///
/// The clearance steps only appear when the timing policy enables all-red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleStep {
    NsGreen,
    NsYellow,
    NsClearance,
    EwGreen,
    EwYellow,
    EwClearance,
}

impl CycleStep {
    pub fn next(self, all_red: bool) -> Self {
        match self {
            CycleStep::NsGreen => CycleStep::NsYellow,
            CycleStep::NsYellow if all_red => CycleStep::NsClearance,
            CycleStep::NsYellow | CycleStep::NsClearance => CycleStep::EwGreen,
            CycleStep::EwGreen => CycleStep::EwYellow,
            CycleStep::EwYellow if all_red => CycleStep::EwClearance,
            CycleStep::EwYellow | CycleStep::EwClearance => CycleStep::NsGreen,
        }
    }

    /// 0 while North/South hold the right of way, 1 for East/West.
    pub fn cycle_index(self) -> usize {
        match self {
            CycleStep::NsGreen | CycleStep::NsYellow | CycleStep::NsClearance => 0,
            CycleStep::EwGreen | CycleStep::EwYellow | CycleStep::EwClearance => 1,
        }
    }

    /// Phase for the axis that has the right of way; the crossing axis is always RED.
    fn active_phase(self) -> SignalPhase {
        match self {
            CycleStep::NsGreen | CycleStep::EwGreen => SignalPhase::Green,
            CycleStep::NsYellow | CycleStep::EwYellow => SignalPhase::Yellow,
            CycleStep::NsClearance | CycleStep::EwClearance => SignalPhase::Red,
        }
    }

    pub fn phases(self) -> [(Direction, SignalPhase); 4] {
        let active = self.active_phase();
        let north_south = self.cycle_index() == 0;
        Direction::ALL.map(|direction| {
            if direction.is_north_south() == north_south {
                (direction, active)
            } else {
                (direction, SignalPhase::Red)
            }
        })
    }

    pub fn hold(self, timing: &TimingPolicy) -> Duration {
        match self.active_phase() {
            SignalPhase::Green => timing.green,
            SignalPhase::Yellow => timing.yellow,
            SignalPhase::Red => timing.all_red.unwrap_or_default(),
        }
    }
}

/// Drives one intersection's signals through N-S green/yellow then E-W green/yellow
/// until its shutdown listener fires.
pub struct SignalCycleController {
    intersection: Arc<Intersection>,
    timing: TimingPolicy,
    step: CycleStep,
}

impl SignalCycleController {
    pub fn new(intersection: Arc<Intersection>, timing: TimingPolicy) -> Self {
        Self {
            intersection,
            timing,
            step: CycleStep::NsGreen,
        }
    }

    pub fn step(&self) -> CycleStep {
        self.step
    }

    pub fn cycle_index(&self) -> usize {
        self.step.cycle_index()
    }

    /// Commits the current step to the intersection in a single batch.
    pub fn apply_current_step(&self) -> crate::error::TrafficResult<()> {
        self.intersection.apply_phases(&self.step.phases())?;
        debug!("[{}] Signals updated: {:?}", self.intersection.id(), self.step);
        Ok(())
    }

    pub fn advance(&mut self) {
        self.step = self.step.next(self.timing.all_red.is_some());
    }

    /// The stop signal is raced against every hold, so a stopped controller exits
    /// within the current hold at worst (25s green / 5s yellow by default).
    ///
    /// A failed batch is logged and retried after one yellow hold, without advancing.
    pub async fn run(mut self, mut shutdown: ShutdownListener) {
        info!("Signal controller started for {}", self.intersection.id());
        while !shutdown.is_shutdown() {
            let hold = match self.apply_current_step() {
                Ok(()) => self.step.hold(&self.timing),
                Err(e) => {
                    error!("Signal error: {}", e);
                    if !shutdown.hold(self.timing.yellow).await {
                        break;
                    }
                    continue;
                }
            };
            if !shutdown.hold(hold).await {
                break;
            }
            self.advance();
        }
        info!(
            "Signal controller stopped for {} during {:?}",
            self.intersection.id(),
            self.step
        );
    }
}
