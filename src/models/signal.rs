use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// The possible states for a traffic light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalPhase {
    Red,
    Yellow,
    Green,
}

impl SignalPhase {
    /// Default hold time for the phase, in seconds.
    pub const fn default_duration(self) -> u32 {
        match self {
            SignalPhase::Red => 30,
            SignalPhase::Yellow => 5,
            SignalPhase::Green => 25,
        }
    }

    pub fn is_permissive(self) -> bool {
        self != SignalPhase::Red
    }
}

impl fmt::Display for SignalPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SignalPhase::Red => write!(f, "RED"),
            SignalPhase::Yellow => write!(f, "YELLOW"),
            SignalPhase::Green => write!(f, "GREEN"),
        }
    }
}

/// Approach direction of a signal. Declaration order is the installation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn initial(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::South => 'S',
            Direction::East => 'E',
            Direction::West => 'W',
        }
    }

    /// North and South share an axis, as do East and West.
    pub fn is_north_south(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::North => write!(f, "NORTH"),
            Direction::South => write!(f, "SOUTH"),
            Direction::East => write!(f, "EAST"),
            Direction::West => write!(f, "WEST"),
        }
    }
}

/// Milliseconds since the Unix epoch.
pub fn current_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One directional traffic light owned by an intersection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signal {
    pub intersection_id: String,
    pub direction: Direction,
    pub phase: SignalPhase,
    /// Seconds, always the default for `phase`.
    pub duration: u32,
    pub last_change_millis: u64,
}

impl Signal {
    /// New signals start RED with RED's default duration.
    pub fn new(intersection_id: &str, direction: Direction) -> Self {
        Self {
            intersection_id: intersection_id.to_string(),
            direction,
            phase: SignalPhase::Red,
            duration: SignalPhase::Red.default_duration(),
            last_change_millis: current_timestamp_millis(),
        }
    }

    /// `<IntersectionID>_<DirectionInitial>`, e.g. `I1_N`.
    pub fn signal_id(&self) -> String {
        format!("{}_{}", self.intersection_id, self.direction.initial())
    }

    /// Phase, duration and timestamp are updated together.
    pub fn change_phase(&mut self, phase: SignalPhase, at_millis: u64) {
        self.phase = phase;
        self.duration = phase.default_duration();
        self.last_change_millis = at_millis;
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Signal[{}] {} - {} ({}s)",
            self.signal_id(),
            self.direction,
            self.phase,
            self.duration
        )
    }
}
