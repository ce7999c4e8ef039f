// Persistence file names
pub const INTERSECTIONS_FILE: &str = "intersections.csv";
pub const SIGNALS_FILE: &str = "signals.csv";
pub const REPORT_FILE: &str = "traffic_report.json";

// Table headers
pub const INTERSECTIONS_HEADER: [&str; 3] = ["IntersectionID", "Location", "VehicleCount"];
pub const SIGNALS_HEADER: [&str; 4] = ["SignalID", "Direction", "State", "Duration"];

// Seconds to wait for stopped units before saving
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 2;

// Arrival generator bounds (seconds, half-open) and emergency odds
pub const MIN_ARRIVAL_SECS: u64 = 2;
pub const MAX_ARRIVAL_SECS: u64 = 5;
pub const EMERGENCY_ONE_IN: u32 = 10;
