use serde::Serialize;
use std::fmt;

use crate::models::signal::current_timestamp_millis;

/// Kind of arriving vehicle. Priority is informational only; it does not
/// preempt signal timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VehicleKind {
    Ordinary,
    Emergency,
}

impl VehicleKind {
    pub fn priority(self) -> u8 {
        match self {
            VehicleKind::Ordinary => 1,
            VehicleKind::Emergency => 10,
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VehicleKind::Ordinary => write!(f, "Car"),
            VehicleKind::Emergency => write!(f, "Emergency"),
        }
    }
}

/// A single arrival. Produced and dropped by the arrival simulator.
#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    pub id: String,
    pub kind: VehicleKind,
    pub intersection_id: String,
    pub arrived_at_millis: u64,
}

impl Vehicle {
    pub fn new(intersection_id: &str, sequence: u64, kind: VehicleKind) -> Self {
        Self {
            id: format!("{}_V{}", intersection_id, sequence),
            kind,
            intersection_id: intersection_id.to_string(),
            arrived_at_millis: current_timestamp_millis(),
        }
    }

    pub fn is_emergency(&self) -> bool {
        self.kind == VehicleKind::Emergency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities() {
        assert_eq!(VehicleKind::Ordinary.priority(), 1);
        assert_eq!(VehicleKind::Emergency.priority(), 10);
    }

    #[test]
    fn vehicle_ids_follow_intersection() {
        let vehicle = Vehicle::new("I3", 7, VehicleKind::Emergency);
        assert_eq!(vehicle.id, "I3_V7");
        assert!(vehicle.is_emergency());
        assert_eq!(vehicle.kind.to_string(), "Emergency");
    }
}
