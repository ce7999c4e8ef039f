use serde::Serialize;
use std::fmt;

use crate::models::intersection::IntersectionSnapshot;

#[derive(Debug, Clone, Serialize)]
pub struct BusiestIntersection {
    pub id: String,
    pub vehicle_count: u64,
}

/// Read-only aggregation over a set of intersection snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct TrafficReport {
    pub total_vehicles: u64,
    pub intersection_count: usize,
    /// Highest vehicle count; ties go to the lowest id.
    pub busiest: Option<BusiestIntersection>,
    /// Sorted by id ascending.
    pub intersections: Vec<IntersectionSnapshot>,
}

impl TrafficReport {
    pub fn from_snapshots(mut intersections: Vec<IntersectionSnapshot>) -> Self {
        intersections.sort_by(|a, b| a.id.cmp(&b.id));

        let total_vehicles = intersections.iter().map(|i| i.vehicle_count).sum();
        // Strictly greater, so the first (lowest) id wins a tie.
        let busiest = intersections
            .iter()
            .fold(None::<&IntersectionSnapshot>, |best, candidate| match best {
                Some(b) if b.vehicle_count >= candidate.vehicle_count => Some(b),
                _ => Some(candidate),
            })
            .map(|i| BusiestIntersection {
                id: i.id.clone(),
                vehicle_count: i.vehicle_count,
            });

        Self {
            total_vehicles,
            intersection_count: intersections.len(),
            busiest,
            intersections,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for TrafficReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "========== TRAFFIC REPORT ==========")?;
        writeln!(f, "Total Vehicles: {}", self.total_vehicles)?;
        writeln!(f, "Total Intersections: {}", self.intersection_count)?;
        if let Some(busiest) = &self.busiest {
            writeln!(
                f,
                "Busiest Intersection: {} ({} vehicles)",
                busiest.id, busiest.vehicle_count
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Intersection Details:")?;
        for intersection in &self.intersections {
            writeln!(f, "{}", intersection)?;
            for signal in &intersection.signals {
                writeln!(f, "  {}", signal)?;
            }
        }
        write!(f, "====================================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: &str, count: u64) -> IntersectionSnapshot {
        IntersectionSnapshot {
            id: id.to_string(),
            location: format!("{} Ave", id),
            vehicle_count: count,
            signals: Vec::new(),
        }
    }

    #[test]
    fn empty_report() {
        let report = TrafficReport::from_snapshots(Vec::new());
        assert_eq!(report.total_vehicles, 0);
        assert!(report.busiest.is_none());
        assert!(report.to_string().contains("Total Intersections: 0"));
    }

    #[test]
    fn totals_and_ordering() {
        let report = TrafficReport::from_snapshots(vec![
            snapshot("I3", 4),
            snapshot("I1", 9),
            snapshot("I2", 2),
        ]);
        assert_eq!(report.total_vehicles, 15);
        let ids: Vec<_> = report.intersections.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["I1", "I2", "I3"]);
        assert_eq!(report.busiest.unwrap().id, "I1");
    }

    #[test]
    fn ties_go_to_lowest_id() {
        let report = TrafficReport::from_snapshots(vec![
            snapshot("B", 7),
            snapshot("C", 7),
            snapshot("A", 7),
        ]);
        assert_eq!(report.busiest.unwrap().id, "A");
    }

    #[test]
    fn json_export_includes_busiest() {
        let report = TrafficReport::from_snapshots(vec![snapshot("I1", 3)]);
        let json = report.to_json().unwrap();
        assert!(json.contains("\"busiest\""));
        assert!(json.contains("\"total_vehicles\": 3"));
    }
}
