//! Flat CSV snapshots of intersections and their signals.
//!
//! Only the intersections table is read back; signals always restart RED.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::SimulationConfig;
use crate::error::{TrafficError, TrafficResult};
use crate::global_variables::{INTERSECTIONS_HEADER, SIGNALS_HEADER};
use crate::management::intersection_registry::IntersectionRegistry;
use crate::models::intersection::{Intersection, IntersectionSnapshot};
use crate::models::signal::{Direction, SignalPhase};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionRecord {
    #[serde(rename = "IntersectionID")]
    pub intersection_id: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "VehicleCount", default)]
    pub vehicle_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRecord {
    #[serde(rename = "SignalID")]
    pub signal_id: String,
    #[serde(rename = "Direction")]
    pub direction: Direction,
    #[serde(rename = "State")]
    pub state: SignalPhase,
    #[serde(rename = "Duration")]
    pub duration: u32,
}

impl From<&IntersectionSnapshot> for IntersectionRecord {
    fn from(snapshot: &IntersectionSnapshot) -> Self {
        Self {
            intersection_id: snapshot.id.clone(),
            location: snapshot.location.clone(),
            vehicle_count: snapshot.vehicle_count,
        }
    }
}

fn write_table<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> TrafficResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| TrafficError::persistence(path, e))?;
    // Header is written by hand so an empty table still carries it.
    wtr.write_record(header)
        .map_err(|e| TrafficError::persistence(path, e))?;
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| TrafficError::persistence(path, e))?;
    }
    wtr.flush().map_err(|e| TrafficError::persistence(path, e))?;
    info!("Data written to {}", path.display());
    Ok(())
}

/// A missing file reads as an empty table.
fn read_table<T: for<'de> Deserialize<'de>>(path: &Path) -> TrafficResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| TrafficError::persistence(path, e))?;
    let rows = rdr
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|e| TrafficError::persistence(path, e))?;
    info!("Data read from {}", path.display());
    Ok(rows)
}

/// Writes both tables from a fresh snapshot of every intersection.
pub fn save(registry: &IntersectionRegistry, config: &SimulationConfig) -> TrafficResult<()> {
    fs::create_dir_all(&config.data_dir)
        .map_err(|e| TrafficError::persistence(&config.data_dir, e))?;

    let snapshots = registry.snapshots();
    let intersections: Vec<IntersectionRecord> =
        snapshots.iter().map(IntersectionRecord::from).collect();
    let signals: Vec<SignalRecord> = snapshots
        .iter()
        .flat_map(|snapshot| snapshot.signals.iter())
        .map(|signal| SignalRecord {
            signal_id: signal.signal_id(),
            direction: signal.direction,
            state: signal.phase,
            duration: signal.duration,
        })
        .collect();

    write_table(&config.intersections_path(), &INTERSECTIONS_HEADER, &intersections)?;
    write_table(&config.signals_path(), &SIGNALS_HEADER, &signals)
}

/// Adds every saved intersection to the registry with its saved vehicle count.
/// Ids already present are skipped. Returns how many were added.
pub fn load(registry: &IntersectionRegistry, config: &SimulationConfig) -> TrafficResult<usize> {
    let records: Vec<IntersectionRecord> = read_table(&config.intersections_path())?;
    let mut loaded = 0;
    for record in records {
        let intersection = Intersection::with_vehicle_count(
            &record.intersection_id,
            &record.location,
            record.vehicle_count,
        );
        match registry.insert(intersection) {
            Ok(()) => loaded += 1,
            Err(e) => warn!("Skipping saved row: {}", e),
        }
    }
    Ok(loaded)
}

/// Saved signal rows, for inspection. They are never replayed onto intersections.
pub fn load_signal_rows(config: &SimulationConfig) -> TrafficResult<Vec<SignalRecord>> {
    read_table(&config.signals_path())
}
