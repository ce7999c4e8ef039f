//! Simulated road intersections, each running an independent signal cycle and
//! arrival generator under a central registry.

pub mod config;
pub mod control_system;
pub mod error;
pub mod global_variables;
pub mod management;
pub mod models;
pub mod monitoring;
pub mod persistence;
pub mod simulation_engine;

pub use error::{TrafficError, TrafficResult};
pub use management::intersection_registry::IntersectionRegistry;
