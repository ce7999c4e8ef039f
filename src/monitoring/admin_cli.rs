use log::{error, warn};
use std::fs;
use std::io::{stdout, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::config::SimulationConfig;
use crate::global_variables::REPORT_FILE;
use crate::management::intersection_registry::IntersectionRegistry;
use crate::persistence::csv_store;

fn prompt(text: &str) {
    print!("{}", text);
    let _ = stdout().flush();
}

async fn read_answer<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>, text: &str) -> Option<String> {
    prompt(text);
    match lines.next_line().await {
        Ok(Some(line)) => Some(line.trim().to_string()),
        Ok(None) => None,
        Err(e) => {
            error!("Failed to read input: {}", e);
            None
        }
    }
}

/// Loads saved intersections, degrading to an empty registry if the table is unreadable.
pub fn load_or_start_fresh(registry: &IntersectionRegistry, config: &SimulationConfig) {
    match csv_store::load(registry, config) {
        Ok(0) => println!("No existing data found. Starting fresh."),
        Ok(n) => println!("Loaded {} intersections.", n),
        Err(e) => {
            warn!("Could not load saved intersections: {}", e);
            println!("No existing data found. Starting fresh.");
        }
    }
}

/// Stops every unit, waits out the grace period, then saves. A save failure is
/// reported but does not prevent the exit.
pub async fn save_and_exit(registry: &IntersectionRegistry, config: &SimulationConfig) {
    println!("\nStopping all intersections...");
    let leaked = registry.shutdown(config.shutdown_grace).await;
    if leaked > 0 {
        warn!("{} control units had to be aborted", leaked);
    }
    println!("Saving data...");
    match csv_store::save(registry, config) {
        Ok(()) => println!("Data saved successfully."),
        Err(e) => eprintln!("Error saving data: {}", e),
    }
}

fn export_report(registry: &IntersectionRegistry, config: &SimulationConfig) {
    let path = config.data_dir.join(REPORT_FILE);
    let written = registry
        .report()
        .to_json()
        .map_err(|e| e.to_string())
        .and_then(|json| fs::write(&path, json).map_err(|e| e.to_string()));
    match written {
        Ok(()) => println!("Report exported to {}", path.display()),
        Err(e) => eprintln!("Error exporting report: {}", e),
    }
}

/// Interactive menu over the registry. Returns when the user picks Save & Exit
/// or input ends; either way everything is stopped and saved.
pub async fn run_cli<R: AsyncBufRead + Unpin>(
    registry: Arc<IntersectionRegistry>,
    config: SimulationConfig,
    input: R,
) {
    let mut lines = input.lines();
    loop {
        println!("\n--- Menu ---");
        println!("1. Add Intersection");
        println!("2. Start Intersection");
        println!("3. Stop Intersection");
        println!("4. Generate Report");
        println!("5. Export Report (JSON)");
        println!("6. Save & Exit");
        let Some(choice) = read_answer(&mut lines, "Enter choice: ").await else {
            break;
        };
        match choice.parse::<u32>() {
            Ok(1) => {
                let Some(id) = read_answer(&mut lines, "Enter Intersection ID: ").await else {
                    break;
                };
                let Some(location) = read_answer(&mut lines, "Enter Location: ").await else {
                    break;
                };
                match registry.add(&id, &location) {
                    Ok(()) => println!("Added intersection: {} at {}", id, location),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Ok(2) => {
                let Some(id) = read_answer(&mut lines, "Enter Intersection ID to start: ").await
                else {
                    break;
                };
                match registry.start(&id) {
                    Ok(()) => println!("Intersection {} started successfully.", id),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Ok(3) => {
                let Some(id) = read_answer(&mut lines, "Enter Intersection ID to stop: ").await
                else {
                    break;
                };
                if registry.stop(&id) {
                    println!("Intersection {} stopped.", id);
                } else {
                    println!("Intersection {} was not running.", id);
                }
            }
            Ok(4) => println!("\n{}\n", registry.report()),
            Ok(5) => export_report(&registry, &config),
            Ok(6) => break,
            Ok(_) => println!("Invalid choice. Try again."),
            Err(_) => println!("Please enter a valid number."),
        }
    }
    save_and_exit(&registry, &config).await;
    println!("Goodbye!");
}
