// signal_grid_main.rs
use clap::Parser;
use signal_grid::config::SimulationConfig;
use signal_grid::monitoring::admin_cli::{load_or_start_fresh, run_cli};
use signal_grid::IntersectionRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;

#[derive(Parser, Debug)]
#[command(name = "signal_grid", about = "Traffic signal management system")]
struct Args {
    /// Directory holding intersections.csv and signals.csv
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Seconds to wait for stopped intersections before saving
    #[arg(long)]
    grace_secs: Option<u64>,

    /// Add an all-red clearance of this many seconds after each yellow
    #[arg(long)]
    all_red_secs: Option<u64>,

    /// Divide every signal hold and arrival interval by this factor
    #[arg(long, default_value_t = 1)]
    time_scale: u32,
}

impl Args {
    fn into_config(self) -> SimulationConfig {
        let mut config = SimulationConfig {
            data_dir: self.data_dir,
            ..SimulationConfig::default()
        };
        if let Some(grace) = self.grace_secs {
            config.shutdown_grace = Duration::from_secs(grace);
        }
        if let Some(clearance) = self.all_red_secs {
            config.timing = config.timing.with_all_red(Duration::from_secs(clearance));
        }
        config.timing = config.timing.scaled(self.time_scale);
        config.arrivals = config.arrivals.scaled(self.time_scale);
        config
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let config = Args::parse().into_config();

    println!("=== Traffic Signal Management System ===\n");
    let registry = Arc::new(IntersectionRegistry::from_config(&config));
    load_or_start_fresh(&registry, &config);

    run_cli(registry, config, BufReader::new(tokio::io::stdin())).await;
}
