//! vpcache - Viewport cache scroll simulator

use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::info;
use viewport_cache::sim::{self, SimulationParams};

/// vpcache - replay a scroll session against the viewport data cache
#[derive(Parser, Debug)]
#[command(name = "vpcache")]
#[command(version)]
#[command(about = "Simulate scrolling a virtualized view backed by a viewport data cache")]
pub struct Args {
    /// Number of items in the synthetic collection
    #[arg(short, long, default_value = "100000")]
    pub total: usize,

    /// Visible rows per frame (must be positive)
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..))]
    pub viewport_height: u32,

    /// Number of viewport updates to simulate
    #[arg(short, long, default_value = "1000")]
    pub steps: usize,

    /// Rows scrolled between updates
    #[arg(long, default_value = "3")]
    pub step_size: usize,

    /// Rows prefetched on each side of the viewport (overrides config)
    #[arg(short, long)]
    pub margin: Option<usize>,

    /// Bump the collection generation every N steps
    #[arg(long)]
    pub restamp_every: Option<NonZeroUsize>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to log file (overrides config)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            total: self.total,
            viewport_height: self.viewport_height as usize,
            steps: self.steps,
            step_size: self.step_size,
            restamp_every: self.restamp_every.map(NonZeroUsize::get),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = viewport_cache::config::load_config_with_precedence(args.config.clone())?;
        let merged = viewport_cache::config::merge_config(config_file);
        let with_env = viewport_cache::config::apply_env_overrides(merged)?;
        viewport_cache::config::apply_cli_overrides(with_env, args.margin, args.log_file.clone())
    };

    viewport_cache::logging::init(&config.log_file_path, &config.log_filter)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let report = sim::run(&args.simulation_params(), config.cache)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}
