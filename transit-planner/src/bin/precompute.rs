//! Build the network snapshot offline and write it to disk.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use transit_planner::catalog::Catalog;
use transit_planner::dataset::Dataset;
use transit_planner::logging;
use transit_planner::network::{BuildConfig, build};

#[derive(Parser, Debug)]
#[command(about = "Precompute ride adjacency and walking proximity")]
struct Args {
    /// Directory holding the dataset tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Where to write the snapshot
    #[arg(long, short, default_value = "data/snapshot.json")]
    output: PathBuf,

    /// Maximum walking transfer distance in metres
    #[arg(long, default_value_t = 400.0)]
    walk_radius: f64,

    /// Walking transfers kept per stop
    #[arg(long, default_value_t = 5)]
    max_neighbours: usize,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let dataset = match Dataset::load(&args.data_dir) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!(error = %e, "failed to load dataset");
            return ExitCode::FAILURE;
        }
    };

    let config = BuildConfig {
        walk_radius_m: args.walk_radius,
        max_walk_neighbours: args.max_neighbours,
    };
    let snapshot = build(&Catalog::new(&dataset), &config);

    if let Err(e) = snapshot.save(&args.output) {
        error!(path = %args.output.display(), error = %e, "failed to write snapshot");
        return ExitCode::FAILURE;
    }
    info!(
        path = %args.output.display(),
        ride_edges = snapshot.ride_edge_count(),
        walk_edges = snapshot.walk_edge_count(),
        "snapshot written"
    );
    ExitCode::SUCCESS
}
