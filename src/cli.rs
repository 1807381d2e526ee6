use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "structmap")]
#[command(about = "Structural call-graph health analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a JSON snapshot of functions and call edges
    Analyze {
        /// Snapshot file ({ "snapshot_id", "functions", "edges" })
        snapshot: PathBuf,

        /// Configuration file (defaults to the nearest .structmap.toml)
        #[arg(short, long, env = "STRUCTMAP_CONFIG")]
        config: Option<PathBuf>,

        /// Re-enable layer-partitioned PageRank when the config file or
        /// STRUCTMAP_LAYER_ANALYSIS turned it off (requires layer definitions)
        #[arg(long, conflicts_with = "no_layers")]
        layers: bool,

        /// Disable layer-partitioned PageRank
        #[arg(long = "no-layers")]
        no_layers: bool,

        /// Cap on matrix-vector multiplications shared by all layers
        #[arg(long = "iteration-budget")]
        iteration_budget: Option<usize>,

        /// Seed for Monte-Carlo estimation of oversized layers
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Configuration file (defaults to the nearest .structmap.toml)
        #[arg(short, long, env = "STRUCTMAP_CONFIG")]
        config: Option<PathBuf>,
    },
}
