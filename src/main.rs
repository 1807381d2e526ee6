use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use structmap::cli::{Cli, Commands};
use structmap::config::{
    apply_env_overrides, load_config, load_config_from_path, EnvironmentSnapshot,
    StructuralConfig,
};
use structmap::io::JsonSnapshotFile;
use structmap::StructuralAnalyzer;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            snapshot,
            config,
            layers,
            no_layers,
            iteration_budget,
            seed,
            output,
            verbosity,
        } => {
            init_logging(verbosity);
            let mut config = resolve_config(config.as_deref())?;
            if layers {
                config.layers.enabled = true;
            }
            if no_layers {
                config.layers.enabled = false;
            }
            if let Some(budget) = iteration_budget {
                config.layers.global_iteration_budget = (budget > 0).then_some(budget);
            }
            if let Some(seed) = seed {
                config.monte_carlo.seed = Some(seed);
            }
            handle_analyze(&snapshot, config, output)
        }
        Commands::Config { config } => {
            init_logging(0);
            let config = resolve_config(config.as_deref())?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdout carries the JSON report
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_config(path: Option<&Path>) -> Result<StructuralConfig> {
    match path {
        Some(path) => {
            let config = load_config_from_path(path)?;
            Ok(apply_env_overrides(
                config,
                &EnvironmentSnapshot::from_current_env(),
            ))
        }
        None => Ok(load_config()),
    }
}

fn handle_analyze(snapshot: &Path, config: StructuralConfig, output: Option<PathBuf>) -> Result<()> {
    let snapshot_file = JsonSnapshotFile::load(snapshot)?;
    let analyzer = StructuralAnalyzer::new(config)?;
    let metrics = analyzer.analyze(&snapshot_file, &snapshot_file.snapshot_id);

    let json = serde_json::to_string_pretty(&metrics).context("Failed to serialize metrics")?;
    match output {
        Some(path) => std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}
