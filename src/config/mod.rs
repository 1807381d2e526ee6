//! Configuration for structural analysis.
//!
//! Values come from `.structmap.toml` (searched upward from the working
//! directory) with `STRUCTMAP_*` environment overrides applied on top.

mod core;
pub mod env;
mod loader;

pub use core::{
    AnalysisSettings, CacheSettings, LayerDefinition, LayersConfig, MonteCarloConfig,
    PageRankConfig, StructuralConfig,
};

pub use env::{apply_env_overrides, EnvironmentSnapshot};

pub use loader::{
    directory_ancestors, find_config, load_config, load_config_from_path,
    parse_and_validate_config, CONFIG_FILE_NAME,
};
