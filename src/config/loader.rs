use std::fs;
use std::path::{Path, PathBuf};

use super::core::StructuralConfig;
use super::env::{apply_env_overrides, EnvironmentSnapshot};
use crate::errors::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".structmap.toml";
const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse and validate configuration from a TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<StructuralConfig> {
    let config: StructuralConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an explicit path, failing on any problem
pub fn load_config_from_path(path: &Path) -> Result<StructuralConfig> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::Configuration(format!("failed to read {}: {}", path.display(), e))
    })?;
    parse_and_validate_config(&contents)
        .map_err(|e| e.with_context(format!("invalid config {}", path.display())))
}

fn try_load_config_from_path(config_path: &Path) -> Option<StructuralConfig> {
    if !config_path.is_file() {
        return None;
    }
    match load_config_from_path(config_path) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.structmap.toml`
pub fn find_config(start: PathBuf) -> Option<StructuralConfig> {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
}

/// Load configuration from the working directory hierarchy, then apply
/// `STRUCTMAP_*` environment overrides.
pub fn load_config() -> StructuralConfig {
    let file_config = match std::env::current_dir() {
        Ok(dir) => find_config(dir).unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            StructuralConfig::default()
        }),
        Err(e) => {
            log::warn!("Failed to get current directory: {}. Using default config.", e);
            StructuralConfig::default()
        }
    };

    apply_env_overrides(file_config, &EnvironmentSnapshot::from_current_env())
}
