use pretty_assertions::assert_eq;
use std::fs;
use structmap::config::env::{ITERATION_BUDGET, LAYER_ANALYSIS, MONTE_CARLO_SEED};
use structmap::config::{
    apply_env_overrides, find_config, load_config_from_path, EnvironmentSnapshot,
    CONFIG_FILE_NAME,
};
use structmap::{Error, StructuralAnalyzer, StructuralConfig};
use tempfile::TempDir;

const LAYERED_CONFIG: &str = r#"
[pagerank]
damping = 0.8
max_iterations = 50

[layers]
global_iteration_budget = 120

[[layers.definitions]]
name = "api"
patterns = ["src/api/**"]

[[layers.definitions]]
name = "domain"
patterns = ["src/domain/**", "src/model/*.rs"]

[monte_carlo]
seed = 99

[cache]
ttl_seconds = 30
"#;

#[test]
fn test_find_config_in_parent_directory() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(CONFIG_FILE_NAME), LAYERED_CONFIG).unwrap();
    let nested = root.path().join("crates/core/src");
    fs::create_dir_all(&nested).unwrap();

    let config = find_config(nested).expect("config should be found");

    assert_eq!(config.pagerank.damping, 0.8);
    assert_eq!(config.pagerank.max_iterations, 50);
    assert_eq!(config.layers.global_iteration_budget, Some(120));
    assert_eq!(config.layers.definitions.len(), 2);
    assert_eq!(config.monte_carlo.seed, Some(99));
    assert_eq!(config.cache.ttl_seconds, 30);
}

#[test]
fn test_nearest_config_wins() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(CONFIG_FILE_NAME), LAYERED_CONFIG).unwrap();
    let nested = root.path().join("service");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join(CONFIG_FILE_NAME), "[pagerank]\ndamping = 0.6\n").unwrap();

    let config = find_config(nested).unwrap();

    assert_eq!(config.pagerank.damping, 0.6);
    assert!(config.layers.definitions.is_empty());
}

#[test]
fn test_invalid_config_is_skipped() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(CONFIG_FILE_NAME), "[pagerank]\ndamping = 3.0\n").unwrap();

    assert!(find_config(root.path().to_path_buf()).is_none());
}

#[test]
fn test_explicit_path_reports_errors() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("bad.toml");
    fs::write(&path, "[pagerank\n").unwrap();

    let err = load_config_from_path(&path).unwrap_err();
    assert!(matches!(err, Error::WithContext { .. }));
    assert!(err.to_string().contains("bad.toml"));

    let missing = load_config_from_path(&root.path().join("missing.toml")).unwrap_err();
    assert!(matches!(missing, Error::Configuration(_)));
}

#[test]
fn test_env_overrides_layer_on_file_config() {
    let root = TempDir::new().unwrap();
    let path = root.path().join(CONFIG_FILE_NAME);
    fs::write(&path, LAYERED_CONFIG).unwrap();
    let env = EnvironmentSnapshot::from_pairs([
        (ITERATION_BUDGET, "40"),
        (LAYER_ANALYSIS, "false"),
        (MONTE_CARLO_SEED, "7"),
    ]);

    let config = apply_env_overrides(load_config_from_path(&path).unwrap(), &env);

    assert_eq!(config.layers.global_iteration_budget, Some(40));
    assert!(!config.layers.enabled);
    assert_eq!(config.monte_carlo.seed, Some(7));
    assert_eq!(config.pagerank.damping, 0.8);
}

#[test]
fn test_analyzer_rejects_invalid_config() {
    let mut config = StructuralConfig::default();
    config.pagerank.damping = -0.1;

    assert!(StructuralAnalyzer::new(config).is_err());
}

#[test]
fn test_cache_ttl_comes_from_config() {
    let root = TempDir::new().unwrap();
    let path = root.path().join(CONFIG_FILE_NAME);
    fs::write(&path, LAYERED_CONFIG).unwrap();

    let analyzer = StructuralAnalyzer::new(load_config_from_path(&path).unwrap()).unwrap();

    assert_eq!(analyzer.cache().ttl().as_secs(), 30);
}
