//! Environment variable overrides for Settings.
//!
//! Kept in its own test binary: it mutates process environment.

use tempfile::TempDir;

use phylotree::application::ApplicationError;
use phylotree::config::Settings;
use phylotree::domain::DistanceMetric;

#[test]
fn given_env_vars_when_load_then_override_files() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("local.toml");
    std::fs::write(&local, "printing_depth = 40\nmetric = \"hamming\"\n").unwrap();

    std::env::set_var("PHYLOTREE_PRINTING_DEPTH", "15");
    std::env::set_var("PHYLOTREE_METRIC", "p-distance");
    let settings = Settings::load_from(None, Some(&local));

    std::env::set_var("PHYLOTREE_PRECISION", "many");
    let invalid = Settings::load_from(None, None);

    std::env::remove_var("PHYLOTREE_PRINTING_DEPTH");
    std::env::remove_var("PHYLOTREE_METRIC");
    std::env::remove_var("PHYLOTREE_PRECISION");

    let settings = settings.expect("load settings");
    assert_eq!(settings.printing_depth, 15);
    assert_eq!(settings.metric, DistanceMetric::PDistance);
    assert!(matches!(invalid, Err(ApplicationError::Config { .. })));
}
