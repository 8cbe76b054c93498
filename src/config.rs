//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/phylotree/phylotree.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `PHYLOTREE_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DistanceMetric;

/// Unified configuration for phylotree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Number of dots before the deepest node in the indented listing
    pub printing_depth: usize,
    /// Decimal places for edge weights in the bracket form
    pub precision: usize,
    /// Sequence distance used to populate the initial matrix
    pub metric: DistanceMetric,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            printing_depth: 80,
            precision: 5,
            metric: DistanceMetric::Hamming,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub printing_depth: Option<usize>,
    pub precision: Option<usize>,
    pub metric: Option<DistanceMetric>,
}

/// Get the XDG config directory for phylotree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "phylotree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("phylotree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            printing_depth: overlay.printing_depth.unwrap_or(self.printing_depth),
            precision: overlay.precision.unwrap_or(self.precision),
            metric: overlay.metric.unwrap_or(self.metric),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file given on the command line; it must exist
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local)
    }

    /// Load settings from explicit global and local config files.
    ///
    /// A missing global file is skipped; a missing local file is an error.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        if let Some(local_path) = local {
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply PHYLOTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("PHYLOTREE"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("printing_depth") {
            settings.printing_depth = parse_env("PHYLOTREE_PRINTING_DEPTH", &val)?;
        }
        if let Ok(val) = config.get_string("precision") {
            settings.precision = parse_env("PHYLOTREE_PRECISION", &val)?;
        }
        if let Ok(val) = config.get_string("metric") {
            settings.metric = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("PHYLOTREE_METRIC: {}", e),
            })?;
        }

        Ok(settings)
    }

    /// Render settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

fn parse_env(name: &str, value: &str) -> Result<usize, ApplicationError> {
    value.trim().parse().map_err(|e| ApplicationError::Config {
        message: format!("{}={}: {}", name, value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.printing_depth, 80);
        assert_eq!(settings.precision, 5);
        assert_eq!(settings.metric, DistanceMetric::Hamming);
    }

    #[test]
    fn test_merge_with_keeps_unspecified_values() {
        let overlay = RawSettings {
            precision: Some(3),
            ..RawSettings::default()
        };
        let merged = Settings::default().merge_with(&overlay);
        assert_eq!(merged.precision, 3);
        assert_eq!(merged.printing_depth, 80);
    }

    #[test]
    fn test_raw_settings_parse_metric() {
        let raw: RawSettings = toml::from_str("metric = \"p-distance\"").unwrap();
        assert_eq!(raw.metric, Some(DistanceMetric::PDistance));
        assert_eq!(raw.printing_depth, None);
    }
}
