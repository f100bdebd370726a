use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tablespec_core::SpecDefaults;
use tablespec_gx::Strictness;

use crate::CliError;

pub const DEFAULT_CONFIG_FILE: &str = "tablespec.toml";
pub const DEFAULT_SUITE_DIR: &str = "expectations";

/// Settings read from `tablespec.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding `tables/<table>.expectations.yaml`.
    pub suite_dir: PathBuf,
    pub strictness: Strictness,
    /// Seed for sample generation; a fresh seed is drawn when absent.
    pub seed: Option<u64>,
    /// Fallbacks for under-specified VARCHAR and DECIMAL columns.
    pub defaults: SpecDefaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            suite_dir: PathBuf::from(DEFAULT_SUITE_DIR),
            strictness: Strictness::default(),
            seed: None,
            defaults: SpecDefaults::default(),
        }
    }
}

/// Load settings from `path`, or from `tablespec.toml` in the working
/// directory when no path is given.
///
/// An explicitly requested file must exist; a missing default file means
/// default settings.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if !path.exists() {
        if explicit {
            return Err(CliError::InvalidConfig(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        tracing::debug!(event = "config_defaults", path = %path.display());
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let settings: Settings = toml::from_str(&content)?;
    tracing::debug!(event = "config_loaded", path = %path.display());
    Ok(settings)
}
