//! Tracker configuration
//!
//! Layered as built-in defaults, then an optional `config/equiptrack` file,
//! then `EQUIPTRACK_*` environment variables (`EQUIPTRACK_STORE__DATA_DIR`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub namespace: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Author recorded on audit comments when the caller names nobody.
    pub default_author: String,
}

/// Values substituted for blank spreadsheet cells.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ImportConfig {
    pub default_description: String,
    pub default_unit: String,
    pub default_internal_company: String,
    pub default_rental_company: String,
    pub remarks: String,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct TrackerConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

impl TrackerConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config/equiptrack")
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("EQUIPTRACK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("equiptrack.db"),
            namespace: crate::store::DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_author: crate::workflow::DEFAULT_AUTHOR.to_string(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_description: "NEW EQUIPMENT".to_string(),
            default_unit: "set".to_string(),
            default_internal_company: "MUWALYH SITE OFFICE".to_string(),
            default_rental_company: "To Be Specified".to_string(),
            remarks: "Imported from Excel".to_string(),
        }
    }
}
