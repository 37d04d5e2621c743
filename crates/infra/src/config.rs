//! Configuration loading and representation.
//!
//! Layers, lowest precedence first:
//! 1. built-in defaults
//! 2. an optional `config/studioinv.{toml,json,yaml}` file (or an explicit path)
//! 3. `STUDIOINV_*` environment variables, nested keys split by `__`
//!    (e.g. `STUDIOINV_LOGGING__LEVEL=debug`)

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Backing-store collection names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionNames {
    pub studios: String,
    pub equipment: String,
    pub units: String,
    pub maintenance_history: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            studios: "studios".to_string(),
            equipment: "equipment".to_string(),
            units: "equipment_units".to_string(),
            maintenance_history: "maintenance_history".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// `json` or `pretty`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserHistoryConfig {
    pub path: PathBuf,
    pub capacity: usize,
}

impl Default for UserHistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("inventory_user_history.json"),
            capacity: studioinv_inventory::DEFAULT_USER_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub collections: CollectionNames,
    pub logging: LoggingConfig,
    pub user_history: UserHistoryConfig,
}

impl InventoryConfig {
    pub const ENV_PREFIX: &'static str = "STUDIOINV";
    pub const DEFAULT_FILE: &'static str = "config/studioinv";

    /// Load from the default file location (optional) and the environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::build(File::with_name(Self::DEFAULT_FILE).required(false))
    }

    /// Load from an explicit file, which must exist, then the environment.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        Self::build(File::from(path).required(true))
            .with_context(|| format!("loading configuration from {}", path.display()))
    }

    fn build<S>(file: S) -> anyhow::Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Config::try_from(&Self::default()).context("encoding default configuration")?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("building configuration")?;

        config
            .try_deserialize()
            .context("deserializing inventory configuration")
    }
}
