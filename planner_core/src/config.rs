//! Configuration file support for wplan.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/wplan/config.toml`.

use crate::{Error, GoalProfile, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub goals: GoalsConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Catalog source configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Maximum number of exercises requested from the provider
    #[serde(default = "default_catalog_limit")]
    pub limit: usize,

    /// JSON catalog file; the built-in catalog is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            limit: default_catalog_limit(),
            path: None,
        }
    }
}

/// Default goal profile
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoalsConfig {
    #[serde(default = "default_focus_muscles")]
    pub focus_muscles: Vec<String>,

    #[serde(default = "default_reduced_muscles")]
    pub reduced_muscles: Vec<String>,

    #[serde(default)]
    pub excluded_muscles: Vec<String>,

    #[serde(default)]
    pub cardio_enabled: bool,

    #[serde(default = "default_resting_heart_rate_target")]
    pub resting_heart_rate_target: Option<u32>,
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            focus_muscles: default_focus_muscles(),
            reduced_muscles: default_reduced_muscles(),
            excluded_muscles: Vec::new(),
            cardio_enabled: false,
            resting_heart_rate_target: default_resting_heart_rate_target(),
        }
    }
}

impl GoalsConfig {
    /// Normalized goal profile for planning
    pub fn to_profile(&self) -> GoalProfile {
        GoalProfile::new(
            &self.focus_muscles,
            &self.reduced_muscles,
            &self.excluded_muscles,
            self.cardio_enabled,
            self.resting_heart_rate_target,
        )
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wplan")
}

fn default_catalog_limit() -> usize {
    200
}

fn default_focus_muscles() -> Vec<String> {
    vec!["chest".into()]
}

fn default_reduced_muscles() -> Vec<String> {
    vec!["legs".into()]
}

fn default_resting_heart_rate_target() -> Option<u32> {
    Some(55)
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wplan")
            .join("config.toml")
    }

    /// Check values that would make planning impossible
    pub fn validate(&self) -> Result<()> {
        if self.catalog.limit == 0 {
            return Err(Error::Config("catalog.limit must be at least 1".into()));
        }
        self.goals
            .to_profile()
            .validate()
            .map_err(|e| Error::Config(format!("goals: {}", e)))
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
