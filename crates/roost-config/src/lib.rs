//! # roost-config
//!
//! Layered configuration loading for Roost using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ROOST_*` prefix, `__` as separator)
//! 2. An explicit file passed with `--config`
//! 3. Project-level `.roost/config.toml`
//! 4. User-level `~/.config/roost/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ROOST_CHANGE__START_YEAR` -> `change.start_year`,
//! `ROOST_RUN__MODE` -> `run.mode`, etc. The `__` (double underscore)
//! separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use roost_config::RoostConfig;
//!
//! let config = RoostConfig::load_with_dotenv(None).expect("config");
//! println!("threshold list: {:?}", config.change.thresholds);
//! ```

mod change;
mod error;
mod model;
mod run;

pub use change::ChangeConfig;
pub use error::ConfigError;
pub use model::ModelConfig;
pub use run::RunConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RoostConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub change: ChangeConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl RoostConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is out of range.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(explicit).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(explicit)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".roost/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Explicit --config file
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed("ROOST_").split("__"))
    }

    /// Check value ranges across all sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.change.validate()?;
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roost").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_core::enums::PredictionMode;

    #[test]
    fn default_config_loads() {
        let config = RoostConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.run.mode, PredictionMode::Conditional);
        assert!(config.change.start_year.is_none());
    }

    #[test]
    fn figment_builds_without_files() {
        let figment = RoostConfig::figment(None);
        let config: RoostConfig = figment.extract().expect("should extract defaults");
        assert_eq!(config.change.quantiles, vec![0.05, 0.5, 0.95]);
        assert!((config.model.ceiling_multiplier - 10.0).abs() < f64::EPSILON);
    }
}
