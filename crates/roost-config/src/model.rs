//! Link and overflow settings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_ceiling_multiplier() -> f64 {
    10.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Overflow ceiling as a multiple of the largest observed count.
    #[serde(default = "default_ceiling_multiplier")]
    pub ceiling_multiplier: f64,

    /// Explicit ceiling on expected counts. Takes precedence over
    /// `ceiling_multiplier` when set.
    #[serde(default)]
    pub max_expected_count: Option<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            ceiling_multiplier: default_ceiling_multiplier(),
            max_expected_count: None,
        }
    }
}

impl ModelConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ceiling_multiplier.is_finite() && self.ceiling_multiplier > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "model.ceiling_multiplier".into(),
                reason: format!("must be a positive number, got {}", self.ceiling_multiplier),
            });
        }
        if let Some(max) = self.max_expected_count {
            if !(max.is_finite() && max > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: "model.max_expected_count".into(),
                    reason: format!("must be a positive number, got {max}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ModelConfig::default();
        assert!((config.ceiling_multiplier - 10.0).abs() < f64::EPSILON);
        assert!(config.max_expected_count.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_positive_ceiling_is_invalid() {
        let config = ModelConfig {
            max_expected_count: Some(0.0),
            ..ModelConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
