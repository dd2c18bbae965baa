//! Reference years and summary statistics for the change estimate.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_quantiles() -> Vec<f64> {
    vec![0.05, 0.5, 0.95]
}

fn default_thresholds() -> Vec<f64> {
    vec![-30.0, -50.0]
}

const fn default_max_dropped_fraction() -> f64 {
    0.05
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChangeConfig {
    /// Baseline year. Defaults to the earliest observed year when unset.
    #[serde(default)]
    pub start_year: Option<i32>,

    /// Comparison year. Defaults to the latest observed year when unset.
    #[serde(default)]
    pub end_year: Option<i32>,

    /// Quantile probabilities reported for the change distribution.
    #[serde(default = "default_quantiles")]
    pub quantiles: Vec<f64>,

    /// Percent-change thresholds for `P(change <= threshold)`.
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<f64>,

    /// Dropped-draw fraction above which the run warns.
    #[serde(default = "default_max_dropped_fraction")]
    pub max_dropped_fraction: f64,
}

impl Default for ChangeConfig {
    fn default() -> Self {
        Self {
            start_year: None,
            end_year: None,
            quantiles: default_quantiles(),
            thresholds: default_thresholds(),
            max_dropped_fraction: default_max_dropped_fraction(),
        }
    }
}

impl ChangeConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(ConfigError::InvalidValue {
                    field: "change.start_year".into(),
                    reason: format!("start year {start} is after end year {end}"),
                });
            }
        }
        if let Some(q) = self.quantiles.iter().find(|q| !(0.0..=1.0).contains(*q)) {
            return Err(ConfigError::InvalidValue {
                field: "change.quantiles".into(),
                reason: format!("probabilities must lie in [0, 1], got {q}"),
            });
        }
        if let Some(t) = self.thresholds.iter().find(|t| !t.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "change.thresholds".into(),
                reason: format!("thresholds must be finite, got {t}"),
            });
        }
        if !(0.0..=1.0).contains(&self.max_dropped_fraction) {
            return Err(ConfigError::InvalidValue {
                field: "change.max_dropped_fraction".into(),
                reason: format!("must lie in [0, 1], got {}", self.max_dropped_fraction),
            });
        }
        Ok(())
    }
}
