use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A survey site with its standardized covariates and observed window.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Site {
    pub site_id: String,
    pub latitude: f64,
    pub z_latitude: f64,
    pub first_observed_year: i32,
    pub last_observed_year: i32,
    pub count_of_observations: u32,
}

impl Site {
    /// Check the record invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when the site has no observations,
    /// an inverted year window, or a non-finite covariate.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.site_id.is_empty() {
            return Err(CoreError::Validation("site_id must not be empty".into()));
        }
        if self.count_of_observations < 1 {
            return Err(CoreError::Validation(format!(
                "site {} has no observations",
                self.site_id
            )));
        }
        if self.first_observed_year > self.last_observed_year {
            return Err(CoreError::Validation(format!(
                "site {} has first_observed_year {} after last_observed_year {}",
                self.site_id, self.first_observed_year, self.last_observed_year
            )));
        }
        if !self.latitude.is_finite() || !self.z_latitude.is_finite() {
            return Err(CoreError::Validation(format!(
                "site {} has a non-finite latitude covariate",
                self.site_id
            )));
        }
        Ok(())
    }
}

/// Centering and scaling constants fixed when the model was fit.
///
/// Query years are standardized with these constants, never with statistics
/// of the prediction grid.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Standardization {
    pub year_mean: f64,
    pub year_sd: f64,
    pub latitude_mean: f64,
    pub latitude_sd: f64,
    /// Largest count in the training sample; anchors the overflow ceiling.
    pub max_observed_count: u64,
}

impl Standardization {
    #[must_use]
    pub fn z_year(&self, year: i32) -> f64 {
        standardize(f64::from(year), self.year_mean, self.year_sd)
    }

    #[must_use]
    pub fn z_latitude(&self, latitude: f64) -> f64 {
        standardize(latitude, self.latitude_mean, self.latitude_sd)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for non-finite or negative scales.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("year_mean", self.year_mean),
            ("year_sd", self.year_sd),
            ("latitude_mean", self.latitude_mean),
            ("latitude_sd", self.latitude_sd),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(CoreError::Validation(format!("{name} must be finite")));
            }
        }
        if self.year_sd < 0.0 || self.latitude_sd < 0.0 {
            return Err(CoreError::Validation(
                "standard deviations must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// z-score with a zero scale treated as one (a constant covariate maps to 0).
fn standardize(value: f64, mean: f64, sd: f64) -> f64 {
    let scale = if sd > 0.0 { sd } else { 1.0 };
    (value - mean) / scale
}
