//! Response types returned as JSON by `roost` commands.
//!
//! These structs define the shape of output for `roost change`,
//! `roost trajectory`, `roost sites`, and `roost classify`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ChangeSummary, DrawChange, RegionalTotal, Site, Standardization};
use crate::enums::{DeclineCategory, ExtrapolationFlag, ExtrapolationPolicy, PredictionMode};

/// Response from `roost change`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub mode: PredictionMode,
    pub extrapolation_policy: ExtrapolationPolicy,
    pub site_count: u32,
    pub summary: ChangeSummary,
    /// Predictions whose value hit the overflow ceiling, across all draws.
    pub clamped_predictions: u32,
    /// Human-readable diagnostics (excessive drops, clamping, marginal caveat).
    pub warnings: Vec<String>,
    pub draws: Vec<DrawChange>,
    pub totals: Vec<RegionalTotal>,
}

/// Posterior summary of one site's expected count in one year.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TrajectoryPoint {
    pub site_id: String,
    pub year: i32,
    pub mean: f64,
    pub q05: f64,
    pub median: f64,
    pub q95: f64,
    pub extrapolation: ExtrapolationFlag,
    /// Draws whose prediction hit the overflow ceiling.
    pub clamped_draws: u32,
}

/// Posterior summary of the regional total in one year.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RegionalTrajectoryPoint {
    pub year: i32,
    pub mean: f64,
    pub q05: f64,
    pub median: f64,
    pub q95: f64,
    pub extrapolated_fraction: f64,
}

/// Response from `roost trajectory`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TrajectoryResponse {
    pub mode: PredictionMode,
    pub draws: u32,
    pub sites: Vec<TrajectoryPoint>,
    pub regional: Vec<RegionalTrajectoryPoint>,
}

/// Response from `roost sites`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SitesResponse {
    pub standardization: Standardization,
    pub sites: Vec<Site>,
}

/// Response from `roost classify`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ClassifyResponse {
    pub percent_change: f64,
    pub category: DeclineCategory,
}
