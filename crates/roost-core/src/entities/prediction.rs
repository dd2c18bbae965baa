use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ExtrapolationFlag;

/// A single (site, year) prediction request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PredictionQuery {
    pub site_id: String,
    /// Need not lie within the site's observed window.
    pub year: i32,
    pub use_random_effects: bool,
}

/// Expected count for one draw, site, and year.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PredictionResult {
    pub draw_index: usize,
    pub site_id: String,
    pub year: i32,
    /// Always `>= 0`; capped at the configured ceiling.
    pub expected_count: f64,
    /// The linear predictor exceeded the ceiling and was clamped.
    pub overflow_clamped: bool,
    pub extrapolation: ExtrapolationFlag,
}
