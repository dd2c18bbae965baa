use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{DeclineCategory, DropReason};

/// Percent change between the reference years for one draw.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DrawChange {
    pub draw_index: usize,
    pub percent_change: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct QuantileValue {
    pub probability: f64,
    pub value: f64,
}

/// `P(percent_change <= threshold)` over the empirical distribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ThresholdProbability {
    pub threshold: f64,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CategoryProbability {
    pub category: DeclineCategory,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DroppedDraws {
    pub reason: DropReason,
    pub count: u32,
}

/// Summary of the per-draw percent-change distribution.
///
/// Statistics are `None` when every draw was dropped.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ChangeSummary {
    pub start_year: i32,
    pub end_year: i32,
    pub mean: Option<f64>,
    pub sd: Option<f64>,
    pub median: Option<f64>,
    pub quantiles: Vec<QuantileValue>,
    pub p_decline_at_threshold: Vec<ThresholdProbability>,
    pub category_probabilities: Vec<CategoryProbability>,
    pub median_category: Option<DeclineCategory>,
    /// Fraction of site-year predictions behind the totals that were extrapolated.
    pub extrapolated_fraction: f64,
    pub draws_total: u32,
    pub draws_used: u32,
    pub dropped: Vec<DroppedDraws>,
    pub dropped_fraction: f64,
    /// More draws were dropped than the configured tolerance allows.
    pub excessive_drops: bool,
}

impl ChangeSummary {
    #[must_use]
    pub fn dropped_total(&self) -> u32 {
        self.dropped.iter().map(|d| d.count).sum()
    }

    /// Look up the quantile recorded for `probability`.
    #[must_use]
    pub fn quantile(&self, probability: f64) -> Option<f64> {
        self.quantiles
            .iter()
            .find(|q| (q.probability - probability).abs() < 1e-12)
            .map(|q| q.value)
    }

    /// Look up the exceedance probability recorded for `threshold`.
    #[must_use]
    pub fn p_decline(&self, threshold: f64) -> Option<f64> {
        self.p_decline_at_threshold
            .iter()
            .find(|t| (t.threshold - threshold).abs() < 1e-12)
            .map(|t| t.probability)
    }
}
