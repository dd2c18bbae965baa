//! Execution settings for a pipeline run.

use roost_core::enums::{ExtrapolationPolicy, PredictionMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunConfig {
    /// Worker threads for the per-draw map. `0` uses the rayon default.
    #[serde(default)]
    pub threads: usize,

    /// Conditional (site-specific) or marginal (population-average) predictions.
    #[serde(default)]
    pub mode: PredictionMode,

    /// Whether extrapolated site-years count toward regional totals.
    #[serde(default)]
    pub extrapolation: ExtrapolationPolicy,
}
