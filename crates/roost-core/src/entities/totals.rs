use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sum of expected counts over the queried sites for one draw and year.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RegionalTotal {
    pub draw_index: usize,
    pub year: i32,
    pub total: f64,
    /// Site-year predictions fed to the aggregator.
    pub site_count: u32,
    /// Constituent predictions outside their site's observed window.
    pub extrapolated_count: u32,
    /// Extrapolated predictions left out of `total` by policy.
    pub excluded_count: u32,
    /// Constituent predictions whose value hit the overflow ceiling.
    pub clamped_count: u32,
}

impl RegionalTotal {
    /// Fraction of constituent site-year predictions that were extrapolated.
    #[must_use]
    pub fn extrapolated_fraction(&self) -> f64 {
        if self.site_count == 0 {
            0.0
        } else {
            f64::from(self.extrapolated_count) / f64::from(self.site_count)
        }
    }
}
