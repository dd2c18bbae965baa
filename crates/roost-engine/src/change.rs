//! Change Estimator.
//!
//! Percent change is computed per draw from that draw's own pair of regional
//! totals, then summarized over the empirical distribution of per-draw
//! values. Summarizing point predictions instead would discard the
//! within-draw correlation between the start and end totals.

use std::collections::BTreeMap;

use roost_core::entities::{
    CategoryProbability, ChangeSummary, DrawChange, DroppedDraws, QuantileValue, RegionalTotal,
    ThresholdProbability,
};
use roost_core::enums::{DeclineCategory, DropReason};

use crate::aggregate;
use crate::error::EngineError;
use crate::stats;

/// `100 * (end - start) / start` for one draw.
///
/// # Errors
///
/// Returns [`EngineError::DivisionByZero`] when the start total is exactly
/// zero, and [`EngineError::Schema`] when the totals come from different draws.
pub fn percent_change(start: &RegionalTotal, end: &RegionalTotal) -> Result<f64, EngineError> {
    if start.draw_index != end.draw_index {
        return Err(EngineError::Schema(format!(
            "start total from draw {} paired with end total from draw {}",
            start.draw_index, end.draw_index
        )));
    }
    if start.total == 0.0 {
        return Err(EngineError::DivisionByZero {
            draw_index: start.draw_index,
        });
    }
    Ok(100.0 * (end.total - start.total) / start.total)
}

/// Summary statistics to report.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOptions {
    pub quantiles: Vec<f64>,
    pub thresholds: Vec<f64>,
    /// Dropped-draw fraction above which the summary is marked and a warning logged.
    pub max_dropped_fraction: f64,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            quantiles: vec![0.05, 0.5, 0.95],
            thresholds: vec![-30.0, -50.0],
            max_dropped_fraction: 0.05,
        }
    }
}

impl SummaryOptions {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] for probabilities outside
    /// `[0, 1]` or non-finite thresholds.
    pub fn validate(&self) -> Result<(), EngineError> {
        if let Some(q) = self.quantiles.iter().find(|q| !(0.0..=1.0).contains(*q)) {
            return Err(EngineError::InvalidRequest(format!(
                "quantile probability {q} is outside [0, 1]"
            )));
        }
        if let Some(t) = self.thresholds.iter().find(|t| !t.is_finite()) {
            return Err(EngineError::InvalidRequest(format!(
                "threshold {t} is not finite"
            )));
        }
        if !(0.0..=1.0).contains(&self.max_dropped_fraction) {
            return Err(EngineError::InvalidRequest(format!(
                "max dropped fraction {} is outside [0, 1]",
                self.max_dropped_fraction
            )));
        }
        Ok(())
    }
}

/// Per-draw percent changes plus the draws that could not contribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeDistribution {
    pub start_year: i32,
    pub end_year: i32,
    pub values: Vec<DrawChange>,
    pub dropped: BTreeMap<DropReason, u32>,
    pub draws_total: u32,
    pub extrapolated_fraction: f64,
}

impl ChangeDistribution {
    /// Compute per-draw changes, dropping degenerate draws with a count.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Schema`] for mismatched pairs, and
    /// [`EngineError::InvalidRequest`] when the extrapolation policy left no
    /// site in the start or end total. Division by zero from a degenerate
    /// draw is recovered, never returned.
    pub fn from_totals(
        start_year: i32,
        end_year: i32,
        pairs: &[(RegionalTotal, RegionalTotal)],
    ) -> Result<Self, EngineError> {
        let mut values = Vec::with_capacity(pairs.len());
        let mut dropped: BTreeMap<DropReason, u32> = BTreeMap::new();

        for (start, end) in pairs {
            if start.year != start_year || end.year != end_year {
                return Err(EngineError::Schema(format!(
                    "draw {} totals are for {}..{}, expected {start_year}..{end_year}",
                    start.draw_index, start.year, end.year
                )));
            }
            for total in [start, end] {
                if total.site_count > 0 && total.excluded_count == total.site_count {
                    return Err(EngineError::InvalidRequest(format!(
                        "every site-year in {} was excluded as extrapolated; \
                         choose a year inside the sites' observed range or include extrapolation",
                        total.year
                    )));
                }
            }
            match percent_change(start, end) {
                Ok(value) if value.is_finite() => values.push(DrawChange {
                    draw_index: start.draw_index,
                    percent_change: value,
                }),
                Ok(_) => {
                    tracing::debug!(draw = start.draw_index, "non-finite percent change dropped");
                    *dropped.entry(DropReason::NonFinite).or_default() += 1;
                }
                Err(EngineError::DivisionByZero { draw_index }) => {
                    tracing::debug!(draw = draw_index, "zero start total, draw dropped");
                    *dropped.entry(DropReason::DivisionByZero).or_default() += 1;
                }
                Err(other) => return Err(other),
            }
        }

        let extrapolated_fraction =
            aggregate::extrapolated_fraction(pairs.iter().flat_map(|(s, e)| [s, e]));

        Ok(Self {
            start_year,
            end_year,
            values,
            dropped,
            draws_total: u32::try_from(pairs.len()).unwrap_or(u32::MAX),
            extrapolated_fraction,
        })
    }

    #[must_use]
    pub fn dropped_total(&self) -> u32 {
        self.dropped.values().sum()
    }

    /// Summarize the empirical distribution of per-draw values.
    #[must_use]
    pub fn summarize(&self, options: &SummaryOptions) -> ChangeSummary {
        let raw: Vec<f64> = self.values.iter().map(|d| d.percent_change).collect();
        let sorted = stats::sorted(&raw);

        let dropped_total = self.dropped_total();
        let dropped_fraction = if self.draws_total == 0 {
            0.0
        } else {
            f64::from(dropped_total) / f64::from(self.draws_total)
        };
        let excessive_drops = dropped_fraction > options.max_dropped_fraction;
        if excessive_drops {
            tracing::warn!(
                dropped = dropped_total,
                total = self.draws_total,
                fraction = dropped_fraction,
                limit = options.max_dropped_fraction,
                "dropped draw fraction exceeds limit; the upstream model may be poorly specified or unconverged"
            );
        }

        let quantiles = options
            .quantiles
            .iter()
            .filter_map(|&p| {
                stats::quantile_sorted(&sorted, p).map(|value| QuantileValue {
                    probability: p,
                    value,
                })
            })
            .collect();

        let p_decline_at_threshold = options
            .thresholds
            .iter()
            .filter_map(|&t| {
                stats::fraction_at_most(&sorted, t).map(|probability| ThresholdProbability {
                    threshold: t,
                    probability,
                })
            })
            .collect();

        let median = stats::quantile_sorted(&sorted, 0.5);

        ChangeSummary {
            start_year: self.start_year,
            end_year: self.end_year,
            mean: stats::mean(&raw),
            sd: stats::sample_sd(&raw),
            median,
            quantiles,
            p_decline_at_threshold,
            category_probabilities: category_probabilities(&sorted),
            median_category: median.and_then(DeclineCategory::classify),
            extrapolated_fraction: self.extrapolated_fraction,
            draws_total: self.draws_total,
            draws_used: u32::try_from(self.values.len()).unwrap_or(u32::MAX),
            dropped: self
                .dropped
                .iter()
                .map(|(&reason, &count)| DroppedDraws { reason, count })
                .collect(),
            dropped_fraction,
            excessive_drops,
        }
    }
}

/// Posterior mass in each decline bucket. Empty for an empty sample.
fn category_probabilities(values: &[f64]) -> Vec<CategoryProbability> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut counts: BTreeMap<DeclineCategory, usize> = BTreeMap::new();
    for &v in values {
        if let Some(category) = DeclineCategory::classify(v) {
            *counts.entry(category).or_default() += 1;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    DeclineCategory::ALL
        .iter()
        .map(|&category| {
            #[allow(clippy::cast_precision_loss)]
            let count = counts.get(&category).copied().unwrap_or(0) as f64;
            CategoryProbability {
                category,
                probability: count / n,
            }
        })
        .collect()
}
