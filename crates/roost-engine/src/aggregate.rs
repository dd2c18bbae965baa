//! Regional Aggregator: per-draw sums of site-level expected counts.

use std::collections::{BTreeMap, HashSet};

use roost_core::entities::{PredictionResult, RegionalTotal};
use roost_core::enums::ExtrapolationPolicy;

use crate::error::EngineError;
use crate::stats::kahan_sum;

/// Relative error allowed between totals of the same predictions summed in
/// different orders.
pub const SUMMATION_TOLERANCE: f64 = 1e-6;

/// Sum one draw's predictions for one year.
///
/// Extrapolated predictions are always counted in `extrapolated_count`; under
/// [`ExtrapolationPolicy::Exclude`] they are also left out of `total` and
/// counted in `excluded_count`.
///
/// # Errors
///
/// Returns [`EngineError::Schema`] if any prediction belongs to another draw
/// or year, or if a site appears twice.
pub fn aggregate_draw(
    draw_index: usize,
    year: i32,
    predictions: &[PredictionResult],
    policy: ExtrapolationPolicy,
) -> Result<RegionalTotal, EngineError> {
    let mut seen = HashSet::with_capacity(predictions.len());
    let mut site_count = 0u32;
    let mut extrapolated_count = 0u32;
    let mut excluded_count = 0u32;
    let mut clamped_count = 0u32;
    let mut included = Vec::with_capacity(predictions.len());

    for p in predictions {
        if p.draw_index != draw_index || p.year != year {
            return Err(EngineError::Schema(format!(
                "prediction for draw {} year {} fed to the total of draw {draw_index} year {year}",
                p.draw_index, p.year
            )));
        }
        if !seen.insert(p.site_id.as_str()) {
            return Err(EngineError::Schema(format!(
                "site {} appears twice in the total of draw {draw_index} year {year}",
                p.site_id
            )));
        }

        site_count += 1;
        if p.overflow_clamped {
            clamped_count += 1;
        }
        if p.extrapolation.is_extrapolated() {
            extrapolated_count += 1;
            if policy == ExtrapolationPolicy::Exclude {
                excluded_count += 1;
                continue;
            }
        }
        included.push(p.expected_count);
    }

    Ok(RegionalTotal {
        draw_index,
        year,
        total: kahan_sum(included),
        site_count,
        extrapolated_count,
        excluded_count,
        clamped_count,
    })
}

/// Group predictions for `year` by draw and sum each group.
///
/// Totals come back in draw order.
///
/// # Errors
///
/// Returns [`EngineError::Schema`] if a prediction is for a different year,
/// or as in [`aggregate_draw`].
pub fn aggregate(
    predictions: &[PredictionResult],
    year: i32,
    policy: ExtrapolationPolicy,
) -> Result<Vec<RegionalTotal>, EngineError> {
    let mut by_draw: BTreeMap<usize, Vec<PredictionResult>> = BTreeMap::new();
    for p in predictions {
        if p.year != year {
            return Err(EngineError::Schema(format!(
                "prediction for year {} fed to the {year} aggregate",
                p.year
            )));
        }
        by_draw.entry(p.draw_index).or_default().push(p.clone());
    }

    by_draw
        .into_iter()
        .map(|(draw_index, group)| aggregate_draw(draw_index, year, &group, policy))
        .collect()
}

/// Fraction of constituent site-year predictions that were extrapolated,
/// pooled over several totals.
#[must_use]
pub fn extrapolated_fraction<'a>(totals: impl IntoIterator<Item = &'a RegionalTotal>) -> f64 {
    let (extrapolated, sites) = totals.into_iter().fold((0u64, 0u64), |(e, s), t| {
        (
            e + u64::from(t.extrapolated_count),
            s + u64::from(t.site_count),
        )
    });
    if sites == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let fraction = extrapolated as f64 / sites as f64;
        fraction
    }
}
