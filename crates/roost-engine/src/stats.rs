//! Empirical statistics over per-draw samples.

use std::cmp::Ordering;

/// Compensated (Kahan) summation.
///
/// Keeps the rounding error of a sum independent of the number of terms, so
/// reordering the inputs moves the result by far less than
/// [`crate::aggregate::SUMMATION_TOLERANCE`].
#[must_use]
pub fn kahan_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut c = 0.0;
    for value in values {
        let y = value - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }
    sum
}

#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    Some(kahan_sum(values.iter().copied()) / n)
}

/// Sample standard deviation (`n - 1` denominator). A single value has zero spread.
#[must_use]
pub fn sample_sd(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    if values.len() < 2 {
        return Some(0.0);
    }
    #[allow(clippy::cast_precision_loss)]
    let denom = (values.len() - 1) as f64;
    let ss = kahan_sum(values.iter().map(|x| (x - mean).powi(2)));
    Some((ss / denom).sqrt())
}

/// Sort a copy of `values` ascending. NaN compares equal and should be
/// filtered out beforehand.
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Quantile of an ascending slice using linear interpolation between order
/// statistics (R-7: `h = (n - 1) * p`).
#[must_use]
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let n = sorted.len();
    if n == 1 {
        return Some(sorted[0]);
    }

    #[allow(clippy::cast_precision_loss)]
    let h = p * (n - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower = h.floor() as usize;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let upper = h.ceil() as usize;

    if lower == upper {
        return Some(sorted[lower]);
    }
    #[allow(clippy::cast_precision_loss)]
    let frac = h - lower as f64;
    Some(sorted[lower].mul_add(1.0 - frac, sorted[upper] * frac))
}

/// Fraction of an ascending slice that is `<= threshold`.
#[must_use]
pub fn fraction_at_most(sorted: &[f64], threshold: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let count = sorted.partition_point(|v| *v <= threshold);
    #[allow(clippy::cast_precision_loss)]
    Some(count as f64 / sorted.len() as f64)
}
