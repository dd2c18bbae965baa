//! Abundance Predictor: inverse log link with an overflow ceiling.

use crate::error::EngineError;

/// Expected count produced by [`Link::predict`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Abundance {
    pub expected_count: f64,
    pub overflow_clamped: bool,
}

/// Exponential inverse link capped at `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    ceiling: f64,
    max_exponent: f64,
}

impl Link {
    /// Default multiple of the largest training count used as the ceiling.
    pub const DEFAULT_CEILING_MULTIPLIER: f64 = 10.0;

    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] unless `ceiling` is finite and positive.
    pub fn with_ceiling(ceiling: f64) -> Result<Self, EngineError> {
        if !(ceiling.is_finite() && ceiling > 0.0) {
            return Err(EngineError::InvalidRequest(format!(
                "expected-count ceiling must be finite and positive, got {ceiling}"
            )));
        }
        Ok(Self {
            ceiling,
            max_exponent: ceiling.ln(),
        })
    }

    /// Ceiling at `multiplier` times the largest observed count. A zero
    /// maximum is treated as one.
    ///
    /// # Errors
    ///
    /// See [`Self::with_ceiling`].
    pub fn from_observed_max(max_observed_count: u64, multiplier: f64) -> Result<Self, EngineError> {
        #[allow(clippy::cast_precision_loss)]
        let base = max_observed_count.max(1) as f64;
        Self::with_ceiling(base * multiplier)
    }

    #[must_use]
    pub const fn ceiling(&self) -> f64 {
        self.ceiling
    }

    #[must_use]
    pub const fn max_exponent(&self) -> f64 {
        self.max_exponent
    }

    /// `exp(linear_predictor)`, clamped to the ceiling.
    ///
    /// Strictly increasing in the linear predictor up to `max_exponent`. A
    /// NaN or oversized argument yields the ceiling with `overflow_clamped`.
    #[must_use]
    pub fn predict(&self, linear_predictor: f64) -> Abundance {
        if linear_predictor.is_nan() || linear_predictor > self.max_exponent {
            return Abundance {
                expected_count: self.ceiling,
                overflow_clamped: true,
            };
        }
        Abundance {
            expected_count: linear_predictor.exp().min(self.ceiling),
            overflow_clamped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_below_ceiling() {
        let link = Link::with_ceiling(1000.0).unwrap();
        let a = link.predict(2.0);
        assert!((a.expected_count - 2.0_f64.exp()).abs() < 1e-12);
        assert!(!a.overflow_clamped);
    }

    #[test]
    fn large_arguments_are_clamped_and_flagged() {
        let link = Link::from_observed_max(500, 10.0).unwrap();
        for lp in [50.0, 800.0, f64::INFINITY, f64::NAN] {
            let a = link.predict(lp);
            assert!((a.expected_count - 5000.0).abs() < f64::EPSILON);
            assert!(a.overflow_clamped);
        }
    }

    #[test]
    fn strictly_increasing_below_ceiling() {
        let link = Link::with_ceiling(1.0e6).unwrap();
        let grid: Vec<f64> = (-40..=13).map(|i| f64::from(i) * 0.5).collect();
        for pair in grid.windows(2) {
            let lo = link.predict(pair[0]).expected_count;
            let hi = link.predict(pair[1]).expected_count;
            assert!(hi > lo, "exp({}) = {hi} not above exp({}) = {lo}", pair[1], pair[0]);
        }
    }

    #[test]
    fn negative_infinity_is_zero() {
        let link = Link::with_ceiling(10.0).unwrap();
        let a = link.predict(f64::NEG_INFINITY);
        assert!(a.expected_count.abs() < f64::EPSILON);
        assert!(!a.overflow_clamped);
    }

    #[test]
    fn zero_maximum_uses_floor_of_one() {
        let link = Link::from_observed_max(0, 10.0).unwrap();
        assert!((link.ceiling() - 10.0).abs() < f64::EPSILON);
        assert!(Link::with_ceiling(0.0).is_err());
    }
}
