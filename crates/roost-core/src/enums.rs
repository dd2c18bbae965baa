//! Classification enums shared across Roost crates.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and round-trip through `as_str()` / [`FromStr`] so the CLI can accept them
//! as flag values.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// EffectType
// ---------------------------------------------------------------------------

/// Which per-site random-effect coefficient a draw column holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    /// Deviation from the fixed intercept.
    Intercept,
    /// Deviation from the fixed year slope.
    YearSlope,
}

impl EffectType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intercept => "intercept",
            Self::YearSlope => "year_slope",
        }
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExtrapolationFlag
// ---------------------------------------------------------------------------

/// Position of a query year relative to a site's observed window.
///
/// ```text
/// extrapolated_before | [first_observed_year ..= last_observed_year] | extrapolated_after
///                              within_range
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtrapolationFlag {
    WithinRange,
    ExtrapolatedBefore,
    ExtrapolatedAfter,
}

impl ExtrapolationFlag {
    /// Whether the prediction rests on extrapolation rather than interpolation.
    #[must_use]
    pub const fn is_extrapolated(self) -> bool {
        !matches!(self, Self::WithinRange)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WithinRange => "within_range",
            Self::ExtrapolatedBefore => "extrapolated_before",
            Self::ExtrapolatedAfter => "extrapolated_after",
        }
    }
}

impl fmt::Display for ExtrapolationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PredictionMode
// ---------------------------------------------------------------------------

/// Prediction semantics.
///
/// `Conditional` includes each site's random-effect deviations. `Marginal`
/// drops them and yields the population-average linear predictor; summing
/// marginal per-site predictions describes regional average behaviour, not
/// total abundance, because the log link is nonlinear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMode {
    #[default]
    Conditional,
    Marginal,
}

impl PredictionMode {
    #[must_use]
    pub const fn uses_random_effects(self) -> bool {
        matches!(self, Self::Conditional)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conditional => "conditional",
            Self::Marginal => "marginal",
        }
    }
}

impl fmt::Display for PredictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictionMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conditional" => Ok(Self::Conditional),
            "marginal" => Ok(Self::Marginal),
            other => Err(CoreError::Validation(format!(
                "unknown prediction mode '{other}' (expected conditional or marginal)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ExtrapolationPolicy
// ---------------------------------------------------------------------------

/// How the regional aggregator treats extrapolated site-years.
///
/// The default includes them and carries the flag forward; `Exclude` leaves
/// them out of the sum while still counting them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtrapolationPolicy {
    #[default]
    Include,
    Exclude,
}

impl ExtrapolationPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Exclude => "exclude",
        }
    }
}

impl fmt::Display for ExtrapolationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtrapolationPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "include" => Ok(Self::Include),
            "exclude" => Ok(Self::Exclude),
            other => Err(CoreError::Validation(format!(
                "unknown extrapolation policy '{other}' (expected include or exclude)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// DropReason
// ---------------------------------------------------------------------------

/// Why a posterior draw was left out of the change distribution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The start-year regional total was exactly zero.
    DivisionByZero,
    /// The percent change was NaN or infinite.
    NonFinite,
}

impl DropReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DivisionByZero => "division_by_zero",
            Self::NonFinite => "non_finite",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DeclineCategory
// ---------------------------------------------------------------------------

/// Display bucket for a percent change.
///
/// Buckets are half-open and contiguous, so every finite value falls in
/// exactly one:
///
/// ```text
/// decline_over_75 | decline_50_75 | decline_25_50 | decline_0_25 | increase
///            -75 ]          -50 ]          -25 ]             0 ]
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DeclineCategory {
    #[serde(rename = "decline_over_75")]
    DeclineOver75,
    #[serde(rename = "decline_50_75")]
    Decline50To75,
    #[serde(rename = "decline_25_50")]
    Decline25To50,
    #[serde(rename = "decline_0_25")]
    Decline0To25,
    Increase,
}

impl DeclineCategory {
    /// Every bucket, from steepest decline to increase.
    pub const ALL: [Self; 5] = [
        Self::DeclineOver75,
        Self::Decline50To75,
        Self::Decline25To50,
        Self::Decline0To25,
        Self::Increase,
    ];

    /// Bucket a percent change. Returns `None` for NaN.
    #[must_use]
    pub fn classify(percent_change: f64) -> Option<Self> {
        if percent_change.is_nan() {
            return None;
        }
        let category = if percent_change <= -75.0 {
            Self::DeclineOver75
        } else if percent_change <= -50.0 {
            Self::Decline50To75
        } else if percent_change <= -25.0 {
            Self::Decline25To50
        } else if percent_change <= 0.0 {
            Self::Decline0To25
        } else {
            Self::Increase
        };
        Some(category)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeclineOver75 => "decline_over_75",
            Self::Decline50To75 => "decline_50_75",
            Self::Decline25To50 => "decline_25_50",
            Self::Decline0To25 => "decline_0_25",
            Self::Increase => "increase",
        }
    }
}

impl fmt::Display for DeclineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
