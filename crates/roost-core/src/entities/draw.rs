use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EffectType;
use crate::errors::CoreError;

/// Population-level coefficients of one posterior draw.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FixedEffects {
    pub intercept: f64,
    pub year_slope: f64,
    pub latitude_slope: f64,
    /// Coefficient of `z_year * z_latitude`.
    pub interaction: f64,
}

/// Structured address of one random-effect coefficient.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub struct RandomEffectKey {
    pub effect: EffectType,
    pub site_id: String,
}

impl RandomEffectKey {
    #[must_use]
    pub fn new(effect: EffectType, site_id: impl Into<String>) -> Self {
        Self {
            effect,
            site_id: site_id.into(),
        }
    }
}

/// One random-effect column value as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RandomEffectCoefficient {
    pub effect: EffectType,
    pub site_id: String,
    pub value: f64,
}

/// JSONL row of the posterior draw table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DrawRecord {
    pub draw_index: usize,
    pub fixed: FixedEffects,
    #[serde(default)]
    pub random: Vec<RandomEffectCoefficient>,
}

/// A site's complete random-effect deviations within one draw.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SiteDeviation {
    pub intercept_deviation: f64,
    pub year_slope_deviation: f64,
}

impl SiteDeviation {
    pub const ZERO: Self = Self {
        intercept_deviation: 0.0,
        year_slope_deviation: 0.0,
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct EffectSlots {
    intercept: Option<f64>,
    year_slope: Option<f64>,
}

impl EffectSlots {
    const fn slot_mut(&mut self, effect: EffectType) -> &mut Option<f64> {
        match effect {
            EffectType::Intercept => &mut self.intercept,
            EffectType::YearSlope => &mut self.year_slope,
        }
    }

    const fn get(&self, effect: EffectType) -> Option<f64> {
        match effect {
            EffectType::Intercept => self.intercept,
            EffectType::YearSlope => self.year_slope,
        }
    }
}

/// One sampled realization of every model parameter.
///
/// Random effects are stored by `(EffectType, site_id)` and never parsed out
/// of column names. Draws are read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DrawRecord", into = "DrawRecord")]
pub struct PosteriorDraw {
    draw_index: usize,
    fixed: FixedEffects,
    random: BTreeMap<String, EffectSlots>,
}

impl PosteriorDraw {
    /// A draw with fixed effects only.
    #[must_use]
    pub const fn new(draw_index: usize, fixed: FixedEffects) -> Self {
        Self {
            draw_index,
            fixed,
            random: BTreeMap::new(),
        }
    }

    /// Build a draw from typed random-effect coefficients.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateRandomEffect`] if a key repeats, and
    /// [`CoreError::Validation`] if any coefficient is not finite.
    pub fn from_parts(
        draw_index: usize,
        fixed: FixedEffects,
        coefficients: impl IntoIterator<Item = (RandomEffectKey, f64)>,
    ) -> Result<Self, CoreError> {
        let fixed_values = [
            fixed.intercept,
            fixed.year_slope,
            fixed.latitude_slope,
            fixed.interaction,
        ];
        if fixed_values.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::Validation(format!(
                "draw {draw_index} has a non-finite fixed effect"
            )));
        }

        let mut random: BTreeMap<String, EffectSlots> = BTreeMap::new();
        for (key, value) in coefficients {
            if !value.is_finite() {
                return Err(CoreError::Validation(format!(
                    "draw {draw_index} has a non-finite {} effect for site {}",
                    key.effect, key.site_id
                )));
            }
            let RandomEffectKey { effect, site_id } = key;
            let slot = random.entry(site_id.clone()).or_default().slot_mut(effect);
            if slot.is_some() {
                return Err(CoreError::DuplicateRandomEffect {
                    draw_index,
                    effect: effect.to_string(),
                    site_id,
                });
            }
            *slot = Some(value);
        }

        Ok(Self {
            draw_index,
            fixed,
            random,
        })
    }

    /// Set both deviations for a site, replacing any existing values.
    #[must_use]
    pub fn with_site(mut self, site_id: impl Into<String>, deviation: SiteDeviation) -> Self {
        self.random.insert(
            site_id.into(),
            EffectSlots {
                intercept: Some(deviation.intercept_deviation),
                year_slope: Some(deviation.year_slope_deviation),
            },
        );
        self
    }

    #[must_use]
    pub const fn draw_index(&self) -> usize {
        self.draw_index
    }

    #[must_use]
    pub const fn fixed(&self) -> &FixedEffects {
        &self.fixed
    }

    /// Look up one coefficient by its structured key.
    #[must_use]
    pub fn coefficient(&self, effect: EffectType, site_id: &str) -> Option<f64> {
        self.random.get(site_id).and_then(|slots| slots.get(effect))
    }

    /// Both deviations for a site, or `None` if either one was not modeled.
    #[must_use]
    pub fn random_effects(&self, site_id: &str) -> Option<SiteDeviation> {
        let slots = self.random.get(site_id)?;
        Some(SiteDeviation {
            intercept_deviation: slots.intercept?,
            year_slope_deviation: slots.year_slope?,
        })
    }

    /// Sites with at least one modeled coefficient, in sorted order.
    pub fn modeled_sites(&self) -> impl Iterator<Item = &str> {
        self.random.keys().map(String::as_str)
    }
}

impl TryFrom<DrawRecord> for PosteriorDraw {
    type Error = CoreError;

    fn try_from(record: DrawRecord) -> Result<Self, Self::Error> {
        let coefficients = record
            .random
            .into_iter()
            .map(|c| (RandomEffectKey::new(c.effect, c.site_id), c.value));
        Self::from_parts(record.draw_index, record.fixed, coefficients)
    }
}

impl From<PosteriorDraw> for DrawRecord {
    fn from(draw: PosteriorDraw) -> Self {
        let mut random = Vec::new();
        for (site_id, slots) in draw.random {
            for effect in [EffectType::Intercept, EffectType::YearSlope] {
                if let Some(value) = slots.get(effect) {
                    random.push(RandomEffectCoefficient {
                        effect,
                        site_id: site_id.clone(),
                        value,
                    });
                }
            }
        }
        Self {
            draw_index: draw.draw_index,
            fixed: draw.fixed,
            random,
        }
    }
}
