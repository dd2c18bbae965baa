//! Value records for every Roost pipeline stage.
//!
//! All records are produced once per run and never mutated afterwards. They
//! derive `Serialize`, `Deserialize`, and `JsonSchema` so the CLI can emit
//! them directly and publish their schema. `PosteriorDraw` serializes through
//! its wire form [`DrawRecord`].

mod change;
mod draw;
mod observation;
mod prediction;
mod site;
mod totals;

pub use change::{
    CategoryProbability, ChangeSummary, DrawChange, DroppedDraws, QuantileValue,
    ThresholdProbability,
};
pub use draw::{
    DrawRecord, FixedEffects, PosteriorDraw, RandomEffectCoefficient, RandomEffectKey,
    SiteDeviation,
};
pub use observation::Observation;
pub use prediction::{PredictionQuery, PredictionResult};
pub use site::{Site, Standardization};
pub use totals::RegionalTotal;
