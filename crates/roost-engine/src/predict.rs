//! Per-query prediction: linear predictor, inverse link, and extrapolation flag.

use roost_core::entities::{PosteriorDraw, PredictionQuery, PredictionResult, Site};

use crate::abundance::Link;
use crate::error::EngineError;
use crate::registry::SiteRegistry;
use crate::{extrapolation, linear};

/// Turns prediction queries into expected counts for one draw at a time.
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'a> {
    registry: &'a SiteRegistry,
    link: Link,
}

impl<'a> Predictor<'a> {
    #[must_use]
    pub const fn new(registry: &'a SiteRegistry, link: Link) -> Self {
        Self { registry, link }
    }

    #[must_use]
    pub const fn link(&self) -> Link {
        self.link
    }

    /// # Errors
    ///
    /// Returns [`EngineError::UnknownSite`] or
    /// [`EngineError::MissingRandomEffect`].
    pub fn predict(
        &self,
        draw: &PosteriorDraw,
        query: &PredictionQuery,
    ) -> Result<PredictionResult, EngineError> {
        let site = self.registry.site(&query.site_id)?;
        self.predict_site(draw, site, query.year, query.use_random_effects)
    }

    /// Same as [`Self::predict`] for an already resolved site.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingRandomEffect`].
    pub fn predict_site(
        &self,
        draw: &PosteriorDraw,
        site: &Site,
        year: i32,
        use_random_effects: bool,
    ) -> Result<PredictionResult, EngineError> {
        let eta = linear::evaluate(
            self.registry.standardization(),
            draw,
            site,
            year,
            use_random_effects,
        )?;
        let abundance = self.link.predict(eta);
        Ok(PredictionResult {
            draw_index: draw.draw_index(),
            site_id: site.site_id.clone(),
            year,
            expected_count: abundance.expected_count,
            overflow_clamped: abundance.overflow_clamped,
            extrapolation: extrapolation::flag(site, year),
        })
    }

    /// Predictions for every given site in one year.
    ///
    /// # Errors
    ///
    /// Returns the first per-site error.
    pub fn predict_year(
        &self,
        draw: &PosteriorDraw,
        sites: &[&Site],
        year: i32,
        use_random_effects: bool,
    ) -> Result<Vec<PredictionResult>, EngineError> {
        sites
            .iter()
            .map(|site| self.predict_site(draw, site, year, use_random_effects))
            .collect()
    }
}
