//! Linear Predictor Evaluator.
//!
//! Evaluates the log-scale linear predictor of the Poisson model:
//!
//! ```text
//! eta = b0 + b_year*z_year + b_lat*z_lat + b_int*z_year*z_lat
//!     [+ u0(site) + u1(site)*z_year]      (conditional only)
//! ```
//!
//! Marginal evaluation drops the site deviations and is the same for every
//! site sharing `z_lat`. Summing `exp(eta)` over sites in marginal mode
//! describes regional average behaviour, not total abundance: dropping the
//! random effects after the fact, instead of integrating them out, biases the
//! expected count downward under the log link.

use roost_core::entities::{PosteriorDraw, Site, Standardization};

use crate::error::EngineError;

/// # Errors
///
/// Returns [`EngineError::MissingRandomEffect`] when `use_random_effects` is
/// set and the draw has no complete deviations for the site. The deviations
/// are never defaulted to zero.
pub fn evaluate(
    standardization: &Standardization,
    draw: &PosteriorDraw,
    site: &Site,
    year: i32,
    use_random_effects: bool,
) -> Result<f64, EngineError> {
    let z_year = standardization.z_year(year);
    let z_lat = site.z_latitude;
    let b = draw.fixed();

    let fixed = b.interaction.mul_add(
        z_year * z_lat,
        b.latitude_slope
            .mul_add(z_lat, b.year_slope.mul_add(z_year, b.intercept)),
    );

    if !use_random_effects {
        return Ok(fixed);
    }

    let deviation = draw
        .random_effects(&site.site_id)
        .ok_or_else(|| EngineError::MissingRandomEffect {
            site_id: site.site_id.clone(),
            draw_index: draw.draw_index(),
        })?;

    Ok(deviation
        .year_slope_deviation
        .mul_add(z_year, fixed + deviation.intercept_deviation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_core::entities::{FixedEffects, SiteDeviation};

    fn standardization() -> Standardization {
        Standardization {
            year_mean: 2000.0,
            year_sd: 10.0,
            latitude_mean: 40.0,
            latitude_sd: 2.0,
            max_observed_count: 100,
        }
    }

    fn site(id: &str, z_latitude: f64) -> Site {
        Site {
            site_id: id.into(),
            latitude: 40.0 + 2.0 * z_latitude,
            z_latitude,
            first_observed_year: 1995,
            last_observed_year: 2005,
            count_of_observations: 8,
        }
    }

    fn draw() -> PosteriorDraw {
        PosteriorDraw::new(
            0,
            FixedEffects {
                intercept: 2.0,
                year_slope: 0.5,
                latitude_slope: -0.25,
                interaction: 0.1,
            },
        )
        .with_site(
            "A",
            SiteDeviation {
                intercept_deviation: 0.3,
                year_slope_deviation: -0.2,
            },
        )
    }

    #[test]
    fn fixed_part_matches_formula() {
        // z_year = 1.0, z_lat = 1.0
        let eta = evaluate(&standardization(), &draw(), &site("A", 1.0), 2010, false).unwrap();
        assert!((eta - (2.0 + 0.5 - 0.25 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn conditional_adds_site_deviations() {
        let eta = evaluate(&standardization(), &draw(), &site("A", 1.0), 2010, true).unwrap();
        assert!((eta - (2.35 + 0.3 - 0.2)).abs() < 1e-12);
    }

    #[test]
    fn missing_random_effect_is_surfaced() {
        let err = evaluate(&standardization(), &draw(), &site("B", 0.0), 2010, true).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingRandomEffect { ref site_id, draw_index: 0 } if site_id == "B"
        ));
    }

    #[test]
    fn marginal_is_identical_for_shared_covariates() {
        let a = evaluate(&standardization(), &draw(), &site("A", 0.5), 2003, false).unwrap();
        let b = evaluate(&standardization(), &draw(), &site("B", 0.5), 2003, false).unwrap();
        assert!((a - b).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_deviations_make_conditional_equal_marginal() {
        let d = draw().with_site("A", SiteDeviation::ZERO);
        for year in [1980, 2000, 2024] {
            let c = evaluate(&standardization(), &d, &site("A", -0.7), year, true).unwrap();
            let m = evaluate(&standardization(), &d, &site("A", -0.7), year, false).unwrap();
            assert!((c - m).abs() < f64::EPSILON);
        }
    }
}
