//! Posterior change pipeline: predict → aggregate → change → summarize.
//!
//! Each draw is independent and processed on a rayon pool:
//! 1. Predict every selected site in the start and end years
//! 2. Sum each year into a regional total for that draw
//! 3. Collect per-draw pairs in draw order
//!
//! The single-threaded reduction after the barrier computes per-draw percent
//! change and the summary statistics. Structural errors abort the whole run;
//! a zero start total only drops its own draw.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;
use rayon::prelude::*;
use roost_core::entities::{PosteriorDraw, PredictionResult, RegionalTotal, Site};
use roost_core::enums::{ExtrapolationPolicy, PredictionMode};
use roost_core::responses::{
    RegionalTrajectoryPoint, RunReport, TrajectoryPoint, TrajectoryResponse,
};

use crate::abundance::Link;
use crate::aggregate::{self, aggregate_draw};
use crate::change::{ChangeDistribution, SummaryOptions};
use crate::error::EngineError;
use crate::predict::Predictor;
use crate::registry::SiteRegistry;
use crate::stats;

/// Cooperative cancellation flag, checked once per draw.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Called with the number of draws finished so far. May run on any worker.
pub type Progress<'p> = &'p (dyn Fn(usize) + Sync);

/// Parameters of one regional change run.
#[derive(Debug, Clone)]
pub struct ChangeRequest {
    pub start_year: i32,
    pub end_year: i32,
    /// `None` selects every registered site.
    pub site_ids: Option<Vec<String>>,
    pub mode: PredictionMode,
    pub policy: ExtrapolationPolicy,
    pub summary: SummaryOptions,
    pub link: Link,
}

impl ChangeRequest {
    fn validate(&self) -> Result<(), EngineError> {
        if self.start_year > self.end_year {
            return Err(EngineError::InvalidRequest(format!(
                "start year {} is after end year {}",
                self.start_year, self.end_year
            )));
        }
        self.summary.validate()
    }
}

/// Parameters of a trajectory run.
#[derive(Debug, Clone)]
pub struct TrajectoryRequest {
    pub site_ids: Option<Vec<String>>,
    pub years: Vec<i32>,
    pub mode: PredictionMode,
    pub policy: ExtrapolationPolicy,
    pub link: Link,
}

/// A registry and draw table ready to answer change and trajectory requests.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    registry: &'a SiteRegistry,
    draws: &'a [PosteriorDraw],
    threads: usize,
}

impl<'a> Pipeline<'a> {
    /// # Errors
    ///
    /// Returns [`EngineError::Schema`] for an empty draw table.
    pub fn new(registry: &'a SiteRegistry, draws: &'a [PosteriorDraw]) -> Result<Self, EngineError> {
        if draws.is_empty() {
            return Err(EngineError::Schema("posterior draw table is empty".into()));
        }
        Ok(Self {
            registry,
            draws,
            threads: 0,
        })
    }

    /// Worker count for the per-draw map. `0` uses the rayon default.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    #[must_use]
    pub const fn draw_count(&self) -> usize {
        self.draws.len()
    }

    fn pool(&self) -> Result<rayon::ThreadPool, EngineError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if self.threads > 0 {
            builder = builder.num_threads(self.threads);
        }
        Ok(builder.build()?)
    }

    /// Run the per-draw map on the pool, in draw order.
    fn map_draws<T, F>(
        &self,
        cancel: &CancellationToken,
        progress: Option<Progress<'_>>,
        per_draw: F,
    ) -> Result<Vec<T>, EngineError>
    where
        T: Send,
        F: Fn(&PosteriorDraw) -> Result<T, EngineError> + Sync,
    {
        let finished = AtomicUsize::new(0);
        self.pool()?.install(|| {
            self.draws
                .par_iter()
                .map(|draw| {
                    if cancel.is_cancelled() {
                        return Err(EngineError::Cancelled);
                    }
                    let out = per_draw(draw)?;
                    let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(report) = progress {
                        report(done);
                    }
                    Ok(out)
                })
                .collect()
        })
    }

    /// Posterior distribution of regional percent change between two years.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Cancelled`] if `cancel` fires, or the first
    /// structural error any draw hits.
    pub fn run_change(
        &self,
        request: &ChangeRequest,
        cancel: &CancellationToken,
        progress: Option<Progress<'_>>,
    ) -> Result<RunReport, EngineError> {
        request.validate()?;
        let sites = self.registry.select(request.site_ids.as_deref())?;
        let predictor = Predictor::new(self.registry, request.link);
        let use_random_effects = request.mode.uses_random_effects();

        tracing::debug!(
            draws = self.draws.len(),
            sites = sites.len(),
            start = request.start_year,
            end = request.end_year,
            mode = %request.mode,
            "change run started"
        );

        let pairs = self.map_draws(cancel, progress, |draw| {
            let year_total = |year: i32| -> Result<RegionalTotal, EngineError> {
                let predictions = predictor.predict_year(draw, &sites, year, use_random_effects)?;
                aggregate_draw(draw.draw_index(), year, &predictions, request.policy)
            };
            Ok((year_total(request.start_year)?, year_total(request.end_year)?))
        })?;

        let distribution =
            ChangeDistribution::from_totals(request.start_year, request.end_year, &pairs)?;
        let summary = distribution.summarize(&request.summary);

        let clamped_predictions: u32 = pairs
            .iter()
            .map(|(start, end)| start.clamped_count + end.clamped_count)
            .sum();

        let mut warnings = Vec::new();
        if request.mode == PredictionMode::Marginal {
            warnings.push(
                "marginal totals omit site deviations; on the count scale they sit below the \
                 population average"
                    .to_string(),
            );
        }
        if clamped_predictions > 0 {
            tracing::warn!(
                clamped = clamped_predictions,
                ceiling = request.link.ceiling(),
                "predictions clamped at the overflow ceiling"
            );
            warnings.push(format!(
                "{clamped_predictions} site-year prediction(s) clamped at the overflow ceiling {}",
                request.link.ceiling()
            ));
        }
        if summary.extrapolated_fraction > 0.0 {
            warnings.push(format!(
                "{:.1}% of site-year predictions fall outside their site's observed years",
                summary.extrapolated_fraction * 100.0
            ));
        }
        if summary.excessive_drops {
            warnings.push(format!(
                "{} of {} draws dropped, above the {:.1}% limit",
                summary.dropped_total(),
                summary.draws_total,
                request.summary.max_dropped_fraction * 100.0
            ));
        }

        tracing::info!(
            draws_used = summary.draws_used,
            dropped = summary.dropped_total(),
            median = ?summary.median,
            extrapolated_fraction = summary.extrapolated_fraction,
            "change run finished"
        );

        Ok(RunReport {
            generated_at: Utc::now(),
            mode: request.mode,
            extrapolation_policy: request.policy,
            site_count: u32::try_from(sites.len()).unwrap_or(u32::MAX),
            summary,
            clamped_predictions,
            warnings,
            draws: distribution.values,
            totals: pairs.into_iter().flat_map(|(s, e)| [s, e]).collect(),
        })
    }

    /// Per-site and regional posterior bands of expected counts over years.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] for an empty year list, plus
    /// the errors of [`Self::run_change`].
    pub fn run_trajectory(
        &self,
        request: &TrajectoryRequest,
        cancel: &CancellationToken,
        progress: Option<Progress<'_>>,
    ) -> Result<TrajectoryResponse, EngineError> {
        let mut years = request.years.clone();
        years.sort_unstable();
        years.dedup();
        if years.is_empty() {
            return Err(EngineError::InvalidRequest("no trajectory years given".into()));
        }
        let sites = self.registry.select(request.site_ids.as_deref())?;
        let predictor = Predictor::new(self.registry, request.link);
        let use_random_effects = request.mode.uses_random_effects();

        // per draw, per year: site predictions and their regional total
        let per_draw: Vec<Vec<(Vec<PredictionResult>, RegionalTotal)>> =
            self.map_draws(cancel, progress, |draw| {
                years
                    .iter()
                    .map(|&year| -> Result<_, EngineError> {
                        let predictions =
                            predictor.predict_year(draw, &sites, year, use_random_effects)?;
                        let total =
                            aggregate_draw(draw.draw_index(), year, &predictions, request.policy)?;
                        Ok((predictions, total))
                    })
                    .collect()
            })?;

        let site_points = site_trajectories(&sites, &years, &per_draw)?;
        let regional = years
            .iter()
            .enumerate()
            .map(|(y, &year)| -> Result<_, EngineError> {
                let totals: Vec<&RegionalTotal> = per_draw.iter().map(|d| &d[y].1).collect();
                let values: Vec<f64> = totals.iter().map(|t| t.total).collect();
                let band = Band::of(&values)?;
                Ok(RegionalTrajectoryPoint {
                    year,
                    mean: band.mean,
                    q05: band.q05,
                    median: band.median,
                    q95: band.q95,
                    extrapolated_fraction: aggregate::extrapolated_fraction(totals),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            draws = self.draws.len(),
            sites = sites.len(),
            years = years.len(),
            "trajectory run finished"
        );

        Ok(TrajectoryResponse {
            mode: request.mode,
            draws: u32::try_from(self.draws.len()).unwrap_or(u32::MAX),
            sites: site_points,
            regional,
        })
    }
}

fn site_trajectories(
    sites: &[&Site],
    years: &[i32],
    per_draw: &[Vec<(Vec<PredictionResult>, RegionalTotal)>],
) -> Result<Vec<TrajectoryPoint>, EngineError> {
    let mut points = Vec::with_capacity(sites.len() * years.len());
    for (s, site) in sites.iter().enumerate() {
        for (y, &year) in years.iter().enumerate() {
            let predictions: Vec<&PredictionResult> =
                per_draw.iter().map(|draw| &draw[y].0[s]).collect();
            let values: Vec<f64> = predictions.iter().map(|p| p.expected_count).collect();
            let band = Band::of(&values)?;
            let clamped = predictions.iter().filter(|p| p.overflow_clamped).count();
            points.push(TrajectoryPoint {
                site_id: site.site_id.clone(),
                year,
                mean: band.mean,
                q05: band.q05,
                median: band.median,
                q95: band.q95,
                extrapolation: crate::extrapolation::flag(site, year),
                clamped_draws: u32::try_from(clamped).unwrap_or(u32::MAX),
            });
        }
    }
    Ok(points)
}

/// Mean and central 90% interval of a sample.
struct Band {
    mean: f64,
    q05: f64,
    median: f64,
    q95: f64,
}

impl Band {
    fn of(values: &[f64]) -> Result<Self, EngineError> {
        let sorted = stats::sorted(values);
        let empty = || EngineError::Schema("no draws to summarize".into());
        Ok(Self {
            mean: stats::mean(values).ok_or_else(empty)?,
            q05: stats::quantile_sorted(&sorted, 0.05).ok_or_else(empty)?,
            median: stats::quantile_sorted(&sorted, 0.5).ok_or_else(empty)?,
            q95: stats::quantile_sorted(&sorted, 0.95).ok_or_else(empty)?,
        })
    }
}
