//! Loading the site registry, draw table, and link from command arguments.

use std::path::Path;

use anyhow::Context;
use roost_config::RoostConfig;
use roost_core::entities::PosteriorDraw;
use roost_engine::{Link, SiteRegistry, io};

use crate::cli::root_commands::{InputArgs, PredictionArgs};

pub fn load_registry(input: &InputArgs) -> anyhow::Result<SiteRegistry> {
    let registry = match (&input.observations, &input.sites, &input.standardization) {
        (Some(observations), _, _) => {
            let rows = io::read_observations(observations)?;
            SiteRegistry::from_observations(&rows).with_context(|| {
                format!("failed to build sites from {}", observations.display())
            })?
        }
        (None, Some(sites), Some(standardization)) => {
            let rows = io::read_sites(sites)?;
            let constants = io::read_standardization(standardization)?;
            SiteRegistry::new(rows, constants)
                .with_context(|| format!("failed to load sites from {}", sites.display()))?
        }
        _ => anyhow::bail!("provide --observations, or --sites together with --standardization"),
    };
    tracing::debug!(sites = registry.len(), "registry loaded");
    Ok(registry)
}

pub fn load_draws(path: &Path) -> anyhow::Result<Vec<PosteriorDraw>> {
    let draws = io::read_draws(path)?;
    tracing::debug!(draws = draws.len(), path = %path.display(), "draws loaded");
    Ok(draws)
}

/// Explicit ceiling from flags or config, else a multiple of the largest
/// observed count.
pub fn link(
    prediction: &PredictionArgs,
    config: &RoostConfig,
    registry: &SiteRegistry,
) -> anyhow::Result<Link> {
    let link = match prediction.max_expected_count.or(config.model.max_expected_count) {
        Some(ceiling) => Link::with_ceiling(ceiling)?,
        None => Link::from_observed_max(
            registry.standardization().max_observed_count,
            config.model.ceiling_multiplier,
        )?,
    };
    Ok(link)
}

/// Flag value when given, otherwise the configured one.
pub fn list_or(flag: &[f64], configured: &[f64]) -> Vec<f64> {
    if flag.is_empty() {
        configured.to_vec()
    } else {
        flag.to_vec()
    }
}

pub fn site_selection(prediction: &PredictionArgs) -> Option<Vec<String>> {
    (!prediction.site_ids.is_empty()).then(|| prediction.site_ids.clone())
}
