//! Site Registry: immutable site table plus fit-time standardization constants.

use std::collections::{BTreeMap, btree_map::Entry};

use roost_core::entities::{Observation, Site, Standardization};

use crate::error::EngineError;
use crate::stats;

/// Minimum observations a site needs to carry a trend.
pub const MIN_OBSERVATIONS: u32 = 2;

/// Read-only table of sites keyed by id.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    sites: BTreeMap<String, Site>,
    standardization: Standardization,
}

#[derive(Debug)]
struct SiteAccumulator {
    first: i32,
    last: i32,
    observations: u32,
    latitude_sum: f64,
}

impl SiteRegistry {
    /// Build from pre-standardized site rows.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Schema`] for duplicate ids or an empty table,
    /// [`EngineError::Core`] for rows that break record invariants, and
    /// [`EngineError::InsufficientData`] for sites with fewer than two
    /// observations.
    pub fn new(sites: Vec<Site>, standardization: Standardization) -> Result<Self, EngineError> {
        standardization.validate()?;
        if sites.is_empty() {
            return Err(EngineError::Schema("site table is empty".into()));
        }

        let mut by_id = BTreeMap::new();
        for site in sites {
            site.validate()?;
            if site.count_of_observations < MIN_OBSERVATIONS {
                return Err(EngineError::InsufficientData {
                    site_id: site.site_id,
                    observations: site.count_of_observations,
                });
            }
            match by_id.entry(site.site_id.clone()) {
                Entry::Occupied(_) => {
                    return Err(EngineError::Schema(format!(
                        "duplicate site id {}",
                        site.site_id
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(site);
                }
            }
        }

        tracing::debug!(sites = by_id.len(), "site registry built");
        Ok(Self {
            sites: by_id,
            standardization,
        })
    }

    /// Derive sites and standardization constants from cleaned observations.
    ///
    /// Year constants come from every observation row; latitude constants
    /// come from one mean latitude per site. Both use the sample standard
    /// deviation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Schema`] for an empty table or a non-finite
    /// latitude, and [`EngineError::InsufficientData`] for the first site (in
    /// id order) with fewer than two observations.
    pub fn from_observations(observations: &[Observation]) -> Result<Self, EngineError> {
        if observations.is_empty() {
            return Err(EngineError::Schema("observation table is empty".into()));
        }

        let mut accumulators: BTreeMap<&str, SiteAccumulator> = BTreeMap::new();
        let mut years = Vec::with_capacity(observations.len());
        let mut max_observed_count = 0u64;

        for obs in observations {
            if obs.site_id.is_empty() {
                return Err(EngineError::Schema("observation with empty site_id".into()));
            }
            if !obs.latitude.is_finite() {
                return Err(EngineError::Schema(format!(
                    "observation for site {} in {} has a non-finite latitude",
                    obs.site_id, obs.year
                )));
            }
            years.push(f64::from(obs.year));
            max_observed_count = max_observed_count.max(obs.count);

            let acc = accumulators
                .entry(obs.site_id.as_str())
                .or_insert(SiteAccumulator {
                    first: obs.year,
                    last: obs.year,
                    observations: 0,
                    latitude_sum: 0.0,
                });
            acc.first = acc.first.min(obs.year);
            acc.last = acc.last.max(obs.year);
            acc.observations += 1;
            acc.latitude_sum += obs.latitude;
        }

        if let Some((site_id, acc)) = accumulators
            .iter()
            .find(|(_, acc)| acc.observations < MIN_OBSERVATIONS)
        {
            return Err(EngineError::InsufficientData {
                site_id: (*site_id).to_string(),
                observations: acc.observations,
            });
        }

        let latitudes: Vec<f64> = accumulators
            .values()
            .map(|acc| acc.latitude_sum / f64::from(acc.observations))
            .collect();

        let standardization = Standardization {
            year_mean: stats::mean(&years).unwrap_or_default(),
            year_sd: stats::sample_sd(&years).unwrap_or_default(),
            latitude_mean: stats::mean(&latitudes).unwrap_or_default(),
            latitude_sd: stats::sample_sd(&latitudes).unwrap_or_default(),
            max_observed_count,
        };

        let sites = accumulators
            .into_iter()
            .zip(latitudes)
            .map(|((site_id, acc), latitude)| Site {
                site_id: site_id.to_string(),
                latitude,
                z_latitude: standardization.z_latitude(latitude),
                first_observed_year: acc.first,
                last_observed_year: acc.last,
                count_of_observations: acc.observations,
            })
            .collect();

        Self::new(sites, standardization)
    }

    #[must_use]
    pub fn get(&self, site_id: &str) -> Option<&Site> {
        self.sites.get(site_id)
    }

    /// Like [`Self::get`], but a missing site is an error.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownSite`].
    pub fn site(&self, site_id: &str) -> Result<&Site, EngineError> {
        self.get(site_id)
            .ok_or_else(|| EngineError::UnknownSite(site_id.to_string()))
    }

    /// Resolve an optional id list to sites; `None` selects every site.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownSite`] for an unregistered id and
    /// [`EngineError::InvalidRequest`] for an empty or repeated selection.
    pub fn select(&self, site_ids: Option<&[String]>) -> Result<Vec<&Site>, EngineError> {
        let Some(ids) = site_ids else {
            return Ok(self.sites.values().collect());
        };
        if ids.is_empty() {
            return Err(EngineError::InvalidRequest("site selection is empty".into()));
        }
        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            let site = self.site(id)?;
            if selected.iter().any(|s: &&Site| s.site_id == site.site_id) {
                return Err(EngineError::InvalidRequest(format!(
                    "site {id} selected more than once"
                )));
            }
            selected.push(site);
        }
        Ok(selected)
    }

    /// Sites in id order.
    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    #[must_use]
    pub const fn standardization(&self) -> &Standardization {
        &self.standardization
    }

    #[must_use]
    pub fn z_year(&self, year: i32) -> f64 {
        self.standardization.z_year(year)
    }

    /// Earliest first-observed and latest last-observed year across sites.
    #[must_use]
    pub fn observed_span(&self) -> Option<(i32, i32)> {
        let first = self.sites.values().map(|s| s.first_observed_year).min()?;
        let last = self.sites.values().map(|s| s.last_observed_year).max()?;
        Some((first, last))
    }
}
