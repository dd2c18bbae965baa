use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One cleaned, deduplicated count: a single season at a single site.
///
/// This is the projection of the raw survey table that Roost consumes.
/// Filtering by species, count type, or accuracy happens upstream.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Observation {
    pub site_id: String,
    /// Starting year of the survey season.
    pub year: i32,
    pub count: u64,
    pub latitude: f64,
}
