//! # roost-engine
//!
//! Posterior prediction and aggregation for Roost.
//!
//! Turns a table of posterior draws from a Poisson log-link model into:
//! - Site-level expected counts per draw, flagged when outside the site's
//!   observed years
//! - Per-draw regional totals
//! - The posterior distribution of regional percent change and its summary
//! - Per-site and regional trajectories
//!
//! Every stage is a pure function over read-only inputs; [`Pipeline`] fans
//! the per-draw work out over a rayon pool.

pub mod abundance;
pub mod aggregate;
pub mod change;
pub mod error;
pub mod extrapolation;
pub mod io;
pub mod linear;
pub mod pipeline;
pub mod predict;
pub mod registry;
pub mod stats;

pub use abundance::Link;
pub use change::{ChangeDistribution, SummaryOptions};
pub use error::EngineError;
pub use pipeline::{CancellationToken, ChangeRequest, Pipeline, Progress, TrajectoryRequest};
pub use predict::Predictor;
pub use registry::SiteRegistry;
