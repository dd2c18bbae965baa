//! Engine error types for roost-engine.

use roost_core::errors::CoreError;

/// Errors from registry construction, prediction, and pipeline runs.
///
/// `DivisionByZero` is the only per-draw error: the change estimator recovers
/// from it by dropping the draw and counting it. Everything else aborts the
/// run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Conditional prediction for a site the draw has no random effects for.
    #[error("missing random effect for site {site_id} in draw {draw_index}")]
    MissingRandomEffect { site_id: String, draw_index: usize },

    /// A draw's start-year regional total is exactly zero.
    #[error("division by zero: start-year total is zero in draw {draw_index}")]
    DivisionByZero { draw_index: usize },

    /// A site reached the core with too few observations to carry a trend.
    #[error("insufficient data for site {site_id}: {observations} observation(s), need at least 2")]
    InsufficientData { site_id: String, observations: u32 },

    /// A query named a site that is not in the registry.
    #[error("unknown site: {0}")]
    UnknownSite(String),

    /// Malformed or structurally inconsistent input tables.
    #[error("malformed input: {0}")]
    Schema(String),

    /// Request parameters that cannot produce a result.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The run was cancelled between draws.
    #[error("run cancelled")]
    Cancelled,

    /// Record validation failed.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Reading or writing a table failed.
    #[error("failed to read or write {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
