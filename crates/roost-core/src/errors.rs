//! Cross-cutting error types for Roost.
//!
//! This module defines errors that can originate from value construction in
//! any crate. Pipeline errors (`EngineError`) live in `roost-engine` and
//! configuration errors in `roost-config`; they converge into `anyhow` in
//! `roost-cli`.

use thiserror::Error;

/// Errors raised while building or validating core records.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Record lookup returned no result.
    #[error("Not found: {kind} {id}")]
    NotFound { kind: String, id: String },

    /// A random-effect coefficient was supplied twice within one draw.
    #[error("Duplicate random effect {effect} for site {site_id} in draw {draw_index}")]
    DuplicateRandomEffect {
        draw_index: usize,
        effect: String,
        site_id: String,
    },

    /// Data failed validation (schema, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
