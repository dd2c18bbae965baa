//! # roost-core
//!
//! Core value records, enums, and error types for Roost.
//!
//! This crate provides the foundational types shared across all Roost crates:
//! - Records for every pipeline stage (sites, posterior draws, predictions,
//!   regional totals, change summaries)
//! - Classification enums (extrapolation flags, prediction modes, decline
//!   categories)
//! - Cross-cutting error types
//! - CLI response types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod responses;
