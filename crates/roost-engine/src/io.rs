//! JSONL table readers and writers.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use roost_core::entities::{DrawChange, Observation, PosteriorDraw, Site, Standardization};
use serde::de::DeserializeOwned;

use crate::error::EngineError;

fn input_error(path: &Path) -> impl FnOnce(std::io::Error) -> EngineError + '_ {
    move |source| EngineError::Input {
        path: path.display().to_string(),
        source,
    }
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, EngineError> {
    let rows = serde_jsonlines::json_lines(path)
        .map_err(input_error(path))?
        .collect::<Result<Vec<T>, _>>()
        .map_err(input_error(path))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "table read");
    Ok(rows)
}

/// Cleaned observation rows.
///
/// # Errors
///
/// Returns [`EngineError::Input`] for unreadable files or malformed lines.
pub fn read_observations(path: &Path) -> Result<Vec<Observation>, EngineError> {
    read_table(path)
}

/// Pre-standardized site rows.
///
/// # Errors
///
/// Returns [`EngineError::Input`] for unreadable files or malformed lines.
pub fn read_sites(path: &Path) -> Result<Vec<Site>, EngineError> {
    read_table(path)
}

/// Fit-time standardization constants from a single JSON document.
///
/// # Errors
///
/// Returns [`EngineError::Input`] for an unreadable or malformed file.
pub fn read_standardization(path: &Path) -> Result<Standardization, EngineError> {
    let file = File::open(path).map_err(input_error(path))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| input_error(path)(std::io::Error::from(e)))
}

/// Posterior draws, one per line.
///
/// # Errors
///
/// Returns [`EngineError::Input`] for unreadable files or malformed lines
/// (including duplicate random-effect keys), and [`EngineError::Schema`] for
/// an empty table or a repeated `draw_index`.
pub fn read_draws(path: &Path) -> Result<Vec<PosteriorDraw>, EngineError> {
    let draws: Vec<PosteriorDraw> = read_table(path)?;
    if draws.is_empty() {
        return Err(EngineError::Schema(format!(
            "{} contains no posterior draws",
            path.display()
        )));
    }
    let mut seen = BTreeSet::new();
    for draw in &draws {
        if !seen.insert(draw.draw_index()) {
            return Err(EngineError::Schema(format!(
                "draw_index {} appears more than once in {}",
                draw.draw_index(),
                path.display()
            )));
        }
    }
    Ok(draws)
}

/// Per-draw percent changes, one per line.
///
/// # Errors
///
/// Returns [`EngineError::Input`] if the file cannot be written.
pub fn write_draw_changes(path: &Path, changes: &[DrawChange]) -> Result<(), EngineError> {
    serde_jsonlines::write_json_lines(path, changes).map_err(input_error(path))
}
