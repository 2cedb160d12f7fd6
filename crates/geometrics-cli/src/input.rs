//! Loading evaluation units from JSON input files

use crate::errors;
use anyhow::{Context, Result};
use geometrics_core::models::UnitInput;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level layout of an input file
#[derive(Debug, Deserialize)]
struct InputFile {
    units: Vec<UnitInput>,
}

/// Read every unit from `path`
///
/// Shapes are not validated here; invalid shapes are excluded per unit later.
pub fn load_units(path: &Path) -> Result<Vec<UnitInput>> {
    if !path.exists() {
        return Err(errors::input_not_found(path).into());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;

    let input: InputFile = serde_json::from_str(&content)
        .map_err(|e| errors::invalid_input(path, &e.to_string()))?;

    tracing::debug!(units = input.units.len(), "Loaded input file {}", path.display());
    Ok(input.units)
}
