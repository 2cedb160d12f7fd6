//! Error types for geometrics

use crate::models::GeometryKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometricsError {
    // Geometry errors (unit-local: the shape is excluded and counted)
    #[error("Invalid geometry at shape {shape}: {reason}")]
    InvalidGeometry { shape: String, reason: String },

    #[error("Degenerate geometry at shape {shape}: {kind} has zero measure")]
    DegenerateGeometry { shape: String, kind: GeometryKind },

    // Configuration errors (fatal before any work starts)
    #[error("Invalid configuration value for {key}: {reason}")]
    Configuration { key: String, reason: String },

    // Batch errors
    #[error("Evaluation unit {unit} failed: {reason}")]
    UnitFailed { unit: String, reason: String },

    #[error("Batch aborted: {0}")]
    BatchAborted(String),
}

impl GeometricsError {
    /// Shorthand for a configuration error
    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        GeometricsError::Configuration { key: key.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, GeometricsError>;
