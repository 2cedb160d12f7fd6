//! geometrics core - domain models, errors and configuration
//!
//! This crate contains the shared vocabulary of the geometrics workspace: raw
//! geometries, evaluation unit inputs, match results, metric reports and the
//! layered evaluation configuration.

pub mod config;
pub mod error;
pub mod models;

pub use config::EvaluationConfig;
pub use error::{GeometricsError, Result};
