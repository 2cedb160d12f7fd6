//! geometrics eval - matching and metric aggregation
//!
//! This crate pairs reference and candidate shapes one-to-one (greedy or
//! optimal assignment), folds the per-unit results into confusion counts, and
//! drives batches of independent units on a tokio runtime.

pub mod aggregate;
pub mod batch;
pub mod greedy;
#[cfg(feature = "optimal")]
pub mod hungarian;
pub mod matcher;
pub mod strategy;
pub mod unit;

pub use aggregate::MetricSummary;
pub use batch::{BatchDriver, BatchProgress, StopHandle};
pub use matcher::{Matcher, PairGeneration};
pub use strategy::{assign, resolve_strategy, ResolvedStrategy, ScoredPair};
pub use unit::{check_unit_size, evaluate_unit, EvaluationUnit, UnitOutcome};
