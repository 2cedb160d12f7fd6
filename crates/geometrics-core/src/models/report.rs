//! Finalized metric reports.

use crate::models::matching::MatchStrategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw confusion counts plus the running overlap sum of the true positives
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Counts {
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub overlap_sum: f64,
}

impl Counts {
    pub fn add(&mut self, other: &Counts) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
        self.overlap_sum += other.overlap_sum;
    }
}

/// A ratio that may be undefined because its denominator is zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricValue {
    Value(f64),
    Undefined,
}

impl MetricValue {
    /// `numerator / denominator`, undefined when the denominator is zero
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            MetricValue::Undefined
        } else {
            MetricValue::Value(numerator / denominator)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(*v),
            MetricValue::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, MetricValue::Undefined)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Value(v) => write!(f, "{:.4}", v),
            MetricValue::Undefined => f.write_str("undefined"),
        }
    }
}

/// Precision, recall, F1 and mean overlap for one bucket
///
/// - precision is undefined when TP + FP = 0
/// - recall is undefined when TP + FN = 0
/// - F1 is undefined when precision or recall is, and 0 when both are 0
/// - mean overlap is undefined when TP = 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub precision: MetricValue,
    pub recall: MetricValue,
    pub f1: MetricValue,
    pub mean_overlap: MetricValue,
}

impl MetricSet {
    pub fn from_counts(counts: &Counts) -> Self {
        let tp = counts.true_positives as f64;
        let precision = MetricValue::ratio(tp, tp + counts.false_positives as f64);
        let recall = MetricValue::ratio(tp, tp + counts.false_negatives as f64);

        let f1 = match (precision, recall) {
            (MetricValue::Value(p), MetricValue::Value(r)) => {
                if p + r == 0.0 {
                    MetricValue::Value(0.0)
                } else {
                    MetricValue::Value(2.0 * p * r / (p + r))
                }
            }
            _ => MetricValue::Undefined,
        };

        Self {
            true_positives: counts.true_positives,
            false_positives: counts.false_positives,
            false_negatives: counts.false_negatives,
            precision,
            recall,
            f1,
            mean_overlap: MetricValue::ratio(counts.overlap_sum, tp),
        }
    }
}

/// Final report of an evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub threshold: f64,
    pub strategy: MatchStrategy,
    pub global: MetricSet,
    /// Empty unless per-category reporting is enabled
    pub categories: BTreeMap<String, MetricSet>,
    pub units_evaluated: usize,
    pub units_failed: usize,
    pub units_skipped: usize,
    pub shapes_excluded: usize,
    pub units_with_exclusions: usize,
    /// Candidates dropped by the confidence floor; not counted as errors
    pub candidates_filtered: usize,
    pub stopped_early: bool,
    pub generated_at: DateTime<Utc>,
}
