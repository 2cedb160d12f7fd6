use serde::{Deserialize, Serialize};
use std::fmt;

/// Assignment strategy used by the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Commit the highest remaining score until no eligible pair is left
    #[default]
    Greedy,
    /// Maximum-weight bipartite assignment
    Optimal,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::Greedy => f.write_str("greedy"),
            MatchStrategy::Optimal => f.write_str("optimal"),
        }
    }
}

/// A committed reference/candidate pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub reference: usize,
    pub candidate: usize,
    pub score: f64,
    /// Category the true positive is attributed to (the reference's)
    pub category: Option<String>,
}

/// A reference or candidate left without a partner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unmatched {
    pub id: usize,
    pub category: Option<String>,
}

/// Matcher output for one evaluation unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Sorted by reference id
    pub matches: Vec<MatchedPair>,
    /// Ascending id
    pub unmatched_references: Vec<Unmatched>,
    /// Ascending id
    pub unmatched_candidates: Vec<Unmatched>,
}
