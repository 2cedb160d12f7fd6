use crate::greedy;
#[cfg(feature = "optimal")]
use crate::hungarian;
use geometrics_core::models::MatchStrategy;
use serde::{Deserialize, Serialize};

/// A reference/candidate pair with its overlap score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub reference: usize,
    pub candidate: usize,
    pub score: f64,
}

impl ScoredPair {
    pub fn new(reference: usize, candidate: usize, score: f64) -> Self {
        Self { reference, candidate, score }
    }
}

/// Assignment strategy that is actually available in this build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedStrategy {
    Greedy,
    #[cfg(feature = "optimal")]
    Optimal,
}

impl ResolvedStrategy {
    /// Strategy name recorded in reports
    pub fn as_match_strategy(&self) -> MatchStrategy {
        match self {
            ResolvedStrategy::Greedy => MatchStrategy::Greedy,
            #[cfg(feature = "optimal")]
            ResolvedStrategy::Optimal => MatchStrategy::Optimal,
        }
    }
}

/// Resolve the requested strategy once, at configuration time
///
/// Without the `optimal` feature an optimal request falls back to greedy.
pub fn resolve_strategy(requested: MatchStrategy) -> ResolvedStrategy {
    match requested {
        MatchStrategy::Greedy => ResolvedStrategy::Greedy,
        #[cfg(feature = "optimal")]
        MatchStrategy::Optimal => ResolvedStrategy::Optimal,
        #[cfg(not(feature = "optimal"))]
        MatchStrategy::Optimal => {
            tracing::warn!(
                "Optimal matching is not compiled in (feature \"optimal\"); falling back to greedy"
            );
            ResolvedStrategy::Greedy
        }
    }
}

/// Select a one-to-one subset of eligible pairs
///
/// Every input pair must already be eligible. The output is sorted by
/// reference id.
pub fn assign(pairs: &[ScoredPair], strategy: ResolvedStrategy) -> Vec<ScoredPair> {
    let mut assigned = match strategy {
        ResolvedStrategy::Greedy => greedy::assign(pairs),
        #[cfg(feature = "optimal")]
        ResolvedStrategy::Optimal => hungarian::assign(pairs),
    };
    assigned.sort_by_key(|p| p.reference);
    assigned
}
