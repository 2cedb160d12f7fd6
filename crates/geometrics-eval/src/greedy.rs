use crate::strategy::ScoredPair;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Total order used by greedy matching: score descending, then reference id
/// ascending, then candidate id ascending
pub fn greedy_order(a: &ScoredPair, b: &ScoredPair) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.reference.cmp(&b.reference))
        .then_with(|| a.candidate.cmp(&b.candidate))
}

/// Commit the best remaining pair whose endpoints are both still free
pub fn assign(pairs: &[ScoredPair]) -> Vec<ScoredPair> {
    let mut ordered = pairs.to_vec();
    ordered.sort_by(greedy_order);

    let mut used_references = HashSet::new();
    let mut used_candidates = HashSet::new();
    let mut assigned = Vec::new();

    for pair in ordered {
        if used_references.contains(&pair.reference) || used_candidates.contains(&pair.candidate) {
            continue;
        }
        used_references.insert(pair.reference);
        used_candidates.insert(pair.candidate);
        assigned.push(pair);
    }

    assigned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_score_wins() {
        let pairs = vec![
            ScoredPair::new(0, 0, 0.6),
            ScoredPair::new(1, 0, 0.9),
            ScoredPair::new(1, 1, 0.7),
        ];

        let assigned = assign(&pairs);
        assert_eq!(assigned, vec![ScoredPair::new(1, 0, 0.9)]);
    }

    #[test]
    fn test_ties_break_on_reference_then_candidate() {
        let pairs = vec![
            ScoredPair::new(2, 1, 0.8),
            ScoredPair::new(1, 1, 0.8),
            ScoredPair::new(1, 0, 0.8),
        ];

        let assigned = assign(&pairs);
        // (1, 0) goes first, then (2, 1); (1, 1) is blocked by reference 1
        assert_eq!(assigned, vec![ScoredPair::new(1, 0, 0.8), ScoredPair::new(2, 1, 0.8)]);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut pairs = vec![
            ScoredPair::new(0, 0, 0.7),
            ScoredPair::new(0, 1, 0.7),
            ScoredPair::new(1, 0, 0.7),
            ScoredPair::new(1, 1, 0.5),
        ];
        let forward = assign(&pairs);
        pairs.reverse();
        assert_eq!(assign(&pairs), forward);
    }

    #[test]
    fn test_empty_input() {
        assert!(assign(&[]).is_empty());
    }
}
