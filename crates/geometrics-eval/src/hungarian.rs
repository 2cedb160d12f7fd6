//! Maximum-weight bipartite assignment (Hungarian algorithm with potentials).

use crate::strategy::ScoredPair;
use std::collections::BTreeMap;

/// Maximum total score one-to-one subset of `pairs`
///
/// The score matrix is compressed to the references and candidates that appear
/// in at least one pair. Cells without a pair weigh 0, and assignments onto
/// them are dropped.
pub fn assign(pairs: &[ScoredPair]) -> Vec<ScoredPair> {
    if pairs.is_empty() {
        return Vec::new();
    }

    let rows = compress(pairs.iter().map(|p| p.reference));
    let cols = compress(pairs.iter().map(|p| p.candidate));
    let row_ids: Vec<usize> = rows.keys().copied().collect();
    let col_ids: Vec<usize> = cols.keys().copied().collect();

    let mut weights = vec![vec![0.0; col_ids.len()]; row_ids.len()];
    for pair in pairs {
        weights[rows[&pair.reference]][cols[&pair.candidate]] = pair.score;
    }

    max_weight_assignment(&weights)
        .into_iter()
        .enumerate()
        .filter_map(|(row, col)| {
            let col = col?;
            let score = weights[row][col];
            (score > 0.0).then(|| ScoredPair::new(row_ids[row], col_ids[col], score))
        })
        .collect()
}

/// Dense index for each distinct id, in ascending id order
fn compress(ids: impl Iterator<Item = usize>) -> BTreeMap<usize, usize> {
    let mut map: BTreeMap<usize, usize> = ids.map(|id| (id, 0)).collect();
    for (position, slot) in map.values_mut().enumerate() {
        *slot = position;
    }
    map
}

/// Column assigned to each row that maximizes the total weight
///
/// Accepts rectangular matrices; rows left without a column get `None`.
pub fn max_weight_assignment(weights: &[Vec<f64>]) -> Vec<Option<usize>> {
    let n = weights.len();
    let m = weights.first().map_or(0, |row| row.len());
    if n == 0 || m == 0 {
        return vec![None; n];
    }

    if n <= m {
        let cost: Vec<Vec<f64>> =
            weights.iter().map(|row| row.iter().map(|w| -w).collect()).collect();
        min_cost_assignment(&cost).into_iter().map(Some).collect()
    } else {
        // Solve the transpose so that rows never outnumber columns
        let cost: Vec<Vec<f64>> =
            (0..m).map(|j| (0..n).map(|i| -weights[i][j]).collect()).collect();
        let mut by_row = vec![None; n];
        for (col, row) in min_cost_assignment(&cost).into_iter().enumerate() {
            by_row[row] = Some(col);
        }
        by_row
    }
}

/// Minimum-cost assignment of every row to a distinct column (rows <= columns)
fn min_cost_assignment(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    let m = cost[0].len();

    // 1-based potentials; column 0 is a virtual start column
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; m + 1];
    let mut owner = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for row in 1..=n {
        owner[0] = row;
        let mut j0 = 0;
        let mut min_slack = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let slack = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        // Augment along the alternating path
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0; n];
    for j in 1..=m {
        if owner[j] != 0 {
            assignment[owner[j] - 1] = j - 1;
        }
    }
    assignment
}
