//! Greedy one-to-one ΔR matching between two collections.
//!
//! The assignment is global greedy: repeatedly take the smallest remaining
//! distance below the cutoff over the whole matrix, pair that row and column,
//! and remove both from further consideration. A row can therefore end up
//! paired with a column that is not its individually nearest one.
//!
//! Ties are broken by row-major scan order: the first minimum encountered
//! wins. Validation baselines depend on this exact procedure.

use crate::kinematics::{Direction, delta_r};

/// Row → column assignment produced by [`greedy_match`].
///
/// `Some(j)` entries are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(Vec<Option<usize>>);

impl Assignment {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column matched to `row`, if any (also `None` for out-of-range rows).
    pub fn get(&self, row: usize) -> Option<usize> {
        self.0.get(row).copied().flatten()
    }

    /// `true` if `row` has a match.
    pub fn is_matched(&self, row: usize) -> bool {
        self.get(row).is_some()
    }

    /// Number of matched rows.
    pub fn n_matched(&self) -> usize {
        self.0.iter().filter(|m| m.is_some()).count()
    }

    /// Per-row entries.
    pub fn as_slice(&self) -> &[Option<usize>] {
        &self.0
    }

    /// Matched `(row, column)` pairs in row order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().enumerate().filter_map(|(i, m)| m.map(|j| (i, j)))
    }
}

/// Greedy matching of `n_rows` × `n_cols` objects.
///
/// `distance(i, j)` is evaluated once per cell. Only distances strictly below
/// `max_distance` can match; NaN distances never match.
pub fn greedy_match<F>(n_rows: usize, n_cols: usize, max_distance: f64, mut distance: F) -> Assignment
where
    F: FnMut(usize, usize) -> f64,
{
    let mut result = vec![None; n_rows];
    if n_rows == 0 || n_cols == 0 {
        return Assignment(result);
    }

    // Row-major n_rows × n_cols. Taken cells are set to +inf.
    let mut matrix: Vec<f64> = Vec::with_capacity(n_rows * n_cols);
    for i in 0..n_rows {
        for j in 0..n_cols {
            matrix.push(distance(i, j));
        }
    }

    for _ in 0..n_rows {
        let mut best: Option<(usize, usize)> = None;
        let mut best_distance = max_distance;
        for (cell, &d) in matrix.iter().enumerate() {
            if d < best_distance {
                best_distance = d;
                best = Some((cell / n_cols, cell % n_cols));
            }
        }

        let Some((i_min, j_min)) = best else {
            break;
        };
        result[i_min] = Some(j_min);
        matrix[i_min * n_cols..(i_min + 1) * n_cols].fill(f64::INFINITY);
        for i in 0..n_rows {
            matrix[i * n_cols + j_min] = f64::INFINITY;
        }
    }

    Assignment(result)
}

/// Greedy ΔR matching of `rows` onto `cols`.
pub fn match_by_delta_r<A: Direction, B: Direction>(
    rows: &[A],
    cols: &[B],
    max_delta_r: f64,
) -> Assignment {
    greedy_match(rows.len(), cols.len(), max_delta_r, |i, j| delta_r(&rows[i], &cols[j]))
}
