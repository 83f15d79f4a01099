//! Bin-edge resolution from configured binning specs.
//!
//! A binning spec is a list of numbers: `[n, lo, hi]` for `n` uniform bins,
//! or an explicit list of four or more edges. Edges are expected to be
//! strictly increasing; that is a configuration precondition and is not
//! checked here.

use serde::{Deserialize, Serialize};

/// Ordered bin edges (length = number of bins + 1, or empty for "no bins").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinEdges(Vec<f64>);

impl BinEdges {
    /// Wrap explicit edges.
    pub fn from_edges(edges: Vec<f64>) -> Self {
        Self(edges)
    }

    /// `n` uniform bins on `[lo, hi)`.
    pub fn uniform(n: usize, lo: f64, hi: f64) -> Self {
        if n == 0 {
            return Self::default();
        }
        let width = (hi - lo) / n as f64;
        Self((0..=n).map(|i| lo + width * i as f64).collect())
    }

    /// Number of bins (0 when fewer than two edges).
    pub fn n_bins(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// `true` if there are no bins.
    pub fn is_empty(&self) -> bool {
        self.n_bins() == 0
    }

    /// The edges.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Index of the bin containing `x`; see [`find_bin`].
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        find_bin(&self.0, x)
    }
}

/// Resolve a named binning spec into edges.
///
/// Specs with fewer than three numbers are invalid: a warning is logged and
/// no edges are produced.
pub fn resolve_edges(name: &str, spec: &[f64]) -> BinEdges {
    match spec.len() {
        0..=2 => {
            log::warn!(
                "invalid binning parameters for '{name}': expected [n, lo, hi] or >= 4 edges, got {} value(s)",
                spec.len()
            );
            BinEdges::default()
        }
        3 => {
            // The bin count is stored as a float; truncate it.
            let n = if spec[0].is_finite() && spec[0] > 0.0 { spec[0] as usize } else { 0 };
            if n == 0 {
                log::warn!("binning '{name}' asks for {} bins; booking with no bins", spec[0]);
            }
            BinEdges::uniform(n, spec[1], spec[2])
        }
        _ => BinEdges::from_edges(spec.to_vec()),
    }
}

/// Find the bin index for a value given sorted bin edges.
///
/// Bins are `[lo, hi)`. Returns `None` for underflow/overflow, NaN, or when
/// there are fewer than two edges.
pub fn find_bin(edges: &[f64], x: f64) -> Option<usize> {
    let (&first, &last) = (edges.first()?, edges.last()?);
    if edges.len() < 2 || !(x >= first && x < last) {
        return None;
    }
    // Number of edges <= x, minus one.
    let upper = edges.partition_point(|&e| e <= x);
    Some(upper - 1)
}
