//! Fixed-binning 1D/2D accumulators.
//!
//! Every axis carries an underflow slot (index 0) and an overflow slot
//! (index `n_bins + 1`) around its in-range bins. Content is the sum of
//! weights per cell; `sumw2` is the sum of squared weights.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::binning::BinEdges;
use crate::error::{Result, TrigValError};

/// A mutable histogram handle held by the registry.
pub trait Accumulator: Send + fmt::Debug {
    /// Histogram name.
    fn name(&self) -> &str;

    /// 1 or 2.
    fn dimension(&self) -> usize;

    /// Add `weight` at `x` (1D histograms).
    fn fill(&mut self, x: f64, weight: f64) -> Result<()>;

    /// Add `weight` at `(x, y)` (2D histograms).
    fn fill_2d(&mut self, x: f64, y: f64, weight: f64) -> Result<()>;

    /// Copy of the current contents.
    fn snapshot(&self) -> HistogramSnapshot;

    /// `Ok` if `other` has exactly this histogram's binning.
    fn check_compatible(&self, other: &HistogramSnapshot) -> Result<()>;

    /// Add the contents of `other`, which must have identical binning.
    fn merge(&mut self, other: &HistogramSnapshot) -> Result<()>;
}

/// Cell index along one axis, including flow slots.
///
/// `None` if the axis has no bins or `x` is NaN.
fn axis_slot(edges: &BinEdges, x: f64) -> Option<usize> {
    let e = edges.as_slice();
    if edges.is_empty() || x.is_nan() {
        return None;
    }
    if x < e[0] {
        Some(0)
    } else if x >= e[e.len() - 1] {
        Some(edges.n_bins() + 1)
    } else {
        edges.find_bin(x).map(|b| b + 1)
    }
}

fn add_into(sumw: &mut [f64], sumw2: &mut [f64], other: &HistogramSnapshot) {
    for (a, b) in sumw.iter_mut().zip(&other.contents) {
        *a += b;
    }
    for (a, b) in sumw2.iter_mut().zip(&other.sumw2) {
        *a += b;
    }
}

/// One-dimensional histogram.
#[derive(Debug, Clone)]
pub struct Histogram1D {
    name: String,
    title: String,
    edges: BinEdges,
    sumw: Vec<f64>,
    sumw2: Vec<f64>,
    entries: u64,
}

impl Histogram1D {
    /// Empty histogram with the given binning.
    pub fn new(name: impl Into<String>, title: impl Into<String>, edges: BinEdges) -> Self {
        let cells = if edges.is_empty() { 0 } else { edges.n_bins() + 2 };
        Self {
            name: name.into(),
            title: title.into(),
            edges,
            sumw: vec![0.0; cells],
            sumw2: vec![0.0; cells],
            entries: 0,
        }
    }
}

impl Accumulator for Histogram1D {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        1
    }

    fn fill(&mut self, x: f64, weight: f64) -> Result<()> {
        if let Some(slot) = axis_slot(&self.edges, x) {
            self.sumw[slot] += weight;
            self.sumw2[slot] += weight * weight;
            self.entries += 1;
        }
        Ok(())
    }

    fn fill_2d(&mut self, _x: f64, _y: f64, _weight: f64) -> Result<()> {
        Err(TrigValError::DimensionMismatch { name: self.name.clone(), booked: 1, filled: 2 })
    }

    fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            name: self.name.clone(),
            title: self.title.clone(),
            x_edges: self.edges.as_slice().to_vec(),
            y_edges: None,
            contents: self.sumw.clone(),
            sumw2: self.sumw2.clone(),
            entries: self.entries,
        }
    }

    fn check_compatible(&self, other: &HistogramSnapshot) -> Result<()> {
        if other.y_edges.is_some() || other.x_edges != self.edges.as_slice() {
            return Err(TrigValError::HistogramMerge(format!(
                "'{}' and '{}' have different binning",
                self.name, other.name
            )));
        }
        Ok(())
    }

    fn merge(&mut self, other: &HistogramSnapshot) -> Result<()> {
        self.check_compatible(other)?;
        add_into(&mut self.sumw, &mut self.sumw2, other);
        self.entries += other.entries;
        Ok(())
    }
}

/// Two-dimensional histogram.
#[derive(Debug, Clone)]
pub struct Histogram2D {
    name: String,
    title: String,
    x: BinEdges,
    y: BinEdges,
    sumw: Vec<f64>,
    sumw2: Vec<f64>,
    entries: u64,
}

impl Histogram2D {
    /// Empty histogram with the given binning.
    pub fn new(name: impl Into<String>, title: impl Into<String>, x: BinEdges, y: BinEdges) -> Self {
        let cells = if x.is_empty() || y.is_empty() {
            0
        } else {
            (x.n_bins() + 2) * (y.n_bins() + 2)
        };
        Self {
            name: name.into(),
            title: title.into(),
            x,
            y,
            sumw: vec![0.0; cells],
            sumw2: vec![0.0; cells],
            entries: 0,
        }
    }
}

impl Accumulator for Histogram2D {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        2
    }

    fn fill(&mut self, _x: f64, _weight: f64) -> Result<()> {
        Err(TrigValError::DimensionMismatch { name: self.name.clone(), booked: 2, filled: 1 })
    }

    fn fill_2d(&mut self, x: f64, y: f64, weight: f64) -> Result<()> {
        if let (Some(ix), Some(iy)) = (axis_slot(&self.x, x), axis_slot(&self.y, y)) {
            let cell = ix + (self.x.n_bins() + 2) * iy;
            self.sumw[cell] += weight;
            self.sumw2[cell] += weight * weight;
            self.entries += 1;
        }
        Ok(())
    }

    fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            name: self.name.clone(),
            title: self.title.clone(),
            x_edges: self.x.as_slice().to_vec(),
            y_edges: Some(self.y.as_slice().to_vec()),
            contents: self.sumw.clone(),
            sumw2: self.sumw2.clone(),
            entries: self.entries,
        }
    }

    fn check_compatible(&self, other: &HistogramSnapshot) -> Result<()> {
        if other.x_edges != self.x.as_slice() || other.y_edges.as_deref() != Some(self.y.as_slice())
        {
            return Err(TrigValError::HistogramMerge(format!(
                "'{}' and '{}' have different binning",
                self.name, other.name
            )));
        }
        Ok(())
    }

    fn merge(&mut self, other: &HistogramSnapshot) -> Result<()> {
        self.check_compatible(other)?;
        add_into(&mut self.sumw, &mut self.sumw2, other);
        self.entries += other.entries;
        Ok(())
    }
}

/// Point-in-time copy of a histogram, suitable for serialization.
///
/// `contents`/`sumw2` include flow cells. In 2D the layout is x-fastest:
/// cell `(ix, iy)` is at `ix + (nx + 2) * iy`, with flow slots at 0 and
/// `n + 1` on each axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    /// Histogram name (including folder when taken from a registry).
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// X-axis bin edges.
    pub x_edges: Vec<f64>,
    /// Y-axis bin edges (2D only).
    pub y_edges: Option<Vec<f64>>,
    /// Sum of weights per cell, including flow cells.
    pub contents: Vec<f64>,
    /// Sum of squared weights per cell, including flow cells.
    pub sumw2: Vec<f64>,
    /// Number of fills that landed in a cell.
    pub entries: u64,
}

impl HistogramSnapshot {
    /// 1 or 2.
    pub fn dimension(&self) -> usize {
        if self.y_edges.is_some() { 2 } else { 1 }
    }

    /// Number of in-range x bins.
    pub fn n_bins_x(&self) -> usize {
        self.x_edges.len().saturating_sub(1)
    }

    /// Number of in-range y bins (0 for 1D).
    pub fn n_bins_y(&self) -> usize {
        self.y_edges.as_ref().map(|e| e.len().saturating_sub(1)).unwrap_or(0)
    }

    fn cell(&self, ix: usize, iy: usize) -> f64 {
        self.contents.get(ix + (self.n_bins_x() + 2) * iy).copied().unwrap_or(0.0)
    }

    /// In-range bin contents of a 1D histogram.
    pub fn bin_contents(&self) -> Vec<f64> {
        (1..=self.n_bins_x()).map(|ix| self.cell(ix, 0)).collect()
    }

    /// Content of in-range bin `bin` (0-based) of a 1D histogram.
    pub fn bin_content(&self, bin: usize) -> f64 {
        self.cell(bin + 1, 0)
    }

    /// Content of in-range cell `(bx, by)` (0-based) of a 2D histogram.
    pub fn bin_content_2d(&self, bx: usize, by: usize) -> f64 {
        self.cell(bx + 1, by + 1)
    }

    /// Content of the 1D bin containing `x` (flow cells included).
    pub fn content_at(&self, x: f64) -> f64 {
        let edges = BinEdges::from_edges(self.x_edges.clone());
        axis_slot(&edges, x).map(|ix| self.cell(ix, 0)).unwrap_or(0.0)
    }

    /// Content of the 2D cell containing `(x, y)` (flow cells included).
    pub fn content_at_2d(&self, x: f64, y: f64) -> f64 {
        let xe = BinEdges::from_edges(self.x_edges.clone());
        let ye = BinEdges::from_edges(self.y_edges.clone().unwrap_or_default());
        match (axis_slot(&xe, x), axis_slot(&ye, y)) {
            (Some(ix), Some(iy)) => self.cell(ix, iy),
            _ => 0.0,
        }
    }

    /// Underflow content of a 1D histogram.
    pub fn underflow(&self) -> f64 {
        self.cell(0, 0)
    }

    /// Overflow content of a 1D histogram.
    pub fn overflow(&self) -> f64 {
        self.cell(self.n_bins_x() + 1, 0)
    }

    /// Sum of in-range contents.
    pub fn integral(&self) -> f64 {
        match self.dimension() {
            1 => self.bin_contents().iter().sum(),
            _ => (1..=self.n_bins_y())
                .flat_map(|iy| (1..=self.n_bins_x()).map(move |ix| (ix, iy)))
                .map(|(ix, iy)| self.cell(ix, iy))
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_1d_with_flows() {
        let mut h = Histogram1D::new("h", "", BinEdges::from_edges(vec![0.0, 1.0, 2.0, 3.0]));
        for x in [0.5, 1.5, 2.5, 0.5, -1.0, 3.5] {
            h.fill(x, 1.0).unwrap();
        }
        let s = h.snapshot();
        assert_eq!(s.bin_contents(), vec![2.0, 1.0, 1.0]);
        assert_eq!(s.underflow(), 1.0);
        assert_eq!(s.overflow(), 1.0);
        assert_eq!(s.entries, 6);
        assert_eq!(s.integral(), 4.0);
        assert_eq!(s.content_at(0.2), 2.0);
    }

    #[test]
    fn weights_and_sumw2() {
        let mut h = Histogram1D::new("h", "", BinEdges::uniform(2, 0.0, 2.0));
        h.fill(0.5, 2.0).unwrap();
        h.fill(1.5, 3.0).unwrap();
        h.fill(0.5, 1.0).unwrap();
        let s = h.snapshot();
        assert_eq!(s.bin_contents(), vec![3.0, 3.0]);
        assert_eq!(s.sumw2[1..3], [5.0, 9.0]);
    }

    #[test]
    fn no_bins_drops_fills() {
        let mut h = Histogram1D::new("h", "", BinEdges::default());
        h.fill(1.0, 1.0).unwrap();
        let s = h.snapshot();
        assert_eq!(s.entries, 0);
        assert!(s.contents.is_empty());
        assert_eq!(s.content_at(1.0), 0.0);
    }

    #[test]
    fn fill_2d_and_dimension_checks() {
        let mut h = Histogram2D::new(
            "h2",
            ";#eta;#phi",
            BinEdges::uniform(2, -1.0, 1.0),
            BinEdges::uniform(2, -3.0, 3.0),
        );
        h.fill_2d(0.5, -1.0, 1.0).unwrap();
        h.fill_2d(0.5, -1.0, 1.0).unwrap();
        h.fill_2d(-0.5, 2.0, 1.0).unwrap();
        h.fill_2d(5.0, 0.0, 1.0).unwrap();
        let s = h.snapshot();
        assert_eq!(s.bin_content_2d(1, 0), 2.0);
        assert_eq!(s.bin_content_2d(0, 1), 1.0);
        assert_eq!(s.content_at_2d(0.7, -2.0), 2.0);
        assert_eq!(s.integral(), 3.0);
        assert_eq!(s.entries, 4);

        assert!(matches!(h.fill(0.0, 1.0), Err(TrigValError::DimensionMismatch { .. })));
        let mut h1 = Histogram1D::new("h1", "", BinEdges::uniform(1, 0.0, 1.0));
        assert!(h1.fill_2d(0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn merge_adds_and_checks_binning() {
        let edges = BinEdges::uniform(2, 0.0, 2.0);
        let mut a = Histogram1D::new("a", "", edges.clone());
        let mut b = Histogram1D::new("a", "", edges);
        a.fill(0.5, 1.0).unwrap();
        b.fill(0.5, 1.0).unwrap();
        b.fill(1.5, 1.0).unwrap();
        a.merge(&b.snapshot()).unwrap();
        let s = a.snapshot();
        assert_eq!(s.bin_contents(), vec![2.0, 1.0]);
        assert_eq!(s.entries, 3);

        let c = Histogram1D::new("c", "", BinEdges::uniform(3, 0.0, 2.0));
        assert!(matches!(a.merge(&c.snapshot()), Err(TrigValError::HistogramMerge(_))));
    }

    #[test]
    fn snapshot_serializes() {
        let mut h = Histogram1D::new("h", "t", BinEdges::uniform(1, 0.0, 1.0));
        h.fill(0.5, 1.0).unwrap();
        let json = serde_json::to_string(&h.snapshot()).unwrap();
        let back: HistogramSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h.snapshot());
    }
}
