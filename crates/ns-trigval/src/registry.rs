//! Name → histogram registry.
//!
//! Booking happens once per run, before any fill. Fills address histograms by
//! their short name; a fill on an unknown name or with the wrong dimension is
//! logged and skipped so that one bad fill never aborts event processing.

use std::collections::BTreeMap;

use crate::binning::BinEdges;
use crate::error::{Result, TrigValError};
use crate::histogram::{Accumulator, Histogram1D, Histogram2D, HistogramSnapshot};

/// Histograms of one folder, keyed by short name.
#[derive(Debug, Default)]
pub struct HistogramRegistry {
    folder: String,
    hists: BTreeMap<String, Box<dyn Accumulator>>,
}

impl HistogramRegistry {
    /// Empty registry booking into `folder`.
    pub fn new(folder: impl Into<String>) -> Self {
        Self { folder: folder.into(), hists: BTreeMap::new() }
    }

    /// Folder histograms are booked into.
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Full path of a histogram (`<folder>/<name>`).
    pub fn path(&self, name: &str) -> String {
        let folder = self.folder.trim_end_matches('/');
        if folder.is_empty() { name.to_string() } else { format!("{folder}/{name}") }
    }

    /// Register an accumulator under its own name, replacing any previous one.
    pub fn book(&mut self, hist: Box<dyn Accumulator>) {
        let name = hist.name().to_string();
        if self.hists.insert(name.clone(), hist).is_some() {
            log::warn!("histogram '{}' booked twice; keeping the latest", self.path(&name));
        }
    }

    /// Book a 1D histogram.
    pub fn book_1d(&mut self, name: &str, title: &str, edges: BinEdges) {
        self.book(Box::new(Histogram1D::new(name, title, edges)));
    }

    /// Book a 2D histogram.
    pub fn book_2d(&mut self, name: &str, title: &str, x: BinEdges, y: BinEdges) {
        self.book(Box::new(Histogram2D::new(name, title, x, y)));
    }

    /// Number of booked histograms.
    pub fn len(&self) -> usize {
        self.hists.len()
    }

    /// `true` if nothing is booked.
    pub fn is_empty(&self) -> bool {
        self.hists.is_empty()
    }

    /// `true` if `name` is booked.
    pub fn contains(&self, name: &str) -> bool {
        self.hists.contains_key(name)
    }

    /// Booked short names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hists.keys().map(String::as_str)
    }

    /// Fill a 1D histogram with unit weight.
    pub fn try_fill(&mut self, name: &str, x: f64) -> Result<()> {
        self.hists
            .get_mut(name)
            .ok_or_else(|| TrigValError::UnknownHistogram(name.to_string()))?
            .fill(x, 1.0)
    }

    /// Fill a 2D histogram with unit weight.
    pub fn try_fill_2d(&mut self, name: &str, x: f64, y: f64) -> Result<()> {
        self.hists
            .get_mut(name)
            .ok_or_else(|| TrigValError::UnknownHistogram(name.to_string()))?
            .fill_2d(x, y, 1.0)
    }

    /// Fill a 1D histogram; failures are logged.
    pub fn fill(&mut self, name: &str, x: f64) {
        if let Err(e) = self.try_fill(name, x) {
            log::warn!("skipping fill in {}: {e}", self.folder);
        }
    }

    /// Fill a 2D histogram; failures are logged.
    pub fn fill_2d(&mut self, name: &str, x: f64, y: f64) {
        if let Err(e) = self.try_fill_2d(name, x, y) {
            log::warn!("skipping fill in {}: {e}", self.folder);
        }
    }

    /// Snapshot of one histogram, under its short name.
    pub fn snapshot(&self, name: &str) -> Option<HistogramSnapshot> {
        self.hists.get(name).map(|h| h.snapshot())
    }

    /// Snapshots of all histograms, named by full path.
    pub fn snapshots(&self) -> Vec<HistogramSnapshot> {
        self.hists
            .iter()
            .map(|(name, h)| {
                let mut s = h.snapshot();
                s.name = self.path(name);
                s
            })
            .collect()
    }

    /// `Ok` if every histogram of `other` is booked here with the same
    /// dimension and binning.
    pub fn check_merge(&self, other: &HistogramRegistry) -> Result<()> {
        for (name, theirs) in &other.hists {
            let ours = self.hists.get(name).ok_or_else(|| {
                TrigValError::HistogramMerge(format!("'{name}' is not booked in {}", self.folder))
            })?;
            if ours.dimension() != theirs.dimension() {
                return Err(TrigValError::HistogramMerge(format!(
                    "'{name}' is {}D here and {}D in the other registry",
                    ours.dimension(),
                    theirs.dimension()
                )));
            }
            ours.check_compatible(&theirs.snapshot())?;
        }
        Ok(())
    }

    /// Add another registry's contents (e.g. from a parallel worker).
    ///
    /// Both registries must have booked the same names with the same binning.
    /// On error nothing has been added.
    pub fn merge(&mut self, other: &HistogramRegistry) -> Result<()> {
        self.check_merge(other)?;
        for (name, theirs) in &other.hists {
            if let Some(ours) = self.hists.get_mut(name) {
                ours.merge(&theirs.snapshot())?;
            }
        }
        Ok(())
    }
}
