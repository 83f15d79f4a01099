//! Efficiency histograms from numerator/denominator pairs.
//!
//! Every `<base>_numer` with a matching `<base>_denom` yields `<base>_eff`:
//! per cell ε = N/D with binomial error sqrt(ε(1−ε)/D), stored as the cell
//! content and `sumw2 = error²`. Cells with an empty denominator are 0.
//!
//! The Z mass spectra (`massVsmassZ_<region>_{numer,denom}`) additionally get
//! a background-subtracted tag-and-probe efficiency, `<base>_tnpEff`: the
//! signal yield in a window around the Z peak minus a linear background
//! interpolated from the sidebands of the fit range.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrigValError};
use crate::histogram::HistogramSnapshot;

/// Name suffix of numerator histograms.
pub const NUMERATOR_SUFFIX: &str = "_numer";
/// Name suffix of denominator histograms.
pub const DENOMINATOR_SUFFIX: &str = "_denom";
/// Name suffix of derived efficiency histograms.
pub const EFFICIENCY_SUFFIX: &str = "_eff";
/// Name suffix of background-subtracted tag-and-probe efficiencies.
pub const TNP_EFFICIENCY_SUFFIX: &str = "_tnpEff";
/// Short-name prefix of the Z mass spectra.
pub const Z_MASS_PREFIX: &str = "massVsmassZ_";

/// Mass ranges of the tag-and-probe yield extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MassWindow {
    /// Lower end of the fit range (sidebands start here).
    pub fit_range_low: f64,
    /// Upper end of the fit range.
    pub fit_range_high: f64,
    /// Lower end of the signal window.
    pub signal_range_low: f64,
    /// Upper end of the signal window.
    pub signal_range_high: f64,
}

impl Default for MassWindow {
    fn default() -> Self {
        Self { fit_range_low: 65.0, fit_range_high: 115.0, signal_range_low: 81.0, signal_range_high: 101.0 }
    }
}

/// Signal yield and its variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Yield {
    /// Background-subtracted count.
    pub value: f64,
    /// Variance of `value`.
    pub variance: f64,
}

#[derive(Default)]
struct Band {
    sumw: f64,
    sumw2: f64,
    width: f64,
    weighted_center: f64,
}

impl Band {
    fn add(&mut self, lo: f64, hi: f64, w: f64, w2: f64) {
        self.sumw += w;
        self.sumw2 += w2;
        self.width += hi - lo;
        self.weighted_center += 0.5 * (lo + hi) * (hi - lo);
    }

    fn center(&self) -> f64 {
        self.weighted_center / self.width
    }
}

/// Background-subtracted yield of a 1D mass spectrum.
///
/// Bins are assigned by their center: inside the signal window they count as
/// signal, elsewhere inside the fit range as left or right sideband. The
/// background is the straight line through the two sideband densities,
/// integrated over the signal window; with a single populated side it is
/// flat. `None` if the histogram is 2D or the window holds no signal bins.
pub fn sideband_yield(mass: &HistogramSnapshot, window: &MassWindow) -> Option<Yield> {
    if mass.y_edges.is_some() {
        return None;
    }
    let (mut left, mut signal, mut right) = (Band::default(), Band::default(), Band::default());
    for (bin, edge) in mass.x_edges.windows(2).enumerate() {
        let (lo, hi) = (edge[0], edge[1]);
        let center = 0.5 * (lo + hi);
        let (Some(&w), Some(&w2)) = (mass.contents.get(bin + 1), mass.sumw2.get(bin + 1)) else {
            continue;
        };
        if center < window.fit_range_low || center > window.fit_range_high {
            continue;
        }
        if center < window.signal_range_low {
            left.add(lo, hi, w, w2);
        } else if center <= window.signal_range_high {
            signal.add(lo, hi, w, w2);
        } else {
            right.add(lo, hi, w, w2);
        }
    }
    if signal.width <= 0.0 {
        return None;
    }

    // Background = a_l * sum_left + a_r * sum_right.
    let (a_l, a_r) = match (left.width > 0.0, right.width > 0.0) {
        (true, true) => {
            let t = (signal.center() - left.center()) / (right.center() - left.center());
            (signal.width * (1.0 - t) / left.width, signal.width * t / right.width)
        }
        (true, false) => (signal.width / left.width, 0.0),
        (false, true) => (0.0, signal.width / right.width),
        (false, false) => (0.0, 0.0),
    };
    let background = a_l * left.sumw + a_r * right.sumw;
    let background_var = a_l * a_l * left.sumw2 + a_r * a_r * right.sumw2;
    Some(Yield { value: signal.sumw - background, variance: signal.sumw2 + background_var })
}

/// Tag-and-probe efficiency from the yields of a numerator and denominator
/// mass spectrum, as a single-bin histogram spanning the signal window.
///
/// The ratio is clamped to `[0, 1]` with a binomial error; a non-positive
/// denominator yield gives 0.
pub fn tag_and_probe_efficiency(
    numer: &HistogramSnapshot,
    denom: &HistogramSnapshot,
    window: &MassWindow,
    name: impl Into<String>,
) -> Result<HistogramSnapshot> {
    let name = name.into();
    if numer.x_edges != denom.x_edges || numer.y_edges.is_some() || denom.y_edges.is_some() {
        return Err(TrigValError::IncompatibleBinning(format!(
            "'{}' vs '{}' for {name}",
            numer.name, denom.name
        )));
    }
    let yields = sideband_yield(numer, window).zip(sideband_yield(denom, window));
    let (eff, var) = match yields {
        Some((n, d)) if d.value > 0.0 => {
            let eff = (n.value / d.value).clamp(0.0, 1.0);
            (eff, eff * (1.0 - eff) / d.value)
        }
        _ => {
            log::warn!("no signal yield for {name}; efficiency set to 0");
            (0.0, 0.0)
        }
    };
    Ok(HistogramSnapshot {
        name,
        title: ";mass window;#epsilon".to_string(),
        x_edges: vec![window.signal_range_low, window.signal_range_high],
        y_edges: None,
        contents: vec![0.0, eff, 0.0],
        sumw2: vec![0.0, var, 0.0],
        entries: denom.entries,
    })
}

/// Background-subtracted efficiencies for every Z mass numerator/denominator
/// pair in `snapshots`, sorted by name.
pub fn compute_tag_and_probe_efficiencies(
    snapshots: &[HistogramSnapshot],
    window: &MassWindow,
) -> Result<Vec<HistogramSnapshot>> {
    let by_name: BTreeMap<&str, &HistogramSnapshot> =
        snapshots.iter().map(|s| (s.name.as_str(), s)).collect();

    let mut out = Vec::new();
    for (name, numer) in &by_name {
        let Some(base) = name.strip_suffix(NUMERATOR_SUFFIX) else {
            continue;
        };
        let short = base.rsplit('/').next().unwrap_or(base);
        if !short.starts_with(Z_MASS_PREFIX) {
            continue;
        }
        let denom_name = format!("{base}{DENOMINATOR_SUFFIX}");
        let Some(denom) = by_name.get(denom_name.as_str()) else {
            continue;
        };
        out.push(tag_and_probe_efficiency(numer, denom, window, format!("{base}{TNP_EFFICIENCY_SUFFIX}"))?);
    }
    Ok(out)
}

/// Ratio `numer / denom` with binomial errors.
///
/// Both histograms must share their binning.
pub fn efficiency(
    numer: &HistogramSnapshot,
    denom: &HistogramSnapshot,
    name: impl Into<String>,
) -> Result<HistogramSnapshot> {
    let name = name.into();
    if numer.x_edges != denom.x_edges
        || numer.y_edges != denom.y_edges
        || numer.contents.len() != denom.contents.len()
    {
        return Err(TrigValError::IncompatibleBinning(format!(
            "'{}' vs '{}' for {name}",
            numer.name, denom.name
        )));
    }

    let mut contents = Vec::with_capacity(denom.contents.len());
    let mut sumw2 = Vec::with_capacity(denom.contents.len());
    for (&n, &d) in numer.contents.iter().zip(&denom.contents) {
        if d > 0.0 {
            let eff = n / d;
            let var = (eff * (1.0 - eff)).max(0.0) / d;
            contents.push(eff);
            sumw2.push(var);
        } else {
            contents.push(0.0);
            sumw2.push(0.0);
        }
    }

    Ok(HistogramSnapshot {
        name,
        title: numer.title.clone(),
        x_edges: numer.x_edges.clone(),
        y_edges: numer.y_edges.clone(),
        contents,
        sumw2,
        entries: denom.entries,
    })
}

/// Efficiencies for every numerator/denominator pair in `snapshots`, sorted
/// by name. Numerators without a denominator are skipped with a warning.
pub fn compute_efficiencies(snapshots: &[HistogramSnapshot]) -> Result<Vec<HistogramSnapshot>> {
    let by_name: BTreeMap<&str, &HistogramSnapshot> =
        snapshots.iter().map(|s| (s.name.as_str(), s)).collect();

    let mut out = Vec::new();
    for (name, numer) in &by_name {
        let Some(base) = name.strip_suffix(NUMERATOR_SUFFIX) else {
            continue;
        };
        let denom_name = format!("{base}{DENOMINATOR_SUFFIX}");
        let Some(denom) = by_name.get(denom_name.as_str()) else {
            log::warn!("no denominator '{denom_name}' for '{name}'");
            continue;
        };
        out.push(efficiency(numer, denom, format!("{base}{EFFICIENCY_SUFFIX}"))?);
    }
    Ok(out)
}
