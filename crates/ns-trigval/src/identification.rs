//! Cut-based electron identification and pileup-corrected isolation.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrigValError};
use crate::kinematics::Point3;
use crate::objects::{ConversionVeto, Electron};

/// `|η_SC|` boundary between the barrel and endcap threshold sets.
pub const ID_BARREL_ENDCAP_BOUNDARY: f64 = 1.479;

/// `x`, or 1 when `x` is zero, for use as a divisor.
pub fn safe_divisor(x: f64) -> f64 {
    if x != 0.0 { x } else { 1.0 }
}

/// One `[eta_min, eta_max) → area` row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveAreaBin {
    /// Lower |η| edge (inclusive).
    pub eta_min: f64,
    /// Upper |η| edge (exclusive).
    pub eta_max: f64,
    /// Effective area.
    pub area: f64,
}

/// |η|-binned effective areas for the neutral isolation pileup correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectiveAreas(Vec<EffectiveAreaBin>);

impl Default for EffectiveAreas {
    /// Electron cone-0.3 neutral-hadron + photon areas.
    fn default() -> Self {
        const TABLE: [(f64, f64, f64); 7] = [
            (0.0, 1.0, 0.1703),
            (1.0, 1.479, 0.1715),
            (1.479, 2.0, 0.1213),
            (2.0, 2.2, 0.1230),
            (2.2, 2.3, 0.1635),
            (2.3, 2.4, 0.1937),
            (2.4, 5.0, 0.2393),
        ];
        Self(
            TABLE
                .iter()
                .map(|&(eta_min, eta_max, area)| EffectiveAreaBin { eta_min, eta_max, area })
                .collect(),
        )
    }
}

impl EffectiveAreas {
    /// Areas from explicit bins.
    pub fn new(bins: Vec<EffectiveAreaBin>) -> Self {
        Self(bins)
    }

    /// Parse the text format: one `eta_min eta_max area` row per line;
    /// blank lines and `#` comments are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut bins = Vec::new();
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<f64> = line
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| {
                    TrigValError::Config(format!("effective areas line {}: {e}", lineno + 1))
                })?;
            let [eta_min, eta_max, area] = fields[..] else {
                return Err(TrigValError::Config(format!(
                    "effective areas line {}: expected 3 columns, got {}",
                    lineno + 1,
                    fields.len()
                )));
            };
            if eta_max <= eta_min {
                return Err(TrigValError::Config(format!(
                    "effective areas line {}: empty |eta| range [{eta_min}, {eta_max})",
                    lineno + 1
                )));
            }
            bins.push(EffectiveAreaBin { eta_min, eta_max, area });
        }
        Ok(Self(bins))
    }

    /// Read and parse a text file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Area for `abs_eta`; 0 outside every bin.
    pub fn area(&self, abs_eta: f64) -> f64 {
        self.0
            .iter()
            .find(|b| abs_eta >= b.eta_min && abs_eta < b.eta_max)
            .map(|b| b.area)
            .unwrap_or(0.0)
    }
}

/// Relative PF isolation with effective-area pileup correction:
/// `(charged + max(0, neutral + photon − ρ·EA(|η_SC|))) / pt`.
pub fn pf_isolation_rel(electron: &Electron, rho: f64, areas: &EffectiveAreas) -> f64 {
    let iso = &electron.pf_isolation;
    let ea = areas.area(electron.supercluster_eta.abs());
    let neutral = (iso.neutral_hadron + iso.photon - rho * ea).max(0.0);
    (iso.charged_hadron + neutral) / safe_divisor(electron.pt)
}

/// Upper bounds of one detector region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdThresholds {
    /// Full 5x5 σ_iηiη.
    pub sigma_ieta_ieta: f64,
    /// |Δη(seed, track)|.
    pub delta_eta_seed: f64,
    /// |Δφ(SC, track)|.
    pub delta_phi_in: f64,
    /// H/E.
    pub hadronic_over_em: f64,
    /// |1/E − 1/p|.
    pub ooe_minus_oop: f64,
    /// Missing inner hits (inclusive).
    pub missing_hits: u32,
    /// Relative EA-corrected PF isolation.
    pub rel_iso: f64,
}

impl IdThresholds {
    fn passes(&self, v: &IdValues) -> bool {
        v.sigma_ieta_ieta < self.sigma_ieta_ieta
            && v.delta_eta_seed.abs() < self.delta_eta_seed
            && v.delta_phi_in.abs() < self.delta_phi_in
            && v.hadronic_over_em < self.hadronic_over_em
            && v.ooe_minus_oop < self.ooe_minus_oop
            && v.missing_hits <= self.missing_hits
            && v.rel_iso < self.rel_iso
    }
}

struct IdValues {
    sigma_ieta_ieta: f64,
    delta_eta_seed: f64,
    delta_phi_in: f64,
    hadronic_over_em: f64,
    ooe_minus_oop: f64,
    missing_hits: u32,
    rel_iso: f64,
}

/// Barrel/endcap cut-based working point. Defaults to the tight one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkingPoint {
    /// Thresholds for `|η_SC| <= 1.479`.
    pub barrel: IdThresholds,
    /// Thresholds for `|η_SC| >= 1.479`.
    pub endcap: IdThresholds,
}

impl Default for WorkingPoint {
    fn default() -> Self {
        Self {
            barrel: IdThresholds {
                sigma_ieta_ieta: 0.00998,
                delta_eta_seed: 0.00308,
                delta_phi_in: 0.0816,
                hadronic_over_em: 0.0414,
                ooe_minus_oop: 0.0129,
                missing_hits: 1,
                rel_iso: 0.0588,
            },
            endcap: IdThresholds {
                sigma_ieta_ieta: 0.0292,
                delta_eta_seed: 0.00605,
                delta_phi_in: 0.0394,
                hadronic_over_em: 0.0641,
                ooe_minus_oop: 0.0129,
                missing_hits: 1,
                rel_iso: 0.0571,
            },
        }
    }
}

impl WorkingPoint {
    /// Whether `electron` passes: region thresholds plus the conversion veto.
    ///
    /// An electron exactly on the barrel/endcap boundary passes if either
    /// threshold set accepts it.
    pub fn passes(
        &self,
        electron: &Electron,
        rho: f64,
        areas: &EffectiveAreas,
        conversions: &dyn ConversionVeto,
        beam_spot: &Point3,
    ) -> bool {
        if conversions.has_matched_conversion(electron, beam_spot) {
            return false;
        }
        let abs_eta = electron.supercluster_eta.abs();
        let id = &electron.id;
        let values = IdValues {
            sigma_ieta_ieta: id.sigma_ieta_ieta,
            delta_eta_seed: id.delta_eta_seed_track,
            delta_phi_in: id.delta_phi_sc_track,
            hadronic_over_em: id.hadronic_over_em,
            ooe_minus_oop: ((1.0 - id.e_sc_over_p) / safe_divisor(id.ecal_energy)).abs(),
            missing_hits: electron.missing_inner_hits(),
            rel_iso: pf_isolation_rel(electron, rho, areas),
        };
        (abs_eta <= ID_BARREL_ENDCAP_BOUNDARY && self.barrel.passes(&values))
            || (abs_eta >= ID_BARREL_ENDCAP_BOUNDARY && self.endcap.passes(&values))
    }
}
