//! Plotter configuration.
//!
//! Configs are plain serde structs read from JSON or YAML. Missing sections
//! fall back to defaults; missing entries inside `plotCuts` read as 0 (with a
//! warning), matching how the cut map has always behaved.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::efficiency::MassWindow;
use crate::error::Result;
use crate::expr::CutSelector;
use crate::identification::{EffectiveAreas, WorkingPoint};
use crate::objects::TriggerObject;
use crate::selection::ElectronSelection;

/// Minimum-pt threshold used when the trigger path carries no `Ele<N>` tag.
pub const DEFAULT_MIN_PT_CUT: f64 = 3.0;

static ELE_THRESHOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Ele([0-9]+)").expect("valid Ele<N> pattern"));

/// Selection of the tag-and-probe target electrons and of trigger objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetParams {
    /// Cut on reconstructed electrons. `None`: targets are not evaluated.
    pub reco_cuts: Option<String>,
    /// Cut on trigger objects. `None`: trigger objects are not evaluated.
    pub hlt_cuts: Option<String>,
    /// Minimum tag pt for Z tag-and-probe pairs.
    #[serde(rename = "ptCut_Z")]
    pub pt_cut_z: f64,
    /// Maximum |d0| of the electron track w.r.t. the beam spot.
    pub d0_cut: Option<f64>,
    /// Maximum |dz| of the electron track w.r.t. the beam spot.
    pub z0_cut: Option<f64>,
}

impl Default for TargetParams {
    fn default() -> Self {
        Self { reco_cuts: None, hlt_cuts: None, pt_cut_z: 20.0, d0_cut: None, z0_cut: None }
    }
}

/// Everything a [`MatchAndPlot`](crate::plotter::MatchAndPlot) needs besides
/// the path and module names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlotterConfig {
    /// Process name of the trigger filters (e.g. `HLT`).
    pub hlt_process_name: String,
    /// Base folder for booked histograms.
    pub folder_name: String,
    /// Target and trigger-object selection.
    pub target_params: TargetParams,
    /// Named binning specs: `[n, lo, hi]` or explicit edges.
    pub bin_params: BTreeMap<String, Vec<f64>>,
    /// Named numeric cuts (`DeltaR`, `maxEta`, `minPtFactor`).
    pub plot_cuts: BTreeMap<String, f64>,
    /// Effective areas for the isolation pileup correction.
    pub effective_areas: EffectiveAreas,
    /// Identification thresholds.
    pub working_point: WorkingPoint,
    /// Mass ranges for the background-subtracted Z efficiencies.
    pub mass_window: MassWindow,
}

fn default_bin_params() -> BTreeMap<String, Vec<f64>> {
    let specs: [(&str, &[f64]); 16] = [
        ("pt", &[0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 50.0, 60.0, 80.0, 100.0, 200.0]),
        ("ptCoarse", &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 80.0, 100.0, 150.0]),
        ("eta", &[-2.5, -2.1, -1.566, -1.442, -0.8, 0.0, 0.8, 1.442, 1.566, 2.1, 2.5]),
        ("etaCoarse", &[-2.5, -1.566, -1.442, 0.0, 1.442, 1.566, 2.5]),
        ("phi", &[32.0, -3.2, 3.2]),
        ("phiCoarse", &[8.0, -3.2, 3.2]),
        ("deltaR", &[60.0, 0.0, 0.3]),
        ("resolutionRel", &[100.0, -0.5, 0.5]),
        ("resolutionEta", &[100.0, -0.1, 0.1]),
        ("resolutionPhi", &[100.0, -0.1, 0.1]),
        ("NVertex", &[60.0, -0.5, 59.5]),
        ("charge", &[3.0, -1.5, 1.5]),
        ("zMass", &[60.0, 60.0, 120.0]),
        ("sigmaIetaIeta", &[50.0, 0.0, 0.05]),
        ("HOE", &[50.0, 0.0, 0.2]),
        ("isoPFCorrRel", &[50.0, 0.0, 0.5]),
    ];
    specs.iter().map(|(name, spec)| (name.to_string(), spec.to_vec())).collect()
}

impl Default for PlotterConfig {
    fn default() -> Self {
        let plot_cuts = [("DeltaR", 0.3), ("maxEta", 2.5), ("minPtFactor", 1.0)]
            .iter()
            .map(|&(k, v)| (k.to_string(), v))
            .collect();
        Self {
            hlt_process_name: "HLT".into(),
            folder_name: "HLT/EGM/".into(),
            target_params: TargetParams::default(),
            bin_params: default_bin_params(),
            plot_cuts,
            effective_areas: EffectiveAreas::default(),
            working_point: WorkingPoint::default(),
            mass_window: MassWindow::default(),
        }
    }
}

impl PlotterConfig {
    /// Parse a JSON config.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a YAML config (YAML is a superset of JSON, so JSON works too).
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Read a config file; `.json` files use the JSON parser, everything else YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Named plot cut; 0 (with a warning) when not configured.
    pub fn plot_cut(&self, name: &str) -> f64 {
        match self.plot_cuts.get(name) {
            Some(v) => *v,
            None => {
                log::warn!("plot cut '{name}' not configured; using 0");
                0.0
            }
        }
    }

    /// Named binning spec; empty when not configured.
    pub fn bin_spec(&self, name: &str) -> &[f64] {
        self.bin_params.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Target electron selection, or `None` if unconfigured or invalid.
    pub fn target_selection(&self) -> Option<ElectronSelection> {
        let params = &self.target_params;
        let cut = compile_or_warn("recoCuts", params.reco_cuts.as_deref()?)?;
        Some(ElectronSelection { cut, d0_cut: params.d0_cut, z0_cut: params.z0_cut })
    }

    /// Trigger-object selector, or `None` if unconfigured or invalid.
    pub fn trigger_selector(&self) -> Option<CutSelector<TriggerObject>> {
        compile_or_warn("hltCuts", self.target_params.hlt_cuts.as_deref()?)
    }
}

fn compile_or_warn<T: crate::expr::CutVariables>(
    what: &str,
    source: &str,
) -> Option<CutSelector<T>> {
    match CutSelector::new(source) {
        Ok(sel) => Some(sel),
        Err(e) => {
            log::warn!("ignoring {what} '{source}': {e}");
            None
        }
    }
}

/// Minimum-pt threshold for a trigger path: the first `Ele<N>` in the name
/// scaled by `factor` and rounded up, or [`DEFAULT_MIN_PT_CUT`].
pub fn min_pt_cut_from_path(hlt_path: &str, factor: f64) -> f64 {
    ELE_THRESHOLD
        .captures(hlt_path)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .map(|threshold| (threshold * factor).ceil())
        .unwrap_or(DEFAULT_MIN_PT_CUT)
}

/// Path name without its trailing `_v<N>` version suffix.
pub fn strip_version(hlt_path: &str) -> &str {
    match hlt_path.rfind("_v") {
        Some(pos) if hlt_path[pos + 2..].bytes().all(|b| b.is_ascii_digit()) => &hlt_path[..pos],
        _ => hlt_path,
    }
}

/// Folder a plotter books into: `<base>/<path>` for the last filter of a
/// path, `<base>/<path>/<module>` for the others.
pub fn path_folder(base: &str, hlt_path: &str, module_label: &str, is_last_filter: bool) -> String {
    let mut dir = base.to_string();
    if !dir.ends_with('/') {
        dir.push('/');
    }
    dir.push_str(strip_version(hlt_path));
    if !is_last_filter {
        dir.push('/');
        dir.push_str(module_label);
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_from_path_name() {
        assert_eq!(min_pt_cut_from_path("HLT_Ele27_WPTight_Gsf_v7", 1.0), 27.0);
        assert_eq!(min_pt_cut_from_path("HLT_Ele27_WPTight_Gsf_v7", 1.2), 33.0);
        assert_eq!(min_pt_cut_from_path("HLT_Ele23_Ele12_CaloIdL_v3", 1.0), 23.0);
        assert_eq!(min_pt_cut_from_path("HLT_Photon30_v1", 1.5), DEFAULT_MIN_PT_CUT);
        assert_eq!(min_pt_cut_from_path("HLT_Ele_NoThreshold", 1.0), DEFAULT_MIN_PT_CUT);
    }

    #[test]
    fn threshold_pattern_is_shared() {
        let re = LazyLock::force(&ELE_THRESHOLD);
        assert!(re.is_match("HLT_DoubleEle33_CaloIdL_v1"));
        assert!(std::ptr::eq(re, LazyLock::force(&ELE_THRESHOLD)));
        assert_eq!(min_pt_cut_from_path("HLT_DoubleEle33_CaloIdL_v1", 1.0), 33.0);
    }

    #[test]
    fn folders() {
        assert_eq!(strip_version("HLT_Ele27_WPTight_Gsf_v7"), "HLT_Ele27_WPTight_Gsf");
        assert_eq!(strip_version("HLT_Ele27_WPTight_Gsf"), "HLT_Ele27_WPTight_Gsf");
        assert_eq!(
            path_folder("HLT/EGM", "HLT_Ele27_v2", "hltEle27Filter", true),
            "HLT/EGM/HLT_Ele27"
        );
        assert_eq!(
            path_folder("HLT/EGM/", "HLT_Ele27_v2", "hltEle27L1Filter", false),
            "HLT/EGM/HLT_Ele27/hltEle27L1Filter"
        );
    }

    #[test]
    fn json_config_with_defaults() {
        let cfg = PlotterConfig::from_json_str(
            r#"{
                "hltProcessName": "HLTX",
                "targetParams": { "recoCuts": "pt > 10", "hltCuts": "", "ptCut_Z": 25 },
                "plotCuts": { "DeltaR": 0.1 }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.hlt_process_name, "HLTX");
        assert_eq!(cfg.folder_name, "HLT/EGM/");
        assert_eq!(cfg.target_params.pt_cut_z, 25.0);
        assert_eq!(cfg.plot_cut("DeltaR"), 0.1);
        assert_eq!(cfg.plot_cut("maxEta"), 0.0);
        assert_eq!(cfg.bin_spec("zMass"), &[60.0, 60.0, 120.0]);
        assert!(cfg.target_selection().is_some());
        assert!(cfg.trigger_selector().is_some());
    }

    #[test]
    fn yaml_config() {
        let cfg = PlotterConfig::from_yaml_str(
            "folderName: HLT/EG\ntargetParams:\n  recoCuts: \"pt >\"\nbinParams:\n  pt: [4, 0, 8]\n",
        )
        .unwrap();
        assert_eq!(cfg.folder_name, "HLT/EG");
        assert_eq!(cfg.mass_window, MassWindow::default());
        assert_eq!(cfg.bin_spec("pt"), &[4.0, 0.0, 8.0]);
        assert!(cfg.bin_spec("eta").is_empty());
        // Invalid cut degrades to "not evaluated".
        assert!(cfg.target_selection().is_none());
        assert!(cfg.trigger_selector().is_none());
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(PlotterConfig::from_json_str("{ not json").is_err());
    }
}
