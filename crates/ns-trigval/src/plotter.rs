//! Tag-and-probe accounting for one trigger filter module.
//!
//! A [`MatchAndPlot`] books its histograms once per run and then, per event,
//! matches selected reconstructed electrons to the trigger objects accepted by
//! its filter and fills:
//!
//! - resolution and ΔR plots for matched tags,
//! - efficiency numerators (matched) and denominators (all) for identified
//!   electrons outside the barrel/endcap gap,
//! - probe observables for opposite-charge Z candidates (last filter only),
//! - fake-rate numerators (unmatched) and denominators (all) for trigger
//!   objects (last filter only).
//!
//! Filling histograms is the only side effect.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::binning::resolve_edges;
use crate::config::{PlotterConfig, min_pt_cut_from_path, path_folder};
use crate::error::{Result, TrigValError};
use crate::expr::CutSelector;
use crate::identification::{EffectiveAreas, WorkingPoint, pf_isolation_rel, safe_divisor};
use crate::kinematics::delta_r;
use crate::matching::{Assignment, match_by_delta_r};
use crate::objects::{Electron, EventData, FilterTag, TriggerObject};
use crate::registry::HistogramRegistry;
use crate::selection::{ElectronSelection, select_electrons, select_trigger_objects};

/// Upper |η_SC| of the barrel acceptance.
pub const BARREL_MAX_ETA: f64 = 1.442;
/// Lower |η_SC| of the endcap acceptance.
pub const ENDCAP_MIN_ETA: f64 = 1.566;
/// Tags must be strictly above this pt to enter the resolution plots.
pub const TAG_MIN_PT: f64 = 30.0;
/// Electrons below this pt never enter the efficiency plots.
pub const PROBE_MIN_PT: f64 = 20.0;
/// Exclusive Z mass window for tag-probe pairs.
pub const Z_MASS_WINDOW: (f64, f64) = (60.0, 120.0);

/// Numerator/denominator class of an efficiency histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EfficiencySuffix {
    /// All candidates passing the baseline selection.
    Denominator,
    /// The subset that is also trigger-matched.
    Numerator,
}

impl EfficiencySuffix {
    /// Both classes, denominator first.
    pub const ALL: [EfficiencySuffix; 2] = [EfficiencySuffix::Denominator, EfficiencySuffix::Numerator];

    /// Histogram name suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            EfficiencySuffix::Denominator => "denom",
            EfficiencySuffix::Numerator => "numer",
        }
    }
}

impl fmt::Display for EfficiencySuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeRegion {
    Barrel,
    Endcap,
}

impl ProbeRegion {
    fn of(abs_eta: f64) -> Option<Self> {
        if abs_eta < BARREL_MAX_ETA {
            Some(ProbeRegion::Barrel)
        } else if abs_eta > ENDCAP_MIN_ETA {
            Some(ProbeRegion::Endcap)
        } else {
            None
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ProbeRegion::Barrel => "EB",
            ProbeRegion::Endcap => "EE",
        }
    }
}

fn in_gap(abs_eta: f64) -> bool {
    abs_eta > BARREL_MAX_ETA && abs_eta < ENDCAP_MIN_ETA
}

/// Per-event counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTally {
    /// Matched tags entering the resolution plots (last filter only).
    pub tags: usize,
    /// Tag-probe pairs in the Z window.
    pub probes: usize,
    /// Of those, pairs whose probe is trigger-matched.
    pub passing_probes: usize,
}

impl AddAssign for EventTally {
    fn add_assign(&mut self, rhs: EventTally) {
        self.tags += rhs.tags;
        self.probes += rhs.probes;
        self.passing_probes += rhs.passing_probes;
    }
}

/// Booking and per-event accounting for one filter module of a trigger path.
#[derive(Debug)]
pub struct MatchAndPlot {
    hlt_path: String,
    module_label: String,
    is_last_filter: bool,
    filter: FilterTag,
    min_pt_cut: f64,
    delta_r_cut: f64,
    max_eta: f64,
    pt_cut_z: f64,
    target_selection: Option<ElectronSelection>,
    trigger_selector: Option<CutSelector<TriggerObject>>,
    effective_areas: EffectiveAreas,
    working_point: WorkingPoint,
    bin_params: BTreeMap<String, Vec<f64>>,
    registry: HistogramRegistry,
}

impl MatchAndPlot {
    /// Plotter for `module_label` of `hlt_path`. Nothing is booked yet.
    pub fn new(config: &PlotterConfig, hlt_path: &str, module_label: &str, is_last_filter: bool) -> Self {
        let folder = path_folder(&config.folder_name, hlt_path, module_label, is_last_filter);
        let min_pt_cut = min_pt_cut_from_path(hlt_path, config.plot_cut("minPtFactor"));
        log::debug!("{folder}: minimum pt {min_pt_cut}");
        Self {
            hlt_path: hlt_path.to_string(),
            module_label: module_label.to_string(),
            is_last_filter,
            filter: FilterTag::new(module_label, config.hlt_process_name.as_str()),
            min_pt_cut,
            delta_r_cut: config.plot_cut("DeltaR"),
            max_eta: config.plot_cut("maxEta"),
            pt_cut_z: config.target_params.pt_cut_z,
            target_selection: config.target_selection(),
            trigger_selector: config.trigger_selector(),
            effective_areas: config.effective_areas.clone(),
            working_point: config.working_point,
            bin_params: config.bin_params.clone(),
            registry: HistogramRegistry::new(folder),
        }
    }

    /// Trigger path name (with version suffix).
    pub fn hlt_path(&self) -> &str {
        &self.hlt_path
    }

    /// Filter module label.
    pub fn module_label(&self) -> &str {
        &self.module_label
    }

    /// `true` for the last filter of the path.
    pub fn is_last_filter(&self) -> bool {
        self.is_last_filter
    }

    /// Minimum pt for the pt-gated efficiency plots.
    pub fn min_pt_cut(&self) -> f64 {
        self.min_pt_cut
    }

    /// Booked histograms.
    pub fn registry(&self) -> &HistogramRegistry {
        &self.registry
    }

    /// `Ok` if `other` plots the same module with the same booking.
    pub fn check_merge(&self, other: &MatchAndPlot) -> Result<()> {
        if self.module_label != other.module_label {
            return Err(TrigValError::HistogramMerge(format!(
                "module {} does not line up with {}",
                other.module_label, self.module_label
            )));
        }
        self.registry.check_merge(&other.registry)
    }

    /// Add the histograms of another plotter for the same module. On error
    /// nothing has been added.
    pub fn merge(&mut self, other: &MatchAndPlot) -> Result<()> {
        self.check_merge(other)?;
        self.registry.merge(&other.registry)
    }

    fn book_1d(&mut self, name: &str, binning: &str, title: &str) {
        let spec = self.bin_params.get(binning).map(Vec::as_slice).unwrap_or(&[]);
        let edges = resolve_edges(binning, spec);
        self.registry.book_1d(name, title, edges);
    }

    fn book_2d(&mut self, name: &str, binning_x: &str, binning_y: &str, title: &str) {
        let spec_x = self.bin_params.get(binning_x).map(Vec::as_slice).unwrap_or(&[]);
        let spec_y = self.bin_params.get(binning_y).map(Vec::as_slice).unwrap_or(&[]);
        let x = resolve_edges(binning_x, spec_x);
        let y = resolve_edges(binning_y, spec_y);
        self.registry.book_2d(name, title, x, y);
    }

    /// Book every histogram this module fills. Call once per run, before
    /// [`analyze`](Self::analyze).
    pub fn book(&mut self) {
        if self.is_last_filter {
            self.book_1d("hltPt", "pt", ";p_{T} of HLT object");
            self.book_1d("hltEta", "eta", ";#eta of HLT object");
            self.book_1d("hltPhi", "phi", ";#phi of HLT object");
            self.book_1d("resolutionEta", "resolutionEta", ";#eta^{reco}-#eta^{HLT};");
            self.book_1d("resolutionPhi", "resolutionPhi", ";#phi^{reco}-#phi^{HLT};");
        }
        self.book_1d("deltaR", "deltaR", ";#Deltar(reco, HLT);");
        self.book_1d("resolutionPt", "resolutionRel", ";(p_{T}^{reco}-p_{T}^{HLT})/|p_{T}^{reco}|;");

        for suffix in EfficiencySuffix::ALL {
            self.book_1d(&format!("efficiencyEta_{suffix}"), "eta", ";#eta;");
            self.book_1d(&format!("efficiencyPhi_{suffix}"), "phi", ";#phi;");
            self.book_1d(&format!("efficiencyTurnOn_{suffix}"), "pt", ";p_{T};");
            self.book_1d(&format!("efficiencyVertex_{suffix}"), "NVertex", ";NVertex;");
            self.book_2d(&format!("efficiencyPhiVsEta_{suffix}"), "etaCoarse", "phiCoarse", ";#eta;#phi");

            if !self.is_last_filter {
                continue;
            }
            self.book_1d(&format!("efficiencyCharge_{suffix}"), "charge", ";charge;");

            self.book_1d(&format!("fakerateEta_{suffix}"), "eta", ";#eta;");
            self.book_1d(&format!("fakerateVertex_{suffix}"), "NVertex", ";NVertex;");
            self.book_1d(&format!("fakeratePhi_{suffix}"), "phi", ";#phi;");
            self.book_1d(&format!("fakerateTurnOn_{suffix}"), "pt", ";p_{T};");
            self.book_2d(&format!("fakeratePhiVsEta_{suffix}"), "eta", "phi", ";#eta;#phi");

            for region in [ProbeRegion::Barrel, ProbeRegion::Endcap] {
                let r = region.as_str();
                self.book_1d(&format!("massVsmassZ_{r}_{suffix}"), "zMass", ";mass");
                self.book_1d(&format!("massVsEtaZ_{r}_{suffix}"), "etaCoarse", ";#eta");
                self.book_1d(&format!("massVsPtZ_{r}_{suffix}"), "ptCoarse", ";p_{T}");
                self.book_1d(&format!("massVsVertexZ_{r}_{suffix}"), "NVertex", ";NVertex");
                self.book_2d(
                    &format!("massVsPhiVsEtaZ_{r}_{suffix}"),
                    "etaCoarse",
                    "phiCoarse",
                    ";#eta;#phi",
                );
                self.book_1d(
                    &format!("massVsSigmaIetaIetaZ_{r}_{suffix}"),
                    "sigmaIetaIeta",
                    ";#sigmaI#etaI#eta",
                );
                self.book_1d(&format!("massVsHoEZ_{r}_{suffix}"), "HOE", ";HoE");
                self.book_1d(&format!("massVsisoPFCorrRelZ_{r}_{suffix}"), "isoPFCorrRel", ";isoRel");
            }
        }
        log::debug!("booked {} histograms in {}", self.registry.len(), self.registry.folder());
    }

    /// Account one event.
    pub fn analyze(&mut self, event: &EventData<'_>) -> EventTally {
        let targets = select_electrons(event.electrons, &event.beam_spot, self.target_selection.as_ref());
        let triggers =
            select_trigger_objects(event.trigger_summary, &self.filter, self.trigger_selector.as_ref());
        let n_vertices = event.n_vertices as f64;
        let mut tally = EventTally::default();

        if self.is_last_filter {
            for obj in &triggers {
                self.registry.fill("hltPt", obj.pt);
                self.registry.fill("hltEta", obj.eta);
                self.registry.fill("hltPhi", obj.phi);
            }
        }

        let matches = match_by_delta_r(&targets, &triggers, self.delta_r_cut);
        // One tag-probe pair per event at most.
        let mut pair_accounted = false;

        for (i, &electron) in targets.iter().enumerate() {
            let tight = self.working_point.passes(
                electron,
                event.rho,
                &self.effective_areas,
                event.conversions,
                &event.beam_spot,
            );
            if !tight {
                continue;
            }
            let abs_eta = electron.supercluster_eta.abs();
            let matched = matches.get(i).map(|j| triggers[j]);
            let is_tag = matched.is_some() && abs_eta <= ENDCAP_MIN_ETA && electron.pt > TAG_MIN_PT;

            if is_tag && let Some(hlt) = matched {
                self.registry.fill("resolutionPt", (electron.pt - hlt.pt) / safe_divisor(electron.pt));
                self.registry.fill("deltaR", delta_r(electron, hlt));
                if self.is_last_filter {
                    self.registry.fill("resolutionEta", electron.eta - hlt.eta);
                    self.registry.fill("resolutionPhi", electron.phi - hlt.phi);
                    tally.tags += 1;
                }
            }

            self.fill_efficiency(electron, matched.is_some(), n_vertices);

            if !self.is_last_filter || !is_tag {
                continue;
            }
            for (k, &probe) in targets.iter().enumerate() {
                if k == i || electron.charge == probe.charge || pair_accounted {
                    continue;
                }
                let mass = (electron.p4 + probe.p4).mass();
                if !(mass > Z_MASS_WINDOW.0 && mass < Z_MASS_WINDOW.1) {
                    continue;
                }
                if electron.pt < self.pt_cut_z {
                    continue;
                }
                let region = ProbeRegion::of(probe.supercluster_eta.abs());
                let iso = pf_isolation_rel(probe, event.rho, &self.effective_areas);
                if let Some(region) = region {
                    self.fill_probe(region, EfficiencySuffix::Denominator, mass, probe, iso, n_vertices);
                }
                tally.probes += 1;
                if matches.is_matched(k) {
                    if let Some(region) = region {
                        self.fill_probe(region, EfficiencySuffix::Numerator, mass, probe, iso, n_vertices);
                    }
                    tally.passing_probes += 1;
                }
                pair_accounted = true;
            }
        }

        if self.is_last_filter {
            self.fill_fake_rate(&triggers, &targets, n_vertices);
        }

        log::debug!(
            "{}: {} targets, {} trigger objects, {} matched, tally {:?}",
            self.registry.folder(),
            targets.len(),
            triggers.len(),
            matches.n_matched(),
            tally
        );
        tally
    }

    fn fill_efficiency(&mut self, electron: &Electron, matched: bool, n_vertices: f64) {
        if in_gap(electron.supercluster_eta.abs()) || electron.pt < PROBE_MIN_PT {
            return;
        }
        let above_min_pt = electron.pt > self.min_pt_cut;
        let within_eta = electron.eta.abs() < self.max_eta;

        for suffix in EfficiencySuffix::ALL {
            if suffix == EfficiencySuffix::Numerator && !matched {
                continue;
            }
            if above_min_pt {
                self.registry.fill(&format!("efficiencyEta_{suffix}"), electron.eta);
                self.registry.fill_2d(&format!("efficiencyPhiVsEta_{suffix}"), electron.eta, electron.phi);
            }
            if within_eta {
                self.registry.fill(&format!("efficiencyTurnOn_{suffix}"), electron.pt);
            }
            if above_min_pt && within_eta {
                self.registry.fill(&format!("efficiencyVertex_{suffix}"), n_vertices);
                self.registry.fill(&format!("efficiencyPhi_{suffix}"), electron.phi);
                if self.is_last_filter {
                    self.registry.fill(&format!("efficiencyCharge_{suffix}"), electron.charge as f64);
                }
            }
        }
    }

    fn fill_probe(
        &mut self,
        region: ProbeRegion,
        suffix: EfficiencySuffix,
        mass: f64,
        probe: &Electron,
        iso: f64,
        n_vertices: f64,
    ) {
        let r = region.as_str();
        let reg = &mut self.registry;
        reg.fill(&format!("massVsmassZ_{r}_{suffix}"), mass);
        reg.fill(&format!("massVsEtaZ_{r}_{suffix}"), probe.eta);
        reg.fill(&format!("massVsPtZ_{r}_{suffix}"), probe.pt);
        reg.fill(&format!("massVsVertexZ_{r}_{suffix}"), n_vertices);
        reg.fill_2d(&format!("massVsPhiVsEtaZ_{r}_{suffix}"), probe.eta, probe.phi);
        reg.fill(&format!("massVsSigmaIetaIetaZ_{r}_{suffix}"), probe.id.sigma_ieta_ieta);
        reg.fill(&format!("massVsHoEZ_{r}_{suffix}"), probe.id.hadronic_over_em);
        reg.fill(&format!("massVsisoPFCorrRelZ_{r}_{suffix}"), iso);
    }

    fn fill_fake_rate(&mut self, triggers: &[&TriggerObject], targets: &[&Electron], n_vertices: f64) {
        let hlt_matches: Assignment = match_by_delta_r(triggers, targets, self.delta_r_cut);
        for (i, obj) in triggers.iter().enumerate() {
            let is_fake = !hlt_matches.is_matched(i);
            for suffix in EfficiencySuffix::ALL {
                if suffix == EfficiencySuffix::Numerator && !is_fake {
                    continue;
                }
                self.registry.fill(&format!("fakerateVertex_{suffix}"), n_vertices);
                self.registry.fill(&format!("fakerateEta_{suffix}"), obj.eta);
                self.registry.fill(&format!("fakeratePhi_{suffix}"), obj.phi);
                self.registry.fill(&format!("fakerateTurnOn_{suffix}"), obj.pt);
                self.registry.fill_2d(&format!("fakeratePhiVsEta_{suffix}"), obj.eta, obj.phi);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::Point3;
    use crate::objects::{IdVariables, TriggerSummary};

    const PATH: &str = "HLT_Ele27_WPTight_Gsf_v3";
    const MODULE: &str = "hltEle27WPTightGsfTrackIsoFilter";

    fn config() -> PlotterConfig {
        let mut cfg = PlotterConfig::default();
        cfg.target_params.reco_cuts = Some(String::new());
        cfg.target_params.hlt_cuts = Some(String::new());
        cfg.plot_cuts.insert("DeltaR".into(), 0.1);
        cfg
    }

    fn plotter(is_last_filter: bool) -> MatchAndPlot {
        let mut p = MatchAndPlot::new(&config(), PATH, MODULE, is_last_filter);
        p.book();
        p
    }

    fn summary(objects: Vec<TriggerObject>) -> TriggerSummary {
        let keys = (0..objects.len()).collect();
        TriggerSummary::new(objects).with_filter(FilterTag::new(MODULE, "HLT"), keys)
    }

    fn run(p: &mut MatchAndPlot, electrons: &[Electron], summary: &TriggerSummary) -> EventTally {
        let no_conversions = |_: &Electron, _: &Point3| false;
        let event = EventData {
            electrons,
            rho: 0.0,
            conversions: &no_conversions,
            beam_spot: Point3::default(),
            n_vertices: 12,
            trigger_summary: summary,
        };
        p.analyze(&event)
    }

    fn integral(p: &MatchAndPlot, name: &str) -> f64 {
        p.registry().snapshot(name).map(|s| s.integral()).unwrap_or(f64::NAN)
    }

    #[test]
    fn booking_depends_on_filter_position() {
        let inner = plotter(false);
        assert_eq!(inner.registry().len(), 12);
        assert!(!inner.registry().contains("hltPt"));
        assert!(!inner.registry().contains("fakerateEta_denom"));
        assert_eq!(inner.registry().folder(), "HLT/EGM/HLT_Ele27_WPTight_Gsf/hltEle27WPTightGsfTrackIsoFilter");

        let last = plotter(true);
        assert_eq!(last.registry().len(), 61);
        assert!(last.registry().contains("massVsisoPFCorrRelZ_EE_numer"));
        assert!(last.registry().contains("fakeratePhiVsEta_numer"));
        assert_eq!(last.registry().folder(), "HLT/EGM/HLT_Ele27_WPTight_Gsf");
        assert_eq!(last.min_pt_cut(), 27.0);
    }

    #[test]
    fn fake_rate_counts_unmatched_trigger_objects() {
        let mut p = plotter(true);
        let electrons = [Electron::new(40.0, 0.1, 0.0, 1)];
        let trig = summary(vec![
            TriggerObject::new(11, 39.0, 0.1, 0.01, 0.0),
            TriggerObject::new(11, 25.0, -1.0, 2.0, 0.0),
        ]);
        run(&mut p, &electrons, &trig);

        assert_eq!(integral(&p, "fakerateEta_denom"), 2.0);
        assert_eq!(integral(&p, "fakerateEta_numer"), 1.0);
        let numer = p.registry().snapshot("fakerateEta_numer").unwrap();
        assert_eq!(numer.content_at(-1.0), 1.0);
        assert_eq!(integral(&p, "hltPt"), 2.0);
    }

    #[test]
    fn same_charge_pairs_are_never_accounted() {
        let mut p = plotter(true);
        let electrons = [
            Electron::new(40.0, 0.1, 0.0, 1),
            Electron::new(35.0, -0.2, std::f64::consts::PI, 1),
        ];
        let trig = summary(vec![TriggerObject::new(11, 40.0, 0.1, 0.0, 0.0)]);
        let tally = run(&mut p, &electrons, &trig);
        assert_eq!(tally.probes, 0);
        assert_eq!(integral(&p, "massVsmassZ_EB_denom"), 0.0);
    }

    #[test]
    fn matched_electron_outside_tag_region_forms_no_pair() {
        let mut p = plotter(true);
        // Endcap and below the tag pt threshold, but matched and identified.
        let soft = Electron::new(25.0, 2.0, 0.0, 1);
        let probe = Electron::new(40.0, 0.0, std::f64::consts::PI, -1)
            .with_id(IdVariables { hadronic_over_em: 0.5, ..IdVariables::default() });
        let mass = (soft.p4 + probe.p4).mass();
        assert!(mass > Z_MASS_WINDOW.0 && mass < Z_MASS_WINDOW.1, "mass {mass}");

        let trig = summary(vec![TriggerObject::new(11, 25.0, 2.0, 0.0, 0.0)]);
        let tally = run(&mut p, &[soft, probe], &trig);
        assert_eq!(tally, EventTally::default());
        assert_eq!(integral(&p, "resolutionPt"), 0.0);
        assert_eq!(integral(&p, "massVsmassZ_EB_denom"), 0.0);
        assert_eq!(integral(&p, "massVsmassZ_EE_denom"), 0.0);
        // Still an efficiency candidate.
        assert_eq!(integral(&p, "efficiencyTurnOn_numer"), 1.0);
    }

    #[test]
    fn pairs_outside_mass_window_are_skipped() {
        let mut p = plotter(true);
        // Nearly collinear legs: mass far below 60.
        let electrons = [Electron::new(40.0, 0.1, 0.0, 1), Electron::new(35.0, -0.2, 0.5, -1)];
        let trig = summary(vec![TriggerObject::new(11, 40.0, 0.1, 0.0, 0.0)]);
        let tally = run(&mut p, &electrons, &trig);
        assert_eq!(tally.probes, 0);
        assert_eq!(integral(&p, "massVsmassZ_EB_denom"), 0.0);
        assert_eq!(integral(&p, "massVsmassZ_EE_denom"), 0.0);
    }

    #[test]
    fn efficiency_numerator_requires_match() {
        let mut p = plotter(false);
        let electrons = [Electron::new(40.0, 0.1, 0.0, 1), Electron::new(50.0, -1.0, 2.0, -1)];
        let trig = summary(vec![TriggerObject::new(11, 40.0, 0.1, 0.0, 0.0)]);
        let tally = run(&mut p, &electrons, &trig);

        assert_eq!(integral(&p, "efficiencyEta_denom"), 2.0);
        assert_eq!(integral(&p, "efficiencyEta_numer"), 1.0);
        assert_eq!(integral(&p, "efficiencyVertex_denom"), 2.0);
        assert_eq!(integral(&p, "deltaR"), 1.0);
        // Tags are only counted on the last filter.
        assert_eq!(tally, EventTally::default());
    }

    #[test]
    fn gap_and_low_pt_electrons_skip_efficiency() {
        let mut p = plotter(false);
        let electrons = [Electron::new(40.0, 1.5, 0.0, 1), Electron::new(15.0, 0.0, 1.0, -1)];
        let trig = summary(Vec::new());
        run(&mut p, &electrons, &trig);
        assert_eq!(integral(&p, "efficiencyTurnOn_denom"), 0.0);
    }

    #[test]
    fn electrons_failing_identification_are_ignored() {
        let mut p = plotter(true);
        let loose = IdVariables { hadronic_over_em: 0.5, ..IdVariables::default() };
        let electrons = [Electron::new(40.0, 0.1, 0.0, 1).with_id(loose)];
        let trig = summary(vec![TriggerObject::new(11, 40.0, 0.1, 0.0, 0.0)]);
        let tally = run(&mut p, &electrons, &trig);
        assert_eq!(tally.tags, 0);
        assert_eq!(integral(&p, "resolutionPt"), 0.0);
        assert_eq!(integral(&p, "efficiencyEta_denom"), 0.0);
        // The trigger object is still matched, so it is not a fake.
        assert_eq!(integral(&p, "fakerateEta_numer"), 0.0);
    }

    #[test]
    fn unconfigured_selection_evaluates_nothing() {
        let mut p = MatchAndPlot::new(&PlotterConfig::default(), PATH, MODULE, true);
        p.book();
        let electrons = [Electron::new(40.0, 0.1, 0.0, 1)];
        let trig = summary(vec![TriggerObject::new(11, 40.0, 0.1, 0.0, 0.0)]);
        run(&mut p, &electrons, &trig);
        assert_eq!(integral(&p, "hltPt"), 0.0);
        assert_eq!(integral(&p, "efficiencyEta_denom"), 0.0);
    }
}
