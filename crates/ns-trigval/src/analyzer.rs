//! Per-path driver: one [`MatchAndPlot`] per filter module.
//!
//! The last module of the path is the "last filter" and gets the full set of
//! trigger-object, fake-rate and tag-and-probe plots.

use serde::{Deserialize, Serialize};

use crate::config::PlotterConfig;
use crate::efficiency::{MassWindow, compute_efficiencies, compute_tag_and_probe_efficiencies};
use crate::error::{Result, TrigValError};
use crate::histogram::HistogramSnapshot;
use crate::objects::EventData;
use crate::plotter::{EventTally, MatchAndPlot};

/// Everything produced for one path over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Trigger path name.
    pub hlt_path: String,
    /// All booked histograms, named by full path.
    pub histograms: Vec<HistogramSnapshot>,
    /// Derived `<base>_eff` histograms, followed by the background-subtracted
    /// `<base>_tnpEff` ones.
    pub efficiencies: Vec<HistogramSnapshot>,
    /// Counters summed over the run.
    pub tally: EventTally,
}

impl RunOutput {
    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Validation of one trigger path.
#[derive(Debug)]
pub struct PathAnalyzer {
    hlt_path: String,
    plotters: Vec<MatchAndPlot>,
    mass_window: MassWindow,
    booked: bool,
    n_events: u64,
    tally: EventTally,
}

impl PathAnalyzer {
    /// Analyzer for `hlt_path` whose filter modules run in `module_labels` order.
    pub fn new<S: AsRef<str>>(config: &PlotterConfig, hlt_path: &str, module_labels: &[S]) -> Self {
        if module_labels.is_empty() {
            log::warn!("path {hlt_path} has no filter modules; nothing will be plotted");
        }
        let last = module_labels.len().saturating_sub(1);
        let plotters = module_labels
            .iter()
            .enumerate()
            .map(|(i, label)| MatchAndPlot::new(config, hlt_path, label.as_ref(), i == last))
            .collect();
        Self {
            hlt_path: hlt_path.to_string(),
            plotters,
            mass_window: config.mass_window,
            booked: false,
            n_events: 0,
            tally: EventTally::default(),
        }
    }

    /// Trigger path name.
    pub fn hlt_path(&self) -> &str {
        &self.hlt_path
    }

    /// Plotters in module order.
    pub fn plotters(&self) -> &[MatchAndPlot] {
        &self.plotters
    }

    /// Events analyzed so far.
    pub fn n_events(&self) -> u64 {
        self.n_events
    }

    /// Book all histograms. Later calls are no-ops.
    pub fn begin_run(&mut self) {
        if self.booked {
            return;
        }
        for plotter in &mut self.plotters {
            plotter.book();
        }
        self.booked = true;
        log::info!("{}: booked {} filter modules", self.hlt_path, self.plotters.len());
    }

    /// Run every module's accounting on one event.
    ///
    /// Books first if [`begin_run`](Self::begin_run) was not called.
    pub fn analyze(&mut self, event: &EventData<'_>) -> EventTally {
        if !self.booked {
            self.begin_run();
        }
        let mut tally = EventTally::default();
        for plotter in &mut self.plotters {
            tally += plotter.analyze(event);
        }
        self.n_events += 1;
        self.tally += tally;
        tally
    }

    /// Add another analyzer's histograms (e.g. from a worker thread that saw
    /// a different slice of the run).
    ///
    /// Every module is checked before anything is added, so on error `self`
    /// is unchanged.
    pub fn merge(&mut self, other: &PathAnalyzer) -> Result<()> {
        if self.hlt_path != other.hlt_path || self.plotters.len() != other.plotters.len() {
            return Err(TrigValError::HistogramMerge(format!(
                "cannot merge path {} ({} modules) into {} ({} modules)",
                other.hlt_path,
                other.plotters.len(),
                self.hlt_path,
                self.plotters.len()
            )));
        }
        for (ours, theirs) in self.plotters.iter().zip(&other.plotters) {
            ours.check_merge(theirs)?;
        }
        for (ours, theirs) in self.plotters.iter_mut().zip(&other.plotters) {
            ours.merge(theirs)?;
        }
        self.n_events += other.n_events;
        self.tally += other.tally;
        Ok(())
    }

    /// Collect histograms and derived efficiencies.
    pub fn end_run(&self) -> Result<RunOutput> {
        let histograms: Vec<HistogramSnapshot> =
            self.plotters.iter().flat_map(|p| p.registry().snapshots()).collect();
        let mut efficiencies = compute_efficiencies(&histograms)?;
        efficiencies.extend(compute_tag_and_probe_efficiencies(&histograms, &self.mass_window)?);
        log::info!(
            "{}: {} events, {} tags, {} probes ({} passing)",
            self.hlt_path,
            self.n_events,
            self.tally.tags,
            self.tally.probes,
            self.tally.passing_probes
        );
        Ok(RunOutput { hlt_path: self.hlt_path.clone(), histograms, efficiencies, tally: self.tally })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::Point3;
    use crate::objects::{Electron, FilterTag, TriggerObject, TriggerSummary};

    const PATH: &str = "HLT_Ele32_WPTight_Gsf_v4";
    const MODULES: [&str; 2] = ["hltEle32L1Filter", "hltEle32WPTightGsfTrackIsoFilter"];

    fn config() -> PlotterConfig {
        let mut cfg = PlotterConfig::default();
        cfg.target_params.reco_cuts = Some("pt > 10".into());
        cfg.target_params.hlt_cuts = Some(String::new());
        cfg
    }

    fn one_event(analyzer: &mut PathAnalyzer) -> EventTally {
        let electrons = [Electron::new(45.0, 0.3, 1.0, -1)];
        let hlt = vec![TriggerObject::new(11, 44.0, 0.31, 1.0, 0.0)];
        let summary = TriggerSummary::new(hlt)
            .with_filter(FilterTag::new(MODULES[0], "HLT"), vec![0])
            .with_filter(FilterTag::new(MODULES[1], "HLT"), vec![0]);
        let no_conversions = |_: &Electron, _: &Point3| false;
        let event = EventData {
            electrons: &electrons,
            rho: 0.0,
            conversions: &no_conversions,
            beam_spot: Point3::default(),
            n_vertices: 20,
            trigger_summary: &summary,
        };
        analyzer.analyze(&event)
    }

    #[test]
    fn last_module_is_flagged() {
        let analyzer = PathAnalyzer::new(&config(), PATH, &MODULES);
        let flags: Vec<bool> = analyzer.plotters().iter().map(|p| p.is_last_filter()).collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn run_output_has_efficiencies_for_every_pair() {
        let mut analyzer = PathAnalyzer::new(&config(), PATH, &MODULES);
        analyzer.begin_run();
        let tally = one_event(&mut analyzer);
        assert_eq!(tally.tags, 1);

        let out = analyzer.end_run().unwrap();
        assert_eq!(out.histograms.len(), 12 + 61);
        // 5 per inner module, 5 + 1 + 5 + 16 for the last one, plus the two
        // background-subtracted Z efficiencies.
        assert_eq!(out.efficiencies.len(), 5 + 27 + 2);
        assert!(out.efficiencies.iter().any(|h| h.name.ends_with("massVsmassZ_EE_tnpEff")));
        let eff = out
            .efficiencies
            .iter()
            .find(|h| h.name == "HLT/EGM/HLT_Ele32_WPTight_Gsf/efficiencyEta_eff")
            .unwrap();
        assert_eq!(eff.content_at(0.3), 1.0);
        assert!(out.to_json().unwrap().contains("efficiencyTurnOn_eff"));
    }

    #[test]
    fn merge_adds_worker_results() {
        let mut a = PathAnalyzer::new(&config(), PATH, &MODULES);
        let mut b = PathAnalyzer::new(&config(), PATH, &MODULES);
        a.begin_run();
        b.begin_run();
        one_event(&mut a);
        one_event(&mut b);
        one_event(&mut b);
        a.merge(&b).unwrap();
        assert_eq!(a.n_events(), 3);

        let out = a.end_run().unwrap();
        assert_eq!(out.tally.tags, 3);
        let denom = out
            .histograms
            .iter()
            .find(|h| h.name == "HLT/EGM/HLT_Ele32_WPTight_Gsf/hltEle32L1Filter/efficiencyEta_denom")
            .unwrap();
        assert_eq!(denom.integral(), 3.0);

        let other = PathAnalyzer::new(&config(), "HLT_Ele35_WPTight_Gsf_v1", &MODULES);
        assert!(a.merge(&other).is_err());
    }

    #[test]
    fn failed_merge_leaves_analyzer_untouched() {
        let mut a = PathAnalyzer::new(&config(), PATH, &MODULES);
        one_event(&mut a);
        let before = a.end_run().unwrap();

        // First module lines up, the second does not.
        let mut b = PathAnalyzer::new(&config(), PATH, &[MODULES[0], "hltEle32OtherFilter"]);
        one_event(&mut b);
        let err = a.merge(&b).unwrap_err();
        assert!(matches!(err, TrigValError::HistogramMerge(_)));

        assert_eq!(a.n_events(), 1);
        assert_eq!(a.end_run().unwrap(), before);
    }
}
