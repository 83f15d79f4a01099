//! End-to-end tag-and-probe accounting on hand-built events.

use std::f64::consts::PI;

use approx::assert_relative_eq;
use ns_trigval::{
    Electron, EventData, EventTally, FilterTag, IdVariables, MatchAndPlot, PlotterConfig, Point3,
    TriggerObject, TriggerSummary,
};

const PATH: &str = "HLT_Ele27_WPTight_Gsf_v7";
const MODULE: &str = "hltEle27WPTightGsfTrackIsoFilter";

fn config() -> PlotterConfig {
    PlotterConfig::from_yaml_str(
        r#"
targetParams:
  recoCuts: "pt > 10 && abs(eta) < 2.5"
  hltCuts: "pt > 5"
  ptCut_Z: 20
plotCuts:
  DeltaR: 0.1
  maxEta: 2.5
  minPtFactor: 1.0
"#,
    )
    .unwrap()
}

fn booked_last_filter() -> MatchAndPlot {
    // binParams is absent from the YAML, so the default binning applies.
    let mut p = MatchAndPlot::new(&config(), PATH, MODULE, true);
    p.book();
    p
}

fn summary_for(objects: Vec<TriggerObject>) -> TriggerSummary {
    let keys = (0..objects.len()).collect();
    TriggerSummary::new(objects).with_filter(FilterTag::new(MODULE, "HLT"), keys)
}

fn analyze(plotter: &mut MatchAndPlot, electrons: &[Electron], summary: &TriggerSummary) -> EventTally {
    let no_conversions = |_: &Electron, _: &Point3| false;
    let event = EventData {
        electrons,
        rho: 10.0,
        conversions: &no_conversions,
        beam_spot: Point3::default(),
        n_vertices: 18,
        trigger_summary: summary,
    };
    plotter.analyze(&event)
}

fn integral(plotter: &MatchAndPlot, name: &str) -> f64 {
    plotter.registry().snapshot(name).unwrap().integral()
}

/// Tag: identified, matched, barrel. Probe: opposite charge, matched, fails
/// the tight ID (so it is never a tag itself).
fn z_event() -> (Vec<Electron>, TriggerSummary) {
    let tag = Electron::new(40.0, 0.1, 0.0, -1);
    let probe = Electron::new(35.0, -0.2, PI, 1)
        .with_id(IdVariables { hadronic_over_em: 0.3, ..IdVariables::default() });
    let hlt = summary_for(vec![
        TriggerObject::new(11, 39.5, 0.11, 0.005, 0.0),
        TriggerObject::new(-11, 34.0, -0.21, PI - 0.01, 0.0),
    ]);
    (vec![tag, probe], hlt)
}

#[test]
fn z_pair_fills_barrel_numerator_and_denominator() {
    let mut p = booked_last_filter();
    let (electrons, hlt) = z_event();
    let tally = analyze(&mut p, &electrons, &hlt);

    assert_eq!(tally, EventTally { tags: 1, probes: 1, passing_probes: 1 });

    let mass = (electrons[0].p4 + electrons[1].p4).mass();
    assert!(mass > 60.0 && mass < 120.0);
    for suffix in ["denom", "numer"] {
        let h = p.registry().snapshot(&format!("massVsmassZ_EB_{suffix}")).unwrap();
        assert_eq!(h.integral(), 1.0);
        assert_eq!(h.content_at(mass), 1.0);
        assert_eq!(integral(&p, &format!("massVsmassZ_EE_{suffix}")), 0.0);
        assert_eq!(integral(&p, &format!("massVsPtZ_EB_{suffix}")), 1.0);
        assert_eq!(integral(&p, &format!("massVsPhiVsEtaZ_EB_{suffix}")), 1.0);
    }

    // Exactly one tag resolution fill.
    assert_eq!(integral(&p, "resolutionPt"), 1.0);
    assert_eq!(integral(&p, "resolutionEta"), 1.0);
    assert_eq!(integral(&p, "deltaR"), 1.0);
    let res = p.registry().snapshot("resolutionPt").unwrap();
    assert_relative_eq!(res.content_at((40.0 - 39.5) / 40.0), 1.0);
}

#[test]
fn unmatched_probe_fills_denominator_only() {
    let mut p = booked_last_filter();
    let (electrons, mut hlt) = z_event();
    hlt = summary_for(hlt.objects()[..1].to_vec());
    let tally = analyze(&mut p, &electrons, &hlt);

    assert_eq!(tally, EventTally { tags: 1, probes: 1, passing_probes: 0 });
    assert_eq!(integral(&p, "massVsmassZ_EB_denom"), 1.0);
    assert_eq!(integral(&p, "massVsmassZ_EB_numer"), 0.0);
}

#[test]
fn endcap_probe_goes_to_endcap_histograms() {
    let mut p = booked_last_filter();
    let tag = Electron::new(45.0, 0.0, 0.0, 1);
    let probe = Electron::new(30.0, 1.8, 3.0, -1)
        .with_id(IdVariables { hadronic_over_em: 0.3, ..IdVariables::default() });
    let electrons = vec![tag, probe];
    let hlt = summary_for(vec![TriggerObject::new(11, 44.0, 0.0, 0.0, 0.0)]);

    let mass = (electrons[0].p4 + electrons[1].p4).mass();
    assert!(mass > 60.0 && mass < 120.0, "mass {mass}");
    analyze(&mut p, &electrons, &hlt);
    assert_eq!(integral(&p, "massVsmassZ_EE_denom"), 1.0);
    assert_eq!(integral(&p, "massVsmassZ_EB_denom"), 0.0);
    assert_eq!(integral(&p, "massVsmassZ_EE_numer"), 0.0);
}

#[test]
fn only_one_pair_per_event() {
    let mut p = booked_last_filter();
    let tag = Electron::new(40.0, 0.1, 0.0, -1);
    let loose = IdVariables { hadronic_over_em: 0.3, ..IdVariables::default() };
    let probe_a = Electron::new(35.0, -0.2, PI, 1).with_id(loose);
    let probe_b = Electron::new(38.0, 0.3, PI - 0.2, 1).with_id(loose);
    let hlt = summary_for(vec![TriggerObject::new(11, 40.0, 0.1, 0.0, 0.0)]);

    let tally = analyze(&mut p, &[tag, probe_a, probe_b], &hlt);
    assert_eq!(tally.probes, 1);
    assert_eq!(integral(&p, "massVsmassZ_EB_denom"), 1.0);
}

#[test]
fn soft_tag_below_z_threshold_forms_no_pair() {
    let mut cfg = config();
    cfg.target_params.pt_cut_z = 50.0;
    let mut p = MatchAndPlot::new(&cfg, PATH, MODULE, true);
    p.book();

    let (electrons, hlt) = z_event();
    let tally = analyze(&mut p, &electrons, &hlt);
    assert_eq!(tally.tags, 1);
    assert_eq!(tally.probes, 0);
}

#[test]
fn fake_rate_over_events() {
    let mut p = booked_last_filter();
    let (electrons, hlt) = z_event();
    analyze(&mut p, &electrons, &hlt);
    // Second event: no reconstructed electrons, every trigger object is fake.
    analyze(&mut p, &[], &hlt);

    assert_eq!(integral(&p, "fakerateTurnOn_denom"), 4.0);
    assert_eq!(integral(&p, "fakerateTurnOn_numer"), 2.0);
    assert_eq!(integral(&p, "fakerateVertex_numer"), 2.0);
}
