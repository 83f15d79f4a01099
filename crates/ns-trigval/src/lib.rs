//! # ns-trigval
//!
//! Electron trigger validation for NextStat.
//!
//! Matches offline-reconstructed electrons to the trigger objects accepted by
//! each filter of an HLT path (greedy one-to-one ΔR matching), applies a
//! cut-based tight identification, and fills efficiency, fake-rate, resolution
//! and Z tag-and-probe histograms. Histograms are plain accumulators that can
//! be merged across workers and snapshotted for serialization.
//!
//! ## Example
//!
//! ```no_run
//! use ns_trigval::{Electron, EventData, PathAnalyzer, PlotterConfig, Point3, TriggerSummary};
//!
//! let config = PlotterConfig::from_path("egamma.yaml").unwrap();
//! let mut analyzer = PathAnalyzer::new(
//!     &config,
//!     "HLT_Ele27_WPTight_Gsf_v7",
//!     &["hltEle27L1Filter", "hltEle27WPTightGsfTrackIsoFilter"],
//! );
//! analyzer.begin_run();
//!
//! let electrons: Vec<Electron> = Vec::new();
//! let summary = TriggerSummary::default();
//! let no_conversions = |_: &Electron, _: &Point3| false;
//! let event = EventData {
//!     electrons: &electrons,
//!     rho: 12.5,
//!     conversions: &no_conversions,
//!     beam_spot: Point3::default(),
//!     n_vertices: 25,
//!     trigger_summary: &summary,
//! };
//! analyzer.analyze(&event);
//!
//! let out = analyzer.end_run().unwrap();
//! println!("{}", out.to_json().unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analyzer;
pub mod binning;
pub mod config;
pub mod efficiency;
pub mod error;
pub mod expr;
pub mod histogram;
pub mod identification;
pub mod kinematics;
pub mod matching;
pub mod objects;
pub mod plotter;
pub mod registry;
pub mod selection;

pub use analyzer::{PathAnalyzer, RunOutput};
pub use binning::{BinEdges, resolve_edges};
pub use config::{PlotterConfig, TargetParams, min_pt_cut_from_path, path_folder};
pub use efficiency::{
    MassWindow, Yield, compute_efficiencies, compute_tag_and_probe_efficiencies, efficiency,
    sideband_yield, tag_and_probe_efficiency,
};
pub use error::{Result, TrigValError};
pub use expr::{CutSelector, CutVariables};
pub use histogram::{Accumulator, Histogram1D, Histogram2D, HistogramSnapshot};
pub use identification::{EffectiveAreas, IdThresholds, WorkingPoint, pf_isolation_rel};
pub use kinematics::{Direction, FourMomentum, Point3, delta_phi, delta_r};
pub use matching::{Assignment, greedy_match, match_by_delta_r};
pub use objects::{
    Conversion, ConversionCollection, ConversionVeto, Electron, EventData, FilterTag, IdVariables,
    PfIsolation, Track, TriggerObject, TriggerSummary,
};
pub use plotter::{EfficiencySuffix, EventTally, MatchAndPlot};
pub use registry::HistogramRegistry;
pub use selection::{ElectronSelection, select_electrons, select_trigger_objects};
