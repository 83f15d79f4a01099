//! Per-event physics objects: reconstructed electrons, trigger objects and
//! the trigger summary that associates them with filters.

use serde::{Deserialize, Serialize};

use crate::expr::CutVariables;
use crate::kinematics::{Direction, FourMomentum, Point3};

/// Electron mass in GeV.
pub const ELECTRON_MASS: f64 = 0.000_510_998_95;

/// Reconstructed track attached to an electron.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Index of the track in the event's track collection.
    pub key: usize,
    /// Reference point (point of closest approach).
    pub vertex: Point3,
    /// Momentum x component at the reference point.
    pub px: f64,
    /// Momentum y component at the reference point.
    pub py: f64,
    /// Momentum z component at the reference point.
    pub pz: f64,
    /// Missing hits before the first measured hit.
    pub missing_inner_hits: u32,
}

impl Track {
    /// Track starting at the origin along (pt, η, φ).
    pub fn from_direction(key: usize, pt: f64, eta: f64, phi: f64) -> Self {
        Self {
            key,
            vertex: Point3::default(),
            px: pt * phi.cos(),
            py: pt * phi.sin(),
            pz: pt * eta.sinh(),
            missing_inner_hits: 0,
        }
    }

    /// Transverse momentum, or 1 when zero so it can be used as a divisor.
    fn pt_divisor(&self) -> f64 {
        let pt = self.px.hypot(self.py);
        if pt > 0.0 { pt } else { 1.0 }
    }

    /// Transverse impact parameter with respect to `point`.
    pub fn dxy(&self, point: &Point3) -> f64 {
        let dx = self.vertex.x - point.x;
        let dy = self.vertex.y - point.y;
        (-dx * self.py + dy * self.px) / self.pt_divisor()
    }

    /// Longitudinal impact parameter with respect to `point`.
    pub fn dz(&self, point: &Point3) -> f64 {
        let dx = self.vertex.x - point.x;
        let dy = self.vertex.y - point.y;
        let pt = self.pt_divisor();
        (self.vertex.z - point.z) - (dx * self.px + dy * self.py) / pt * (self.pz / pt)
    }
}

/// Particle-flow isolation sums in a ΔR < 0.3 cone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PfIsolation {
    /// Σ pt of charged hadrons.
    pub charged_hadron: f64,
    /// Σ Et of neutral hadrons.
    pub neutral_hadron: f64,
    /// Σ Et of photons.
    pub photon: f64,
}

/// Shower-shape and track-cluster variables used by the identification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdVariables {
    /// Full 5x5 σ_iηiη.
    pub sigma_ieta_ieta: f64,
    /// Δη(seed cluster, track at vertex).
    pub delta_eta_seed_track: f64,
    /// Δφ(supercluster, track at vertex).
    pub delta_phi_sc_track: f64,
    /// Hadronic over electromagnetic energy.
    pub hadronic_over_em: f64,
    /// Supercluster energy over track momentum.
    pub e_sc_over_p: f64,
    /// ECAL energy.
    pub ecal_energy: f64,
}

impl Default for IdVariables {
    fn default() -> Self {
        Self {
            sigma_ieta_ieta: 0.0,
            delta_eta_seed_track: 0.0,
            delta_phi_sc_track: 0.0,
            hadronic_over_em: 0.0,
            e_sc_over_p: 1.0,
            ecal_energy: 0.0,
        }
    }
}

/// Reconstructed electron candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Electron {
    /// Transverse momentum.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuthal angle.
    pub phi: f64,
    /// Electric charge (±1).
    pub charge: i32,
    /// Four-momentum.
    pub p4: FourMomentum,
    /// Supercluster pseudorapidity (defines the detector region).
    pub supercluster_eta: f64,
    /// Identification variables.
    pub id: IdVariables,
    /// Isolation sums.
    pub pf_isolation: PfIsolation,
    /// GSF track, if the electron has one.
    pub gsf_track: Option<Track>,
}

impl Electron {
    /// Electron with the given kinematics, a track along its direction and
    /// neutral identification/isolation values.
    pub fn new(pt: f64, eta: f64, phi: f64, charge: i32) -> Self {
        Self {
            pt,
            eta,
            phi,
            charge,
            p4: FourMomentum::from_pt_eta_phi_m(pt, eta, phi, ELECTRON_MASS),
            supercluster_eta: eta,
            id: IdVariables::default(),
            pf_isolation: PfIsolation::default(),
            gsf_track: Some(Track::from_direction(0, pt, eta, phi)),
        }
    }

    /// Set the supercluster η.
    pub fn with_supercluster_eta(mut self, eta: f64) -> Self {
        self.supercluster_eta = eta;
        self
    }

    /// Replace the identification variables.
    pub fn with_id(mut self, id: IdVariables) -> Self {
        self.id = id;
        self
    }

    /// Replace the isolation sums.
    pub fn with_isolation(mut self, iso: PfIsolation) -> Self {
        self.pf_isolation = iso;
        self
    }

    /// Replace (or drop) the GSF track.
    pub fn with_track(mut self, track: Option<Track>) -> Self {
        self.gsf_track = track;
        self
    }

    /// Missing inner hits of the GSF track (0 without a track).
    pub fn missing_inner_hits(&self) -> u32 {
        self.gsf_track.map(|t| t.missing_inner_hits).unwrap_or(0)
    }
}

impl Direction for Electron {
    fn eta(&self) -> f64 {
        self.eta
    }

    fn phi(&self) -> f64 {
        self.phi
    }
}

impl CutVariables for Electron {
    const VARIABLES: &'static [&'static str] = &[
        "pt",
        "eta",
        "phi",
        "charge",
        "energy",
        "superClusterEta",
        "sigmaIetaIeta",
        "hadronicOverEm",
        "eSuperClusterOverP",
    ];

    fn variable(&self, index: usize) -> f64 {
        match index {
            0 => self.pt,
            1 => self.eta,
            2 => self.phi,
            3 => self.charge as f64,
            4 => self.p4.e,
            5 => self.supercluster_eta,
            6 => self.id.sigma_ieta_ieta,
            7 => self.id.hadronic_over_em,
            8 => self.id.e_sc_over_p,
            _ => f64::NAN,
        }
    }
}

/// Trigger-level candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerObject {
    /// Particle id (e.g. ±11).
    pub id: i32,
    /// Transverse momentum.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuthal angle.
    pub phi: f64,
    /// Mass.
    pub mass: f64,
}

impl TriggerObject {
    /// Create a trigger object.
    pub fn new(id: i32, pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        Self { id, pt, eta, phi, mass }
    }
}

impl Direction for TriggerObject {
    fn eta(&self) -> f64 {
        self.eta
    }

    fn phi(&self) -> f64 {
        self.phi
    }
}

impl CutVariables for TriggerObject {
    const VARIABLES: &'static [&'static str] = &["pt", "eta", "phi", "mass", "id", "energy"];

    fn variable(&self, index: usize) -> f64 {
        match index {
            0 => self.pt,
            1 => self.eta,
            2 => self.phi,
            3 => self.mass,
            4 => self.id as f64,
            5 => FourMomentum::from_pt_eta_phi_m(self.pt, self.eta, self.phi, self.mass).e,
            _ => f64::NAN,
        }
    }
}

/// Identifies a trigger filter: module label, instance and process name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterTag {
    /// Filter module label.
    pub label: String,
    /// Product instance (usually empty).
    pub instance: String,
    /// Process that ran the filter (e.g. `HLT`).
    pub process: String,
}

impl FilterTag {
    /// Tag with an empty instance.
    pub fn new(label: impl Into<String>, process: impl Into<String>) -> Self {
        Self { label: label.into(), instance: String::new(), process: process.into() }
    }
}

/// Trigger objects of one event and the keys each filter accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerSummary {
    objects: Vec<TriggerObject>,
    filters: Vec<(FilterTag, Vec<usize>)>,
}

impl TriggerSummary {
    /// Summary over the given object pool, with no filters yet.
    pub fn new(objects: Vec<TriggerObject>) -> Self {
        Self { objects, filters: Vec::new() }
    }

    /// Register a filter and the object keys it accepted.
    pub fn with_filter(mut self, tag: FilterTag, keys: Vec<usize>) -> Self {
        self.filters.push((tag, keys));
        self
    }

    /// Full trigger-object pool.
    pub fn objects(&self) -> &[TriggerObject] {
        &self.objects
    }

    /// Number of filters recorded.
    pub fn n_filters(&self) -> usize {
        self.filters.len()
    }

    /// Index of the filter with the given tag.
    pub fn filter_index(&self, tag: &FilterTag) -> Option<usize> {
        self.filters.iter().position(|(t, _)| t == tag)
    }

    /// Keys accepted by filter `index` (empty when out of range).
    pub fn filter_keys(&self, index: usize) -> &[usize] {
        self.filters.get(index).map(|(_, keys)| keys.as_slice()).unwrap_or(&[])
    }
}

/// Decides whether an electron comes from a photon conversion.
pub trait ConversionVeto {
    /// `true` if a good conversion is matched to the electron's track.
    fn has_matched_conversion(&self, electron: &Electron, beam_spot: &Point3) -> bool;
}

impl<F> ConversionVeto for F
where
    F: Fn(&Electron, &Point3) -> bool,
{
    fn has_matched_conversion(&self, electron: &Electron, beam_spot: &Point3) -> bool {
        self(electron, beam_spot)
    }
}

/// Reconstructed photon conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    /// Keys of the tracks forming the conversion.
    pub track_keys: Vec<usize>,
    /// Fitted conversion vertex.
    pub vertex: Point3,
    /// Refitted pair momentum, x component.
    pub px: f64,
    /// Refitted pair momentum, y component.
    pub py: f64,
    /// Vertex fit probability (`None` when the fit is invalid).
    pub vertex_probability: Option<f64>,
    /// Hits before the vertex, per leg.
    pub n_hits_before_vertex: Vec<u8>,
}

impl Conversion {
    const MIN_VERTEX_PROBABILITY: f64 = 1e-6;
    const MIN_LXY: f64 = 2.0;
    const MAX_HITS_BEFORE_VERTEX: u8 = 1;

    /// Conversion quality: valid fit with enough probability, displaced from
    /// the beam spot, and at most one hit before the vertex on every leg.
    pub fn is_good(&self, beam_spot: &Point3) -> bool {
        let Some(prob) = self.vertex_probability else {
            return false;
        };
        if prob < Self::MIN_VERTEX_PROBABILITY {
            return false;
        }
        let pt = self.px.hypot(self.py);
        if pt <= 0.0 {
            return false;
        }
        let lxy = ((self.vertex.x - beam_spot.x) * self.px
            + (self.vertex.y - beam_spot.y) * self.py)
            / pt;
        if lxy < Self::MIN_LXY {
            return false;
        }
        self.n_hits_before_vertex.iter().all(|&n| n <= Self::MAX_HITS_BEFORE_VERTEX)
    }
}

/// The event's conversion collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionCollection(pub Vec<Conversion>);

impl ConversionVeto for ConversionCollection {
    fn has_matched_conversion(&self, electron: &Electron, beam_spot: &Point3) -> bool {
        let Some(track) = electron.gsf_track else {
            return false;
        };
        self.0.iter().any(|c| c.track_keys.contains(&track.key) && c.is_good(beam_spot))
    }
}

/// Everything the accounting engine reads for one event.
pub struct EventData<'a> {
    /// Reconstructed electrons.
    pub electrons: &'a [Electron],
    /// Pileup energy density ρ.
    pub rho: f64,
    /// Conversion matching for the conversion veto.
    pub conversions: &'a dyn ConversionVeto,
    /// Beam-spot position.
    pub beam_spot: Point3,
    /// Number of reconstructed primary vertices.
    pub n_vertices: usize,
    /// Trigger objects and filter keys.
    pub trigger_summary: &'a TriggerSummary,
}
