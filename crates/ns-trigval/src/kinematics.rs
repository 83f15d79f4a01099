//! Four-vectors and angular distances.

use std::f64::consts::PI;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Anything with a direction in (η, φ).
pub trait Direction {
    /// Pseudorapidity.
    fn eta(&self) -> f64;
    /// Azimuthal angle.
    fn phi(&self) -> f64;
}

/// Azimuthal difference `a - b` wrapped to (−π, π].
pub fn delta_phi(a: f64, b: f64) -> f64 {
    let d = (a - b + PI).rem_euclid(2.0 * PI) - PI;
    if d <= -PI { d + 2.0 * PI } else { d }
}

/// Angular distance ΔR = sqrt(Δη² + Δφ²).
pub fn delta_r<A: Direction + ?Sized, B: Direction + ?Sized>(a: &A, b: &B) -> f64 {
    let deta = a.eta() - b.eta();
    let dphi = delta_phi(a.phi(), b.phi());
    (deta * deta + dphi * dphi).sqrt()
}

/// A point in the detector frame (cm).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// x coordinate.
    pub x: f64,
    /// y coordinate.
    pub y: f64,
    /// z coordinate.
    pub z: f64,
}

impl Point3 {
    /// Create a point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Cartesian four-momentum (px, py, pz, E).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FourMomentum {
    /// x component.
    pub px: f64,
    /// y component.
    pub py: f64,
    /// z component.
    pub pz: f64,
    /// Energy.
    pub e: f64,
}

impl FourMomentum {
    /// Create from Cartesian components.
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Create from (pt, η, φ, m).
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, m: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let p2 = px * px + py * py + pz * pz;
        Self { px, py, pz, e: (p2 + m * m).sqrt() }
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Invariant mass. Space-like vectors return `-sqrt(-m²)`.
    pub fn mass(&self) -> f64 {
        let m2 = self.e * self.e - (self.px * self.px + self.py * self.py + self.pz * self.pz);
        if m2 >= 0.0 { m2.sqrt() } else { -(-m2).sqrt() }
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
            e: self.e + rhs.e,
        }
    }
}

impl<T: Direction + ?Sized> Direction for &T {
    fn eta(&self) -> f64 {
        (**self).eta()
    }

    fn phi(&self) -> f64 {
        (**self).phi()
    }
}

impl Direction for (f64, f64) {
    fn eta(&self) -> f64 {
        self.0
    }

    fn phi(&self) -> f64 {
        self.1
    }
}
