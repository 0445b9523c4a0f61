//! Particle type and status codes.
//!
//! The dark fermion produced upstream carries the code `611` (its
//! antiparticle `-611`). After an elastic interaction in the detector the
//! scattered dark fermion is re-coded `9611`, and the recoiling target is
//! tagged with a code that records which target species it came from.

use serde::{Deserialize, Serialize};

/// Particle code of the dark fermion (and, negated, its antiparticle).
pub const DARK_FERMION: i32 = 611;

/// Particle code given to a dark fermion after it scattered in the detector.
pub const SCATTERED_DARK_FERMION: i32 = 9611;

/// Particle code of a recoil proton produced by elastic scattering.
pub const RECOIL_PROTON: i32 = 9212;

/// Particle code of a recoil electron produced by elastic scattering.
pub const RECOIL_ELECTRON: i32 = 911;

/// Whether a particle code identifies a candidate incident particle.
pub const fn is_candidate(id: i32) -> bool {
    id == DARK_FERMION || id == -DARK_FERMION
}

/// Status code of a particle entry.
///
/// Unknown values read from an input file are preserved as-is so the writer
/// can round-trip them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCode(pub i32);

impl StatusCode {
    /// Particle removed from consideration by a cut.
    pub const EXCLUDED: Self = Self(0);
    /// Incoming beam particle.
    pub const INCOMING: Self = Self(-1);
    /// Final-state (outgoing) particle.
    pub const FINAL: Self = Self(1);

    /// Whether this status marks the particle as excluded.
    pub const fn is_excluded(self) -> bool {
        self.0 == Self::EXCLUDED.0
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
