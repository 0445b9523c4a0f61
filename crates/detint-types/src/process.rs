//! Interaction process selector.
//!
//! The run header carries an integer process code. It is decoded once into a
//! [`ProcessKind`] so downstream code can match exhaustively instead of
//! switching on raw integers.

use serde::{Deserialize, Serialize};

use crate::codes::{RECOIL_ELECTRON, RECOIL_PROTON};

/// Electron mass in GeV.
pub const ELECTRON_MASS: f64 = 0.000_510_998_95;

/// Proton mass in GeV.
pub const PROTON_MASS: f64 = 0.938_272_088;

/// Target species hit by the incident particle inside the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// A proton (nucleon) at rest.
    Proton,
    /// An atomic electron at rest.
    Electron,
}

impl TargetKind {
    /// Rest mass of the target in GeV.
    pub const fn mass(self) -> f64 {
        match self {
            Self::Proton => PROTON_MASS,
            Self::Electron => ELECTRON_MASS,
        }
    }

    /// Particle code assigned to the recoiling target.
    pub const fn recoil_code(self) -> i32 {
        match self {
            Self::Proton => RECOIL_PROTON,
            Self::Electron => RECOIL_ELECTRON,
        }
    }

    /// Short lowercase name for logs and output tables.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proton => "proton",
            Self::Electron => "electron",
        }
    }
}

/// The interaction applied to an accepted particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessKind {
    /// No interaction: the event carries no detector signal.
    None,
    /// Elastic scattering off the given target.
    Elastic(TargetKind),
    /// Inelastic scattering off the given target (not modelled).
    Inelastic(TargetKind),
    /// A process code this program does not know.
    Unrecognized(i32),
}

impl ProcessKind {
    /// Decode a header process code.
    ///
    /// `0` none, `1` elastic on proton, `2` elastic on electron, `3`
    /// inelastic on proton, `4` inelastic on electron.
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Elastic(TargetKind::Proton),
            2 => Self::Elastic(TargetKind::Electron),
            3 => Self::Inelastic(TargetKind::Proton),
            4 => Self::Inelastic(TargetKind::Electron),
            other => Self::Unrecognized(other),
        }
    }

    /// The header code for this process.
    pub const fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Elastic(TargetKind::Proton) => 1,
            Self::Elastic(TargetKind::Electron) => 2,
            Self::Inelastic(TargetKind::Proton) => 3,
            Self::Inelastic(TargetKind::Electron) => 4,
            Self::Unrecognized(code) => code,
        }
    }
}

impl std::fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Elastic(target) => write!(f, "elastic-{}", target.as_str()),
            Self::Inelastic(target) => write!(f, "inelastic-{}", target.as_str()),
            Self::Unrecognized(code) => write!(f, "unrecognized({code})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in -1..=6 {
            assert_eq!(ProcessKind::from_code(code).code(), code);
        }
    }

    #[test]
    fn known_codes_decode() {
        assert_eq!(ProcessKind::from_code(0), ProcessKind::None);
        assert_eq!(
            ProcessKind::from_code(2),
            ProcessKind::Elastic(TargetKind::Electron)
        );
        assert_eq!(
            ProcessKind::from_code(3),
            ProcessKind::Inelastic(TargetKind::Proton)
        );
        assert_eq!(ProcessKind::from_code(42), ProcessKind::Unrecognized(42));
    }

    #[test]
    fn recoil_codes_depend_on_target() {
        assert_eq!(TargetKind::Proton.recoil_code(), 9212);
        assert_eq!(TargetKind::Electron.recoil_code(), 911);
    }
}
