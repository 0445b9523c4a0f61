//! Recoverable problems found while analysing a single event.
//!
//! None of these stop the run. The affected particle is excluded or the
//! event's physical weight is zeroed, and the diagnostic is handed back to
//! the caller in the [`EventReport`](crate::EventReport).

use detint_kinematics::KinematicsError;
use detint_types::GeometryError;

/// A per-event diagnostic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventDiagnostic {
    /// The candidate has `pz == 0`, so its slope is undefined.
    #[error("particle {particle}: zero longitudinal momentum, excluded")]
    ZeroLongitudinalMomentum {
        /// 1-based particle index.
        particle: u32,
    },

    /// The candidate's momentum produced a non-finite slope.
    #[error("particle {particle}: non-finite momentum, excluded")]
    NonFiniteMomentum {
        /// 1-based particle index.
        particle: u32,
    },

    /// The run header describes an unusable detector.
    #[error("particle {particle}: invalid detector geometry ({source}), excluded")]
    InvalidGeometry {
        /// 1-based particle index.
        particle: u32,
        /// What is wrong with the geometry.
        source: GeometryError,
    },

    /// The header selects a process this program does not know.
    #[error("interaction process {code} not recognized, event weight set to zero")]
    UnrecognizedProcess {
        /// The raw process code.
        code: i32,
    },

    /// The kinematics provider could not produce the interaction.
    #[error("particle {particle}: interaction failed ({source}), event weight set to zero")]
    Kinematics {
        /// 1-based particle index.
        particle: u32,
        /// The provider error.
        source: KinematicsError,
    },

    /// The event cannot hold any more particles.
    #[error("particle {particle}: particle list full, secondaries not added")]
    ParticleListFull {
        /// 1-based particle index.
        particle: u32,
    },
}
