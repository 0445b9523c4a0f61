//! Kinematics provider for dark-fermion interactions in the detector.
//!
//! The analysis core only sees the [`KinematicsProvider`] trait: one call
//! producing the elastic recoil of the incident particle off a target, and
//! one call turning an entry point into a path length and an interaction
//! vertex. [`DarkPhotonKinematics`] is the production implementation.
//!
//! # Modules
//!
//! - [`cross_section`] -- Dark-photon mediated elastic cross sections and
//!   the recoil energy spectrum
//! - [`chord`] -- Straight-line path through the detector box
//! - [`provider`] -- [`DarkPhotonKinematics`] and its settings

pub mod chord;
pub mod cross_section;
pub mod provider;

use detint_types::{FiducialVolume, FourMomentum, TargetKind, Vector3};

pub use provider::{DarkPhotonKinematics, KinematicsSettings};

/// Conversion from GeV^-2 to cm^2.
pub const GEV2_TO_CM2: f64 = 0.389_379_372e-27;

/// Centimetres per metre.
pub const CM_PER_M: f64 = 100.0;

/// Errors raised while computing interaction kinematics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KinematicsError {
    /// The electromagnetic coupling has not been configured yet.
    #[error("electromagnetic coupling not configured")]
    CouplingNotConfigured,

    /// The incident energy does not exceed the incident mass.
    #[error("incident energy {energy} GeV does not exceed its mass {mass} GeV")]
    BelowMassShell {
        /// Incident energy.
        energy: f64,
        /// Incident mass.
        mass: f64,
    },

    /// The kinematically allowed recoil range lies below the threshold.
    #[error("no phase space: maximum recoil {t_max} GeV below threshold {threshold} GeV")]
    NoPhaseSpace {
        /// Largest kinematically allowed recoil kinetic energy.
        t_max: f64,
        /// Configured recoil threshold.
        threshold: f64,
    },

    /// The cross section vanishes for this incident energy, so no recoil
    /// can be sampled.
    #[error("vanishing cross section at incident energy {energy} GeV")]
    VanishingCrossSection {
        /// Incident energy.
        energy: f64,
    },

    /// The trajectory does not cross the detector box.
    #[error("trajectory from ({x}, {y}, {z}) does not cross the detector")]
    MissesVolume {
        /// Entry point x.
        x: f64,
        /// Entry point y.
        y: f64,
        /// Entry point z.
        z: f64,
    },

    /// A computed quantity was not a finite number.
    #[error("non-finite {quantity}")]
    NonFinite {
        /// Name of the quantity.
        quantity: &'static str,
    },
}

/// Outcome of an elastic scattering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticRecoil {
    /// Total cross section for the incident energy, in cm^2.
    pub cross_section: f64,
    /// Four-momentum of the scattered incident particle.
    pub scattered: FourMomentum,
    /// Four-momentum of the recoiling target.
    pub recoil: FourMomentum,
}

/// Where in the detector the interaction happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSite {
    /// Length of the trajectory inside the detector, in cm.
    pub path_length: f64,
    /// Interaction vertex, in metres.
    pub vertex: Vector3,
}

/// Source of interaction kinematics.
///
/// Implementations may hold a random generator, so both calls take
/// `&mut self`. Given a fixed seed, the sequence of results must be
/// deterministic.
pub trait KinematicsProvider {
    /// Set the electromagnetic coupling. Called exactly once, before the
    /// first event is analysed.
    fn configure_coupling(&mut self, alpha_em: f64);

    /// Scatter the incident particle elastically off a target at rest.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError`] if the scattering is kinematically
    /// impossible or the provider is not configured.
    fn elastic_recoil(
        &mut self,
        incident: &FourMomentum,
        target: TargetKind,
    ) -> Result<ElasticRecoil, KinematicsError>;

    /// Follow the incident trajectory from `entry` through `volume`.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::MissesVolume`] if the trajectory does not
    /// travel into the box.
    fn interaction_length(
        &mut self,
        incident: &FourMomentum,
        volume: &FiducialVolume,
        entry: &Vector3,
    ) -> Result<InteractionSite, KinematicsError>;
}
