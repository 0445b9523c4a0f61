//! Production kinematics provider.
//!
//! [`DarkPhotonKinematics`] is built from the run header before the event
//! loop. Its random generator is seeded once from the header seed; the
//! electromagnetic coupling arrives later through
//! [`KinematicsProvider::configure_coupling`], and until then every elastic
//! request fails with [`KinematicsError::CouplingNotConfigured`].
//!
//! Recoil spectra are tabulated lazily on a logarithmic grid of incident
//! energies up to the beam energy. An incident energy between two nodes
//! takes its cross section from a log-energy interpolation of the node
//! totals and its recoil from the upper node's spectrum, stretched onto the
//! recoil range actually allowed at that energy. Energies off the grid, or
//! next to a node without phase space, get an exact spectrum of their own.

use std::collections::HashMap;
use std::f64::consts::TAU;

use detint_types::{DetectorSetup, FiducialVolume, FourMomentum, TargetKind, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::trace;

use crate::chord::Chord;
use crate::cross_section::{ElasticModel, RecoilSpectrum};
use crate::{
    CM_PER_M, ElasticRecoil, GEV2_TO_CM2, InteractionSite, KinematicsError, KinematicsProvider,
};

/// Tunable parameters of the elastic model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KinematicsSettings {
    /// Dark-sector coupling used when the run header does not pin one.
    #[serde(default = "default_alpha_d")]
    pub alpha_d: f64,

    /// Number of grid intervals used to integrate the recoil spectrum.
    #[serde(default = "default_integration_points")]
    pub integration_points: u32,

    /// Minimum electron recoil kinetic energy in GeV.
    #[serde(default)]
    pub electron_recoil_threshold_gev: f64,

    /// Minimum proton recoil kinetic energy in GeV.
    #[serde(default)]
    pub proton_recoil_threshold_gev: f64,

    /// Number of intervals of the incident-energy grid on which recoil
    /// spectra are cached. Zero computes every spectrum exactly.
    #[serde(default = "default_energy_grid_points")]
    pub energy_grid_points: u32,
}

impl Default for KinematicsSettings {
    fn default() -> Self {
        Self {
            alpha_d: default_alpha_d(),
            integration_points: default_integration_points(),
            electron_recoil_threshold_gev: 0.0,
            proton_recoil_threshold_gev: 0.0,
            energy_grid_points: default_energy_grid_points(),
        }
    }
}

impl KinematicsSettings {
    /// Recoil threshold for the given target.
    pub const fn threshold(&self, target: TargetKind) -> f64 {
        match target {
            TargetKind::Electron => self.electron_recoil_threshold_gev,
            TargetKind::Proton => self.proton_recoil_threshold_gev,
        }
    }
}

const fn default_alpha_d() -> f64 {
    0.5
}

const fn default_integration_points() -> u32 {
    400
}

const fn default_energy_grid_points() -> u32 {
    200
}

/// Lowest grid energy, in units of the dark fermion mass.
const ENERGY_GRID_FLOOR_RATIO: f64 = 2.0;

/// Lowest grid energy for a massless dark fermion, in GeV.
const ENERGY_GRID_FLOOR_GEV: f64 = 1e-3;

/// Recoil spectra per target on a fixed grid of incident energies.
#[derive(Debug, Clone, Default)]
struct SpectrumCache {
    energies: Vec<f64>,
    spectra: HashMap<(TargetKind, usize), Option<RecoilSpectrum>>,
}

impl SpectrumCache {
    /// Grid of `points` logarithmic intervals ending at `ebeam`. Empty when
    /// `points` is zero or the beam energy is below the grid floor.
    fn new(dark_mass: f64, ebeam: f64, points: u32) -> Self {
        let floor = (ENERGY_GRID_FLOOR_RATIO * dark_mass).max(ENERGY_GRID_FLOOR_GEV);
        if points == 0 || !(ebeam > floor) {
            return Self::default();
        }
        let span = (ebeam / floor).ln();
        let mut energies: Vec<f64> = (0..=points)
            .map(|k| floor * (span * f64::from(k) / f64::from(points)).exp())
            .collect();
        if let Some(last) = energies.last_mut() {
            *last = ebeam;
        }
        Self {
            energies,
            spectra: HashMap::new(),
        }
    }

    /// Grid nodes `(lower, upper)` enclosing `energy`.
    fn bracket(&self, energy: f64) -> Option<(usize, usize)> {
        let upper = self.energies.partition_point(|&node| node < energy);
        let node = *self.energies.get(upper)?;
        if node <= energy {
            return Some((upper, upper));
        }
        Some((upper.checked_sub(1)?, upper))
    }

    fn fill(
        &mut self,
        model: &ElasticModel,
        settings: &KinematicsSettings,
        target: TargetKind,
        index: usize,
    ) {
        let Some(&energy) = self.energies.get(index) else {
            return;
        };
        self.spectra.entry((target, index)).or_insert_with(|| {
            model
                .spectrum(
                    target,
                    energy,
                    settings.threshold(target),
                    settings.integration_points,
                )
                .ok()
        });
    }

    fn lookup(&self, target: TargetKind, index: usize) -> Option<&RecoilSpectrum> {
        self.spectra.get(&(target, index))?.as_ref()
    }

    /// Sample a recoil kinetic energy at `energy` and return it with the
    /// integrated cross section in GeV^-2. `None` when the grid cannot serve
    /// this energy; no random number is drawn in that case.
    fn sample(
        &mut self,
        model: &ElasticModel,
        settings: &KinematicsSettings,
        target: TargetKind,
        energy: f64,
        rng: &mut StdRng,
    ) -> Option<(f64, f64)> {
        let (lower, upper) = self.bracket(energy)?;
        self.fill(model, settings, target, lower);
        self.fill(model, settings, target, upper);
        let low = self.lookup(target, lower)?;
        let high = self.lookup(target, upper)?;

        let total = if upper > lower {
            let e_low = *self.energies.get(lower)?;
            let e_high = *self.energies.get(upper)?;
            let w = (energy / e_low).ln() / (e_high / e_low).ln();
            w.mul_add(high.total() - low.total(), low.total())
        } else {
            high.total()
        };

        let floor = high.min_recoil();
        let reach = model.max_recoil(target, energy) - floor;
        let span = high.max_recoil() - floor;
        if !(reach > 0.0 && span > 0.0 && total > 0.0) {
            return None;
        }
        let t = (high.sample(rng.random::<f64>()) - floor).mul_add(reach / span, floor);
        Some((t, total))
    }
}

/// Dark-photon mediated elastic scattering with a seeded generator.
#[derive(Debug, Clone)]
pub struct DarkPhotonKinematics {
    settings: KinematicsSettings,
    epsilon: f64,
    alpha_d: f64,
    dark_mass: f64,
    mediator_mass: f64,
    alpha_em: Option<f64>,
    rng: StdRng,
    cache: SpectrumCache,
}

impl DarkPhotonKinematics {
    /// Build the provider from the detector section of the run header.
    ///
    /// A dark coupling in the header takes precedence over the configured
    /// default.
    pub fn new(detector: &DetectorSetup, settings: KinematicsSettings) -> Self {
        let alpha_d = detector.alpha_d.unwrap_or(settings.alpha_d);
        Self {
            epsilon: detector.epsilon,
            alpha_d,
            dark_mass: detector.fmass,
            mediator_mass: detector.apmass,
            alpha_em: None,
            rng: StdRng::seed_from_u64(detector.seed),
            cache: SpectrumCache::new(detector.fmass, detector.ebeam, settings.energy_grid_points),
            settings,
        }
    }

    /// Number of grid spectra tabulated so far, across both targets.
    pub fn cached_spectra(&self) -> usize {
        self.cache.spectra.len()
    }

    /// The elastic model, once the electromagnetic coupling is known.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::CouplingNotConfigured`] before
    /// [`KinematicsProvider::configure_coupling`] has been called.
    pub fn model(&self) -> Result<ElasticModel, KinematicsError> {
        let alpha_em = self.alpha_em.ok_or(KinematicsError::CouplingNotConfigured)?;
        Ok(ElasticModel {
            alpha_em,
            alpha_d: self.alpha_d,
            epsilon: self.epsilon,
            dark_mass: self.dark_mass,
            mediator_mass: self.mediator_mass,
        })
    }
}

impl KinematicsProvider for DarkPhotonKinematics {
    fn configure_coupling(&mut self, alpha_em: f64) {
        self.alpha_em = Some(alpha_em);
        self.cache.spectra.clear();
    }

    fn elastic_recoil(
        &mut self,
        incident: &FourMomentum,
        target: TargetKind,
    ) -> Result<ElasticRecoil, KinematicsError> {
        let model = self.model()?;
        let cached = self
            .cache
            .sample(&model, &self.settings, target, incident.e, &mut self.rng);
        let (t, total) = match cached {
            Some(hit) => hit,
            None => {
                let spectrum = model.spectrum(
                    target,
                    incident.e,
                    self.settings.threshold(target),
                    self.settings.integration_points,
                )?;
                (spectrum.sample(self.rng.random::<f64>()), spectrum.total())
            }
        };
        let phi = TAU * self.rng.random::<f64>();
        let (scattered, recoil) = scatter(incident, target.mass(), t, phi)?;

        trace!(
            target = target.as_str(),
            incident_energy = incident.e,
            recoil_kinetic = t,
            "elastic recoil sampled"
        );

        Ok(ElasticRecoil {
            cross_section: total * GEV2_TO_CM2,
            scattered,
            recoil,
        })
    }

    fn interaction_length(
        &mut self,
        incident: &FourMomentum,
        volume: &FiducialVolume,
        entry: &Vector3,
    ) -> Result<InteractionSite, KinematicsError> {
        let chord = Chord::trace(incident, volume, entry)?;
        let vertex = chord.point_at(self.rng.random::<f64>());
        Ok(InteractionSite {
            path_length: chord.length * CM_PER_M,
            vertex,
        })
    }
}

/// Two-body elastic scattering off a target of mass `target_mass` at rest.
///
/// The target recoils with kinetic energy `t` at the polar angle fixed by
/// energy-momentum conservation and azimuth `phi` around the incident
/// direction. Returns `(scattered incident, recoiling target)`; their sum
/// equals the incident four-momentum plus the target at rest.
///
/// # Errors
///
/// Returns [`KinematicsError::NonFinite`] if the incident momentum has no
/// direction or the result is not finite.
pub fn scatter(
    incident: &FourMomentum,
    target_mass: f64,
    t: f64,
    phi: f64,
) -> Result<(FourMomentum, FourMomentum), KinematicsError> {
    let direction = incident.momentum().unit().ok_or(KinematicsError::NonFinite {
        quantity: "incident direction",
    })?;
    let helper = if direction.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    let e1 = direction
        .cross(helper)
        .unit()
        .ok_or(KinematicsError::NonFinite {
            quantity: "transverse basis",
        })?;
    let e2 = direction.cross(e1);

    let p = incident.p();
    let recoil_p = (t * (2.0f64).mul_add(target_mass, t)).sqrt();
    let cos_theta = if recoil_p > 0.0 {
        (t * (incident.e + target_mass) / (p * recoil_p)).clamp(-1.0, 1.0)
    } else {
        1.0
    };
    let sin_theta = cos_theta.mul_add(-cos_theta, 1.0).max(0.0).sqrt();

    let transverse = e1 * (sin_theta * phi.cos()) + e2 * (sin_theta * phi.sin());
    let recoil3 = (transverse + direction * cos_theta) * recoil_p;
    let recoil = FourMomentum::from_parts(recoil3, target_mass + t);
    let scattered = *incident + FourMomentum::at_rest(target_mass) - recoil;

    if !(scattered.momentum().is_finite() && scattered.e.is_finite() && recoil3.is_finite()) {
        return Err(KinematicsError::NonFinite {
            quantity: "recoil momentum",
        });
    }
    Ok((scattered, recoil))
}
