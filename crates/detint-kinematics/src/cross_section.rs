//! Dark-photon mediated elastic scattering of a dark fermion off a target
//! at rest.
//!
//! For an incident Dirac fermion of mass `m` and energy `E` scattering off a
//! point-like target of mass `M` through a vector mediator of mass `mA`, the
//! spectrum in the recoil kinetic energy `T` is
//!
//! ```text
//! dσ/dT = 4π ε² α αD [2ME² − T(2ME + M² + m²) + MT²] / ((E² − m²)(mA² + 2MT)²)
//! ```
//!
//! with `0 ≤ T ≤ T_max = 2M(E² − m²) / (m² + M² + 2EM)`. Proton targets are
//! additionally suppressed by a dipole form factor. Everything here is in
//! GeV units; conversion to cm^2 happens in the provider.

use std::f64::consts::PI;

use detint_types::TargetKind;

use crate::KinematicsError;

/// Dipole form-factor scale for the proton, in GeV^2.
const PROTON_DIPOLE_SCALE: f64 = 0.71;

/// Couplings and masses of the dark sector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticModel {
    /// Electromagnetic fine-structure constant.
    pub alpha_em: f64,
    /// Dark-sector fine-structure constant.
    pub alpha_d: f64,
    /// Kinetic-mixing parameter.
    pub epsilon: f64,
    /// Mass of the incident dark fermion.
    pub dark_mass: f64,
    /// Mass of the mediator.
    pub mediator_mass: f64,
}

impl ElasticModel {
    /// Largest recoil kinetic energy allowed by two-body kinematics.
    pub fn max_recoil(&self, target: TargetKind, energy: f64) -> f64 {
        let m = self.dark_mass;
        let big_m = target.mass();
        let p2 = energy.mul_add(energy, -(m * m));
        2.0 * big_m * p2 / (2.0 * energy).mul_add(big_m, m.mul_add(m, big_m * big_m))
    }

    /// `dσ/dT` in GeV^-3 at recoil kinetic energy `t`.
    pub fn differential(&self, target: TargetKind, energy: f64, t: f64) -> f64 {
        let m = self.dark_mass;
        let big_m = target.mass();
        let p2 = energy.mul_add(energy, -(m * m));

        let numerator = (2.0 * big_m * energy).mul_add(
            energy,
            -t * (2.0 * big_m).mul_add(energy, big_m.mul_add(big_m, m * m)),
        ) + big_m * t * t;
        let propagator = (2.0 * big_m).mul_add(t, self.mediator_mass * self.mediator_mass);
        let coupling = 4.0 * PI * self.epsilon * self.epsilon * self.alpha_em * self.alpha_d;

        let point_like = coupling * numerator.max(0.0) / (p2 * propagator * propagator);
        match target {
            TargetKind::Electron => point_like,
            TargetKind::Proton => {
                let q2 = 2.0 * big_m * t;
                let form_factor = (1.0 + q2 / PROTON_DIPOLE_SCALE).powi(-2);
                point_like * form_factor * form_factor
            }
        }
    }

    /// Tabulate the recoil spectrum between `threshold` and `T_max`.
    ///
    /// The grid has `points` intervals (at least 2) and is refined
    /// cubically towards the threshold, where the spectrum peaks.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError`] if the incident particle is off its mass
    /// shell, if no recoil above threshold is allowed, or if the integral is
    /// not a positive finite number.
    pub fn spectrum(
        &self,
        target: TargetKind,
        energy: f64,
        threshold: f64,
        points: u32,
    ) -> Result<RecoilSpectrum, KinematicsError> {
        if !(energy > self.dark_mass) {
            return Err(KinematicsError::BelowMassShell {
                energy,
                mass: self.dark_mass,
            });
        }
        let threshold = threshold.max(0.0);
        let t_max = self.max_recoil(target, energy);
        if !(t_max > threshold) {
            return Err(KinematicsError::NoPhaseSpace { t_max, threshold });
        }

        let intervals = points.max(2);
        let span = t_max - threshold;
        let nodes: Vec<f64> = (0..=intervals)
            .map(|k| {
                let x = f64::from(k) / f64::from(intervals);
                span.mul_add(x * x * x, threshold)
            })
            .collect();
        let density: Vec<f64> = nodes
            .iter()
            .map(|&t| self.differential(target, energy, t))
            .collect();

        let mut cumulative = Vec::with_capacity(nodes.len());
        let mut running = 0.0_f64;
        cumulative.push(running);
        for (t, f) in nodes.windows(2).zip(density.windows(2)) {
            if let ([t0, t1], [f0, f1]) = (t, f) {
                running += 0.5 * (t1 - t0) * (f0 + f1);
            }
            cumulative.push(running);
        }

        if !running.is_finite() {
            return Err(KinematicsError::NonFinite {
                quantity: "cross section",
            });
        }
        if running <= 0.0 {
            return Err(KinematicsError::VanishingCrossSection { energy });
        }

        Ok(RecoilSpectrum {
            nodes,
            cumulative,
            total: running,
        })
    }
}

/// Cumulative recoil spectrum on a grid of recoil kinetic energies.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoilSpectrum {
    nodes: Vec<f64>,
    cumulative: Vec<f64>,
    total: f64,
}

impl RecoilSpectrum {
    /// Integrated cross section in GeV^-2.
    pub const fn total(&self) -> f64 {
        self.total
    }

    /// Lowest tabulated recoil energy.
    pub fn min_recoil(&self) -> f64 {
        self.nodes.first().copied().unwrap_or(0.0)
    }

    /// Highest tabulated recoil energy.
    pub fn max_recoil(&self) -> f64 {
        self.nodes.last().copied().unwrap_or(0.0)
    }

    /// Invert the cumulative spectrum at fraction `u` in `[0, 1)`.
    pub fn sample(&self, u: f64) -> f64 {
        let goal = u.clamp(0.0, 1.0) * self.total;
        let upper = self
            .cumulative
            .partition_point(|&c| c < goal)
            .clamp(1, self.cumulative.len().saturating_sub(1).max(1));
        let lower = upper.saturating_sub(1);

        let (Some(&c0), Some(&c1), Some(&t0), Some(&t1)) = (
            self.cumulative.get(lower),
            self.cumulative.get(upper),
            self.nodes.get(lower),
            self.nodes.get(upper),
        ) else {
            return self.min_recoil();
        };

        let fraction = if c1 > c0 { (goal - c0) / (c1 - c0) } else { 0.0 };
        fraction.clamp(0.0, 1.0).mul_add(t1 - t0, t0)
    }
}
