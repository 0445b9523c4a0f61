//! Interaction process applied to an accepted candidate.
//!
//! [`dispatch`] is an exhaustive match over [`ProcessKind`]. Only the
//! elastic processes touch the event: they append the scattered incident
//! particle and the recoiling target, and overwrite the annotation with the
//! interaction vertex. Every other outcome leaves the event unchanged.

use detint_kinematics::{KinematicsError, KinematicsProvider};
use detint_types::codes::SCATTERED_DARK_FERMION;
use detint_types::{
    EventRecord, FiducialVolume, FourMomentum, ParticleEntry, ProcessKind, TargetKind, Vector3,
};
use tracing::debug;

use crate::diagnostic::EventDiagnostic;

/// An accepted candidate, ready for dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// 1-based index of the candidate in its event.
    pub index: u32,
    /// Its four-momentum.
    pub momentum: FourMomentum,
    /// Where its trajectory crosses the detector front face.
    pub entry: Vector3,
}

/// A completed elastic interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    /// What the candidate scattered off.
    pub target: TargetKind,
    /// 1-based index of the interacting candidate.
    pub particle: u32,
    /// Interaction vertex, in metres.
    pub vertex: Vector3,
    /// Path length inside the detector, in cm.
    pub path_length: f64,
    /// Elastic cross section, in cm^2.
    pub cross_section: f64,
    /// `path_length × ndet × cross_section`.
    pub probability: f64,
}

/// Result of dispatching one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The run models no interaction.
    NoInteraction,
    /// Elastic scattering happened and the secondaries were appended.
    Elastic(Interaction),
    /// The process exists but its physics is not modelled.
    NotModelled(TargetKind),
    /// The interaction could not be produced.
    Failed(EventDiagnostic),
}

impl DispatchOutcome {
    /// Factor applied to the event weight.
    pub const fn multiplier(&self) -> f64 {
        match self {
            Self::NoInteraction | Self::Failed(_) => 0.0,
            Self::Elastic(interaction) => interaction.probability,
            Self::NotModelled(_) => 1.0,
        }
    }
}

/// Apply `process` to `candidate`, mutating `event` on elastic success.
///
/// `ndet` is the target density in cm^-3. Secondaries are appended only
/// once both kinematics calls have succeeded, so a failure never leaves a
/// partial set of new particles behind.
pub fn dispatch<K: KinematicsProvider>(
    process: ProcessKind,
    kinematics: &mut K,
    event: &mut EventRecord,
    candidate: &Candidate,
    volume: &FiducialVolume,
    ndet: f64,
) -> DispatchOutcome {
    match process {
        ProcessKind::None => DispatchOutcome::NoInteraction,
        ProcessKind::Inelastic(target) => DispatchOutcome::NotModelled(target),
        ProcessKind::Unrecognized(code) => {
            DispatchOutcome::Failed(EventDiagnostic::UnrecognizedProcess { code })
        }
        ProcessKind::Elastic(target) => {
            match elastic(kinematics, event, candidate, target, volume, ndet) {
                Ok(interaction) => DispatchOutcome::Elastic(interaction),
                Err(diagnostic) => DispatchOutcome::Failed(diagnostic),
            }
        }
    }
}

fn elastic<K: KinematicsProvider>(
    kinematics: &mut K,
    event: &mut EventRecord,
    candidate: &Candidate,
    target: TargetKind,
    volume: &FiducialVolume,
    ndet: f64,
) -> Result<Interaction, EventDiagnostic> {
    let particle = candidate.index;
    let failed = move |source: KinematicsError| EventDiagnostic::Kinematics { particle, source };

    let recoil = kinematics
        .elastic_recoil(&candidate.momentum, target)
        .map_err(failed)?;
    let site = kinematics
        .interaction_length(&candidate.momentum, volume, &candidate.entry)
        .map_err(failed)?;

    let probability = site.path_length * ndet * recoil.cross_section;
    if !probability.is_finite() {
        return Err(failed(KinematicsError::NonFinite {
            quantity: "interaction probability",
        }));
    }

    let before = event.particles.len();
    let appended = event
        .push_particle(ParticleEntry::secondary(
            SCATTERED_DARK_FERMION,
            particle,
            recoil.scattered,
        ))
        .and_then(|_| {
            event.push_particle(ParticleEntry::secondary(
                target.recoil_code(),
                particle,
                recoil.recoil,
            ))
        });
    if appended.is_none() {
        event.particles.truncate(before);
        return Err(EventDiagnostic::ParticleListFull { particle });
    }

    let vertex = site.vertex;
    event.annotation = format!("{:.6} {:.6} {:.6}", vertex.x, vertex.y, vertex.z);

    debug!(
        particle,
        target = target.as_str(),
        path_length_cm = site.path_length,
        cross_section_cm2 = recoil.cross_section,
        probability,
        "elastic interaction"
    );

    Ok(Interaction {
        target,
        particle,
        vertex,
        path_length: site.path_length,
        cross_section: recoil.cross_section,
        probability,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use detint_kinematics::{ElasticRecoil, InteractionSite};
    use detint_types::StatusCode;
    use detint_types::codes::{RECOIL_ELECTRON, RECOIL_PROTON};

    use super::*;

    /// Fixed answers; the recoil target takes the whole incident momentum.
    struct FixedKinematics {
        fail_length: bool,
    }

    impl KinematicsProvider for FixedKinematics {
        fn configure_coupling(&mut self, _alpha_em: f64) {}

        fn elastic_recoil(
            &mut self,
            incident: &FourMomentum,
            target: TargetKind,
        ) -> Result<ElasticRecoil, KinematicsError> {
            let rest = FourMomentum::at_rest(target.mass());
            Ok(ElasticRecoil {
                cross_section: 2.0,
                scattered: rest,
                recoil: *incident,
            })
        }

        fn interaction_length(
            &mut self,
            _incident: &FourMomentum,
            _volume: &FiducialVolume,
            entry: &Vector3,
        ) -> Result<InteractionSite, KinematicsError> {
            if self.fail_length {
                return Err(KinematicsError::MissesVolume {
                    x: entry.x,
                    y: entry.y,
                    z: entry.z,
                });
            }
            Ok(InteractionSite {
                path_length: 3.0,
                vertex: Vector3::new(0.25, -0.125, 10.5),
            })
        }
    }

    fn volume() -> FiducialVolume {
        FiducialVolume::new(2.0, 2.0, 1.0, 10.0).unwrap()
    }

    fn candidate() -> Candidate {
        Candidate {
            index: 3,
            momentum: FourMomentum::new(0.0, 0.0, 1.0, 1.0),
            entry: Vector3::new(0.0, 0.0, 10.0),
        }
    }

    fn event() -> EventRecord {
        EventRecord {
            annotation: "original".to_owned(),
            ..EventRecord::default()
        }
    }

    #[test]
    fn elastic_appends_two_final_secondaries() {
        let mut record = event();
        let outcome = dispatch(
            ProcessKind::Elastic(TargetKind::Proton),
            &mut FixedKinematics { fail_length: false },
            &mut record,
            &candidate(),
            &volume(),
            10.0,
        );
        assert!((outcome.multiplier() - 60.0).abs() < 1e-12);
        assert_eq!(record.particle_count(), 2);
        let ids: Vec<i32> = record.particles.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![SCATTERED_DARK_FERMION, RECOIL_PROTON]);
        for p in &record.particles {
            assert_eq!(p.mothers, (3, 3));
            assert_eq!(p.status, StatusCode::FINAL);
        }
        assert_eq!(record.annotation, "0.250000 -0.125000 10.500000");
    }

    #[test]
    fn electron_target_uses_electron_recoil_code() {
        let mut record = event();
        let _ = dispatch(
            ProcessKind::Elastic(TargetKind::Electron),
            &mut FixedKinematics { fail_length: false },
            &mut record,
            &candidate(),
            &volume(),
            1.0,
        );
        assert_eq!(record.particles.get(1).map(|p| p.id), Some(RECOIL_ELECTRON));
    }

    #[test]
    fn failed_length_leaves_event_untouched() {
        let mut record = event();
        let outcome = dispatch(
            ProcessKind::Elastic(TargetKind::Electron),
            &mut FixedKinematics { fail_length: true },
            &mut record,
            &candidate(),
            &volume(),
            1.0,
        );
        assert!(matches!(
            outcome,
            DispatchOutcome::Failed(EventDiagnostic::Kinematics { particle: 3, .. })
        ));
        assert!(outcome.multiplier().abs() < f64::EPSILON);
        assert!(record.particles.is_empty());
        assert_eq!(record.annotation, "original");
    }

    #[test]
    fn non_elastic_processes_do_not_touch_the_event() {
        let cases = [
            (ProcessKind::None, 0.0),
            (ProcessKind::Inelastic(TargetKind::Proton), 1.0),
            (ProcessKind::Inelastic(TargetKind::Electron), 1.0),
            (ProcessKind::Unrecognized(42), 0.0),
        ];
        for (process, expected) in cases {
            let mut record = event();
            let outcome = dispatch(
                process,
                &mut FixedKinematics { fail_length: false },
                &mut record,
                &candidate(),
                &volume(),
                1.0,
            );
            assert!((outcome.multiplier() - expected).abs() < f64::EPSILON);
            assert!(record.particles.is_empty());
            assert_eq!(record.annotation, "original");
        }
    }

    #[test]
    fn unrecognized_process_reports_its_code() {
        let outcome = dispatch(
            ProcessKind::Unrecognized(-7),
            &mut FixedKinematics { fail_length: false },
            &mut event(),
            &candidate(),
            &volume(),
            1.0,
        );
        assert_eq!(
            outcome,
            DispatchOutcome::Failed(EventDiagnostic::UnrecognizedProcess { code: -7 })
        );
    }
}
