//! Analysis session.
//!
//! An [`Analysis`] owns everything that outlives a single event: the
//! configuration derived from the run header, the kinematics provider, the
//! electromagnetic coupling state, and the weight accumulator. The
//! acceptance counter is created fresh inside every
//! [`analyse_event`](Analysis::analyse_event) call.

use detint_kinematics::KinematicsProvider;
use detint_types::codes::is_candidate;
use detint_types::{EventRecord, ProcessKind, RunHeader, StatusCode};
use tracing::{debug, info, trace, warn};

use crate::diagnostic::EventDiagnostic;
use crate::dispatch::{self, Candidate, DispatchOutcome, Interaction};
use crate::fiducial::{Acceptance, AcceptanceCounter, FiducialFilter, Rejection};
use crate::weight::{ExposureTotal, WeightAccumulator, event_contribution};

/// Run configuration derived once from the header.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Interaction process applied to accepted candidates.
    pub process: ProcessKind,
    /// Geometric acceptance test.
    pub filter: FiducialFilter,
    /// Target density in cm^-3.
    pub ndet: f64,
    /// NDUMP × LDUMP.
    pub exposure_factor: f64,
}

impl AnalysisConfig {
    /// Derive the configuration from a run header.
    pub fn from_header(header: &RunHeader) -> Self {
        Self {
            process: header.process(),
            filter: FiducialFilter::from_header(header),
            ndet: header.detector.ndet,
            exposure_factor: header.exposure_factor(),
        }
    }
}

/// Whether the electromagnetic coupling has been handed to the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouplingState {
    /// No event seen yet.
    Uninitialized,
    /// Set from the first event and fixed for the rest of the run.
    Initialized {
        /// The QED coupling of the first event.
        alpha_em: f64,
    },
}

/// What happened to one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventReport {
    /// Candidates accepted by the fiducial cut (0, 1 or 2).
    pub accepted: u8,
    /// Candidates examined.
    pub candidates: u32,
    /// Process weight multiplier.
    pub multiplier: f64,
    /// Contribution to the run total.
    pub contribution: f64,
    /// The elastic interaction, if one happened.
    pub interaction: Option<Interaction>,
    /// Recoverable problems, in the order they were found.
    pub diagnostics: Vec<EventDiagnostic>,
}

/// Per-run analysis session.
#[derive(Debug)]
pub struct Analysis<K> {
    config: AnalysisConfig,
    kinematics: K,
    coupling: CouplingState,
    weights: WeightAccumulator,
}

impl<K: KinematicsProvider> Analysis<K> {
    /// Start a session for the run described by `header`.
    pub fn new(header: &RunHeader, kinematics: K) -> Self {
        Self::with_config(AnalysisConfig::from_header(header), kinematics)
    }

    /// Start a session from an explicit configuration.
    pub fn with_config(config: AnalysisConfig, kinematics: K) -> Self {
        if let Some(err) = config.filter.geometry_error() {
            warn!(error = %err, "detector geometry invalid, every candidate will be excluded");
        }
        info!(
            process = %config.process,
            ndet = config.ndet,
            exposure_factor = config.exposure_factor,
            "analysis configured"
        );
        Self {
            config,
            kinematics,
            coupling: CouplingState::Uninitialized,
            weights: WeightAccumulator::new(),
        }
    }

    /// The run configuration.
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Current coupling state.
    pub const fn coupling(&self) -> CouplingState {
        self.coupling
    }

    /// Sum of contributions so far, before exposure normalisation.
    pub const fn running_total(&self) -> f64 {
        self.weights.total()
    }

    /// Analyse one event in place.
    ///
    /// Rejected candidates are marked excluded. The first accepted candidate
    /// is dispatched to the run's process; a second accepted candidate is
    /// counted but does not interact.
    pub fn analyse_event(&mut self, event: &mut EventRecord) -> EventReport {
        if self.coupling == CouplingState::Uninitialized {
            self.kinematics.configure_coupling(event.aqed);
            self.coupling = CouplingState::Initialized {
                alpha_em: event.aqed,
            };
            debug!(alpha_em = event.aqed, "electromagnetic coupling set");
        }

        let mut counter = AcceptanceCounter::new();
        let mut candidates: u32 = 0;
        let mut multiplier = if self.config.process == ProcessKind::None {
            0.0
        } else {
            1.0
        };
        let mut interaction = None;
        let mut diagnostics = Vec::new();

        // Secondaries appended during the walk are not candidates.
        let original = event.particles.len();
        for (zero_based, index) in (0..original).zip(1_u32..) {
            let Some(particle) = event.particles.get(zero_based) else {
                break;
            };
            if !is_candidate(particle.id) {
                continue;
            }
            candidates = candidates.saturating_add(1);
            let momentum = particle.momentum;

            match self.config.filter.classify(&mut counter, &momentum) {
                Acceptance::Accepted { ordinal, entry } => {
                    trace!(particle = index, ordinal, "candidate accepted");
                    if ordinal > 1 {
                        continue;
                    }
                    let Some(volume) = self.config.filter.volume() else {
                        continue;
                    };
                    let candidate = Candidate {
                        index,
                        momentum,
                        entry,
                    };
                    let outcome = dispatch::dispatch(
                        self.config.process,
                        &mut self.kinematics,
                        event,
                        &candidate,
                        volume,
                        self.config.ndet,
                    );
                    multiplier = outcome.multiplier();
                    match outcome {
                        DispatchOutcome::Elastic(done) => interaction = Some(done),
                        DispatchOutcome::Failed(diagnostic) => diagnostics.push(diagnostic),
                        DispatchOutcome::NoInteraction | DispatchOutcome::NotModelled(_) => {}
                    }
                }
                Acceptance::Rejected(reason) => {
                    trace!(particle = index, reason = ?reason, "candidate excluded");
                    if let Some(particle) = event.particles.get_mut(zero_based) {
                        particle.status = StatusCode::EXCLUDED;
                    }
                    if let Some(diagnostic) = rejection_diagnostic(reason, index) {
                        diagnostics.push(diagnostic);
                    }
                }
            }
        }

        let accepted = counter.accepted();
        let contribution = event_contribution(event.weight, accepted, multiplier);
        self.weights.add(contribution);

        EventReport {
            accepted,
            candidates,
            multiplier,
            contribution,
            interaction,
            diagnostics,
        }
    }

    /// Close the session and apply the exposure normalisation.
    pub fn finish(self) -> ExposureTotal {
        self.weights.finish(self.config.exposure_factor)
    }
}

const fn rejection_diagnostic(reason: Rejection, particle: u32) -> Option<EventDiagnostic> {
    match reason {
        Rejection::OutsideAcceptance | Rejection::Saturated => None,
        Rejection::ZeroLongitudinalMomentum => {
            Some(EventDiagnostic::ZeroLongitudinalMomentum { particle })
        }
        Rejection::NonFiniteMomentum => Some(EventDiagnostic::NonFiniteMomentum { particle }),
        Rejection::InvalidGeometry(source) => {
            Some(EventDiagnostic::InvalidGeometry { particle, source })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use detint_kinematics::{ElasticRecoil, InteractionSite, KinematicsError};
    use detint_types::{
        DetectorSetup, FiducialVolume, FourMomentum, ParticleEntry, TargetKind, Vector3,
    };

    use super::*;

    #[derive(Default)]
    struct RecordingKinematics {
        couplings: Vec<f64>,
        recoils: u32,
    }

    impl KinematicsProvider for RecordingKinematics {
        fn configure_coupling(&mut self, alpha_em: f64) {
            self.couplings.push(alpha_em);
        }

        fn elastic_recoil(
            &mut self,
            incident: &FourMomentum,
            target: TargetKind,
        ) -> Result<ElasticRecoil, KinematicsError> {
            self.recoils = self.recoils.saturating_add(1);
            Ok(ElasticRecoil {
                cross_section: 1.0,
                scattered: *incident,
                recoil: FourMomentum::at_rest(target.mass()),
            })
        }

        fn interaction_length(
            &mut self,
            _incident: &FourMomentum,
            _volume: &FiducialVolume,
            entry: &Vector3,
        ) -> Result<InteractionSite, KinematicsError> {
            Ok(InteractionSite {
                path_length: 0.5,
                vertex: *entry,
            })
        }
    }

    fn header(procid: i32) -> RunHeader {
        RunHeader {
            detector: DetectorSetup {
                lx: 2.0,
                ly: 2.0,
                lz: 1.0,
                ldet: 10.0,
                ndet: 4.0,
                procid,
                ..DetectorSetup::default()
            },
            ..RunHeader::default()
        }
    }

    fn particle(id: i32, px: f64, pz: f64) -> ParticleEntry {
        ParticleEntry {
            id,
            status: StatusCode::FINAL,
            mothers: (1, 2),
            colour: (0, 0),
            momentum: FourMomentum::new(px, 0.0, pz, 1.0),
            mass: 0.0,
            lifetime: 0.0,
            spin: 9.0,
        }
    }

    fn event(aqed: f64, particles: Vec<ParticleEntry>) -> EventRecord {
        EventRecord {
            weight: 1.0,
            aqed,
            particles,
            ..EventRecord::default()
        }
    }

    #[test]
    fn coupling_is_configured_once_from_first_event() {
        let mut analysis = Analysis::new(&header(2), RecordingKinematics::default());
        assert_eq!(analysis.coupling(), CouplingState::Uninitialized);
        let _ = analysis.analyse_event(&mut event(0.0078, Vec::new()));
        let _ = analysis.analyse_event(&mut event(0.0099, Vec::new()));
        assert_eq!(
            analysis.coupling(),
            CouplingState::Initialized { alpha_em: 0.0078 }
        );
        assert_eq!(analysis.kinematics.couplings, vec![0.0078]);
    }

    #[test]
    fn non_candidates_are_left_alone() {
        let mut analysis = Analysis::new(&header(2), RecordingKinematics::default());
        let mut record = event(0.0078, vec![particle(11, 5.0, 1.0), particle(22, 0.0, 0.0)]);
        let report = analysis.analyse_event(&mut record);
        assert_eq!(report.candidates, 0);
        assert!(report.diagnostics.is_empty());
        assert!(record.particles.iter().all(|p| p.status == StatusCode::FINAL));
    }

    #[test]
    fn only_first_accepted_candidate_interacts() {
        let mut analysis = Analysis::new(&header(2), RecordingKinematics::default());
        let mut record = event(
            0.0078,
            vec![particle(611, 0.01, 1.0), particle(-611, -0.02, 1.0)],
        );
        let report = analysis.analyse_event(&mut record);
        assert_eq!(report.accepted, 2);
        assert_eq!(analysis.kinematics.recoils, 1);
        assert_eq!(record.particle_count(), 4);
        assert_eq!(report.interaction.map(|i| i.particle), Some(1));
        assert!((report.multiplier - 2.0).abs() < 1e-12);
        assert!((report.contribution - 4e-36).abs() < 1e-48);
        assert!(record.particles.get(1).is_some_and(|p| !p.status.is_excluded()));
    }

    #[test]
    fn rejected_candidates_are_excluded() {
        let mut analysis = Analysis::new(&header(2), RecordingKinematics::default());
        let mut record = event(
            0.0078,
            vec![particle(611, 0.5, 1.0), particle(611, 0.0, 0.0)],
        );
        let report = analysis.analyse_event(&mut record);
        assert_eq!(report.accepted, 0);
        assert!(report.contribution == 0.0);
        assert!(record.particles.iter().all(|p| p.status.is_excluded()));
        assert_eq!(
            report.diagnostics,
            vec![EventDiagnostic::ZeroLongitudinalMomentum { particle: 2 }]
        );
    }

    #[test]
    fn invalid_geometry_excludes_with_diagnostic() {
        let mut broken = header(2);
        broken.detector.ldet = -1.0;
        let mut analysis = Analysis::new(&broken, RecordingKinematics::default());
        let mut record = event(0.0078, vec![particle(611, 0.0, 1.0)]);
        let report = analysis.analyse_event(&mut record);
        assert_eq!(report.accepted, 0);
        assert!(matches!(
            report.diagnostics.as_slice(),
            [EventDiagnostic::InvalidGeometry { particle: 1, .. }]
        ));
        assert_eq!(analysis.kinematics.recoils, 0);
    }

    #[test]
    fn unrecognized_process_zeroes_the_event() {
        let mut analysis = Analysis::new(&header(17), RecordingKinematics::default());
        let mut record = event(0.0078, vec![particle(611, 0.0, 1.0)]);
        let report = analysis.analyse_event(&mut record);
        assert_eq!(report.accepted, 1);
        assert!(report.contribution == 0.0);
        assert_eq!(
            report.diagnostics,
            vec![EventDiagnostic::UnrecognizedProcess { code: 17 }]
        );
        assert_eq!(record.particle_count(), 1);
    }

    #[test]
    fn inelastic_keeps_unit_multiplier() {
        let mut analysis = Analysis::new(&header(4), RecordingKinematics::default());
        let mut record = event(0.0078, vec![particle(611, 0.0, 1.0)]);
        let report = analysis.analyse_event(&mut record);
        assert!((report.multiplier - 1.0).abs() < f64::EPSILON);
        assert!(report.interaction.is_none());
        assert_eq!(record.particle_count(), 1);
    }

    #[test]
    fn finish_applies_exposure() {
        let mut setup = header(2);
        setup.detector.ndump = 2.0;
        setup.detector.ldump = 3.0;
        let mut analysis = Analysis::new(&setup, RecordingKinematics::default());
        let _ = analysis.analyse_event(&mut event(0.0078, vec![particle(611, 0.0, 1.0)]));
        let raw = analysis.running_total();
        let total = analysis.finish();
        assert!((total.events_per_exposure - raw * 6.0).abs() < 1e-48);
        assert_eq!(total.events, 1);
    }
}
