//! Run-level header.
//!
//! The header is read once when the event stream opens and never changes
//! afterwards. It holds the standard LHEF beam and process lines together
//! with the detector and model parameters this program needs.

use serde::{Deserialize, Serialize};

use crate::geometry::{FiducialVolume, GeometryError};
use crate::process::ProcessKind;

/// Standard LHEF beam description (first `<init>` line).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamSetup {
    /// Particle codes of the two beams.
    pub ids: (i32, i32),
    /// Energies of the two beams in GeV.
    pub energies: (f64, f64),
    /// PDF author group of each beam.
    pub pdf_groups: (i32, i32),
    /// PDF set of each beam.
    pub pdf_sets: (i32, i32),
    /// Event weighting strategy (IDWTUP).
    pub weighting_strategy: i32,
}

/// One generator process line of the `<init>` block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessLine {
    /// Cross section in pb.
    pub cross_section: f64,
    /// Statistical error of the cross section in pb.
    pub cross_section_error: f64,
    /// Maximum event weight.
    pub max_weight: f64,
    /// Generator process identifier.
    pub process_id: i32,
}

/// Detector geometry and model parameters.
///
/// Lengths are in metres, masses and energies in GeV, `ndet` in targets
/// per cm^3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSetup {
    /// Primary beam energy.
    pub ebeam: f64,
    /// Mass of the incident dark fermion.
    pub fmass: f64,
    /// Mass of the dark-photon mediator.
    pub apmass: f64,
    /// Full transverse width along x.
    pub lx: f64,
    /// Full transverse width along y.
    pub ly: f64,
    /// Depth along the beam axis.
    pub lz: f64,
    /// Distance from the production point to the front face.
    pub ldet: f64,
    /// Number of targets per unit volume of detector medium.
    pub ndet: f64,
    /// Kinetic-mixing parameter.
    pub epsilon: f64,
    /// Dark-sector coupling, when the header pins it.
    pub alpha_d: Option<f64>,
    /// Interaction process code.
    pub procid: i32,
    /// Random seed for the interaction sampling.
    pub seed: u64,
    /// Source particles per unit exposure.
    pub ndump: f64,
    /// Livetime fraction.
    pub ldump: f64,
}

impl Default for DetectorSetup {
    fn default() -> Self {
        Self {
            ebeam: 0.0,
            fmass: 0.0,
            apmass: 0.0,
            lx: 0.0,
            ly: 0.0,
            lz: 0.0,
            ldet: 0.0,
            ndet: 0.0,
            epsilon: 0.0,
            alpha_d: None,
            procid: 0,
            seed: 0,
            ndump: 1.0,
            ldump: 1.0,
        }
    }
}

/// Immutable per-run configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunHeader {
    /// Beam description.
    pub beam: BeamSetup,
    /// Generator process lines.
    pub processes: Vec<ProcessLine>,
    /// Detector and model parameters.
    pub detector: DetectorSetup,
    /// `key value` lines not interpreted by this program, in file order.
    /// The value is the rest of the line, internal spacing included.
    pub extensions: Vec<(String, String)>,
    /// The document's opening `<LesHouchesEvents ...>` tag as read. Empty
    /// for a header built in code.
    pub document_tag: String,
    /// Every `<init>` line after the process lines, as read: detector keys,
    /// extensions, comments and embedded tags. Written back unchanged.
    pub init_lines: Vec<String>,
}

impl RunHeader {
    /// The interaction process selected for this run.
    pub const fn process(&self) -> ProcessKind {
        ProcessKind::from_code(self.detector.procid)
    }

    /// The detector box described by this header.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if any dimension is not strictly positive.
    pub fn geometry(&self) -> Result<FiducialVolume, GeometryError> {
        let d = &self.detector;
        FiducialVolume::new(d.lx, d.ly, d.lz, d.ldet)
    }

    /// Factor converting a summed event rate into events per unit exposure.
    pub fn exposure_factor(&self) -> f64 {
        self.detector.ndump * self.detector.ldump
    }
}
