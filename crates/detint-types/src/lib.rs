//! Shared type definitions for the detector interaction post-processor.
//!
//! This crate is the single source of truth for the event record model that
//! flows between the LHEF reader, the analysis core, and the writer.
//!
//! # Modules
//!
//! - [`codes`] -- Particle type and status codes used by the analysis
//! - [`momentum`] -- Four-momentum and three-vector arithmetic
//! - [`event`] -- Per-event particle list ([`EventRecord`], [`ParticleEntry`])
//! - [`header`] -- Run-level configuration ([`RunHeader`])
//! - [`geometry`] -- Derived detector box ([`FiducialVolume`])
//! - [`process`] -- Interaction process selector ([`ProcessKind`])

pub mod codes;
pub mod event;
pub mod geometry;
pub mod header;
pub mod momentum;
pub mod process;

// Re-export all public types at crate root for convenience.
pub use codes::StatusCode;
pub use event::{EventRecord, ParticleEntry};
pub use geometry::{FiducialVolume, GeometryError};
pub use header::{BeamSetup, DetectorSetup, ProcessLine, RunHeader};
pub use momentum::{FourMomentum, Vector3};
pub use process::{ProcessKind, TargetKind};
