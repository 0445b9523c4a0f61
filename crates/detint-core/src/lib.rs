//! Per-event analysis for the detector interaction post-processor.
//!
//! For every event the analysis walks the particle list, keeps the dark
//! fermions whose straight-line trajectory hits the detector front face,
//! lets the first of them interact, appends the secondaries, and folds the
//! event's rescaled weight into a run total.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `detint.yaml`
//! - [`fiducial`] -- Geometric acceptance and front-face entry point
//! - [`dispatch`] -- Interaction process applied to an accepted particle
//! - [`weight`] -- Per-event contribution and the run-level total
//! - [`diagnostic`] -- Recoverable per-event problems
//! - [`analysis`] -- [`Analysis`] session tying the above together
//! - [`runner`] -- Source, analysis, sink loop

pub mod analysis;
pub mod config;
pub mod diagnostic;
pub mod dispatch;
pub mod fiducial;
pub mod runner;
pub mod weight;

pub use analysis::{Analysis, AnalysisConfig, CouplingState, EventReport};
pub use diagnostic::EventDiagnostic;
pub use runner::{
    CallbackError, EventCallback, EventSink, EventSource, NoOpCallback, RunEnd, RunSummary,
    RunnerError,
};
pub use weight::{ExposureTotal, WeightAccumulator};
