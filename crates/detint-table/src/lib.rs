//! Tabular output for the detector interaction post-processor.
//!
//! Rows are staged per event in a [`Branch`], an append-only buffer whose
//! capacity grows in steps chosen by a [`GrowthPolicy`], and flushed to a
//! [`TableWriter`] as JSON lines.
//!
//! # Modules
//!
//! - [`growth`] -- Capacity growth policies
//! - [`branch`] -- [`Branch`] staging buffer
//! - [`writer`] -- [`TableWriter`] JSON-lines sink
//! - [`error`] -- [`BufferError`]

pub mod branch;
pub mod error;
pub mod growth;
pub mod writer;

pub use branch::Branch;
pub use error::BufferError;
pub use growth::{GrowthPolicy, SteppedGrowth};
pub use writer::TableWriter;
