//! Les Houches Event File (LHEF) stream.
//!
//! The reader turns an LHEF document into a [`RunHeader`] plus a sequence of
//! [`EventRecord`]s; the writer does the reverse. The `<init>` block carries
//! the standard beam and process lines followed by `key value` lines with
//! the detector and model parameters (`lx`, `ldet`, `ndet`, `procid`, ...).
//!
//! # Modules
//!
//! - [`reader`] -- [`LhefReader`] and the event pre-count
//! - [`writer`] -- [`LhefWriter`]
//! - [`error`] -- [`LhefError`]
//!
//! [`RunHeader`]: detint_types::RunHeader
//! [`EventRecord`]: detint_types::EventRecord

pub mod error;
mod fields;
pub mod reader;
pub mod writer;

pub use error::LhefError;
pub use reader::{LhefReader, count_events};
pub use writer::{LhefWriter, detector_lines};
