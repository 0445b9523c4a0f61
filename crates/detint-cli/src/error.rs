//! Error types for the `detint` binary.
//!
//! [`CliError`] is the top-level error type that wraps all possible
//! failure modes during startup and the event loop.

use std::path::PathBuf;

/// Top-level error for the `detint` binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `run` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The command line did not name exactly an input and an output file.
    #[error("expected exactly two arguments: input_file output_file")]
    Usage,

    /// A file could not be opened or created.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// The file in question.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: detint_core::config::ConfigError,
    },

    /// Reading or writing the event stream failed.
    #[error("event stream error: {source}")]
    Lhef {
        /// The underlying stream error.
        #[from]
        source: detint_lhef::LhefError,
    },

    /// The event loop aborted.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: detint_core::RunnerError,
    },

    /// The interaction table could not be written.
    #[error("table error: {source}")]
    Table {
        /// The underlying buffer error.
        #[from]
        source: detint_table::BufferError,
    },
}

impl CliError {
    /// Wrap an I/O error with the path that caused it.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }
}
