//! Errors raised by branches and table writers.

/// Errors from staging or writing table rows.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// The branch could not grow to hold another entry.
    #[error("branch {branch} cannot grow beyond {capacity} entries")]
    CapacityExhausted {
        /// Name of the branch.
        branch: String,
        /// Capacity at the time of failure.
        capacity: usize,
    },

    /// Writing the table failed.
    #[error("table I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A row could not be serialized.
    #[error("failed to serialize table row: {source}")]
    Serialize {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
