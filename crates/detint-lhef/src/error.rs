//! Errors raised while reading or writing an event file.

/// Errors from the LHEF reader and writer.
#[derive(Debug, thiserror::Error)]
pub enum LhefError {
    /// Reading or writing the underlying stream failed.
    #[error("event file I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A required tag never appeared.
    #[error("missing {tag} tag")]
    MissingTag {
        /// The tag that was expected.
        tag: &'static str,
    },

    /// The stream ended inside a block.
    #[error("unexpected end of file inside {context}")]
    UnexpectedEof {
        /// The block being read.
        context: &'static str,
    },

    /// A line has the wrong shape.
    #[error("line {line}: {reason}")]
    Malformed {
        /// 1-based line number.
        line: u64,
        /// What is wrong with it.
        reason: String,
    },

    /// A field could not be parsed as a number.
    #[error("line {line}: invalid {field} value {value:?}")]
    InvalidField {
        /// 1-based line number.
        line: u64,
        /// Name of the field.
        field: &'static str,
        /// The text found.
        value: String,
    },
}
