//! JSON-lines table sink.

use std::io::Write;

use serde::Serialize;

use crate::branch::Branch;
use crate::error::BufferError;
use crate::growth::GrowthPolicy;

/// Writes one JSON object per line.
#[derive(Debug)]
pub struct TableWriter<W: Write> {
    output: W,
    rows: u64,
}

impl<W: Write> TableWriter<W> {
    /// Wrap an output stream.
    pub const fn new(output: W) -> Self {
        Self { output, rows: 0 }
    }

    /// Append a single row.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Serialize`] if the row cannot be encoded and
    /// [`BufferError::Io`] if the output cannot be written.
    pub fn write_row<T: Serialize>(&mut self, row: &T) -> Result<(), BufferError> {
        serde_json::to_writer(&mut self.output, row)?;
        self.output.write_all(b"\n")?;
        self.rows = self.rows.saturating_add(1);
        Ok(())
    }

    /// Write every staged row of `branch` and clear it.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// See [`TableWriter::write_row`]. On error the branch is left intact.
    pub fn flush_branch<T: Serialize, P: GrowthPolicy>(
        &mut self,
        branch: &mut Branch<T, P>,
    ) -> Result<usize, BufferError> {
        for row in &*branch {
            self.write_row(row)?;
        }
        let written = branch.len();
        branch.clear();
        Ok(written)
    }

    /// Rows written so far.
    pub const fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Flush and return the output.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Io`] if flushing fails.
    pub fn finish(mut self) -> Result<W, BufferError> {
        self.output.flush()?;
        tracing::debug!(rows = self.rows, "table closed");
        Ok(self.output)
    }
}
