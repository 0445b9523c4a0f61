//! LHEF adapters for the event loop.
//!
//! [`LhefSource`] and [`LhefSink`] plug the streaming LHEF reader and
//! writer into [`detint_core::runner::run`].

use std::io::{BufRead, Write};

use detint_core::{EventSink, EventSource};
use detint_lhef::{LhefError, LhefReader, LhefWriter};
use detint_types::EventRecord;

/// Event source reading an LHEF document.
pub struct LhefSource<R> {
    reader: LhefReader<R>,
}

impl<R: BufRead> LhefSource<R> {
    /// Wrap an opened reader.
    pub const fn new(reader: LhefReader<R>) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> EventSource for LhefSource<R> {
    type Error = LhefError;

    fn next_event(&mut self) -> Result<Option<EventRecord>, Self::Error> {
        self.reader.next_event()
    }
}

/// Event sink writing an LHEF document.
pub struct LhefSink<W: Write> {
    writer: LhefWriter<W>,
}

impl<W: Write> LhefSink<W> {
    /// Wrap a writer whose `<init>` block is already written.
    pub const fn new(writer: LhefWriter<W>) -> Self {
        Self { writer }
    }

    /// Close the document and return the output.
    pub fn finish(self) -> Result<W, LhefError> {
        let events = self.writer.events_written();
        let output = self.writer.finish()?;
        tracing::debug!(events, "output document closed");
        Ok(output)
    }
}

impl<W: Write> EventSink for LhefSink<W> {
    type Error = LhefError;

    fn write_event(&mut self, event: &EventRecord) -> Result<(), Self::Error> {
        self.writer.write_event(event)
    }
}
