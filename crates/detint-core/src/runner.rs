//! Source, analysis, sink loop.
//!
//! [`run`] pulls events from an [`EventSource`] one at a time, analyses
//! each in place, hands it to an [`EventSink`], and notifies an
//! [`EventCallback`]. Output order is input order.
//!
//! A malformed event ends the loop but not the run: everything written so
//! far stays valid and the exposure total is still produced. A sink or
//! callback failure is fatal.

use std::collections::VecDeque;
use std::convert::Infallible;

use detint_kinematics::KinematicsProvider;
use detint_types::EventRecord;
use tracing::{info, warn};

use crate::analysis::{Analysis, EventReport};
use crate::weight::ExposureTotal;

/// Supplies events in file order.
pub trait EventSource {
    /// Error raised for an event that cannot be read.
    type Error: std::error::Error;

    /// The next event, or `None` at end of stream.
    fn next_event(&mut self) -> Result<Option<EventRecord>, Self::Error>;
}

/// Receives analysed events in file order.
pub trait EventSink {
    /// Error raised when an event cannot be written.
    type Error: std::error::Error;

    /// Write one event.
    fn write_event(&mut self, event: &EventRecord) -> Result<(), Self::Error>;
}

/// Error returned by an [`EventCallback`].
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CallbackError {
    /// What went wrong.
    pub message: String,
}

impl CallbackError {
    /// Wrap any displayable error.
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Hook invoked after every event is written.
pub trait EventCallback {
    /// Called with the 0-based event index, the written event, and its
    /// report.
    fn on_event(
        &mut self,
        index: u64,
        event: &EventRecord,
        report: &EventReport,
    ) -> Result<(), CallbackError>;

    /// Called once after the loop ends.
    fn on_finish(&mut self, _summary: &RunSummary) -> Result<(), CallbackError> {
        Ok(())
    }
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl EventCallback for NoOpCallback {
    fn on_event(
        &mut self,
        _index: u64,
        _event: &EventRecord,
        _report: &EventReport,
    ) -> Result<(), CallbackError> {
        Ok(())
    }
}

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The sink refused an event.
    #[error("failed to write event {index}: {message}")]
    Sink {
        /// 0-based index of the event.
        index: u64,
        /// The sink's error.
        message: String,
    },

    /// The callback failed.
    #[error("event callback failed: {source}")]
    Callback {
        /// The callback's error.
        #[from]
        source: CallbackError,
    },
}

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEnd {
    /// The source ran out of events.
    EndOfStream,
    /// The source could not read the next event.
    MalformedInput {
        /// The source's error.
        message: String,
    },
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Why the loop stopped.
    pub end: RunEnd,
    /// Events analysed and written.
    pub events: u64,
    /// Events with at least one accepted candidate.
    pub events_with_acceptance: u64,
    /// Elastic interactions produced.
    pub interactions: u64,
    /// Diagnostics raised across all events.
    pub diagnostics: u64,
    /// Exposure-normalised total.
    pub exposure: ExposureTotal,
}

/// Drive `analysis` over every event of `source`.
///
/// # Errors
///
/// Returns [`RunnerError`] if the sink or the callback fails. A read error
/// from the source is not an error of the run; it is reported in
/// [`RunSummary::end`].
pub fn run<K, S, W>(
    mut analysis: Analysis<K>,
    source: &mut S,
    sink: &mut W,
    callback: &mut dyn EventCallback,
) -> Result<RunSummary, RunnerError>
where
    K: KinematicsProvider,
    S: EventSource,
    W: EventSink,
{
    let mut events: u64 = 0;
    let mut events_with_acceptance: u64 = 0;
    let mut interactions: u64 = 0;
    let mut diagnostics: u64 = 0;

    info!("event loop starting");

    let end = loop {
        let mut event = match source.next_event() {
            Ok(Some(event)) => event,
            Ok(None) => break RunEnd::EndOfStream,
            Err(err) => {
                warn!(event = events, error = %err, "malformed input, stopping event loop");
                break RunEnd::MalformedInput {
                    message: err.to_string(),
                };
            }
        };

        let report = analysis.analyse_event(&mut event);
        for diagnostic in &report.diagnostics {
            warn!(event = events, diagnostic = %diagnostic, "event diagnostic");
        }

        sink.write_event(&event)
            .map_err(|err| RunnerError::Sink {
                index: events,
                message: err.to_string(),
            })?;
        callback.on_event(events, &event, &report)?;

        events = events.saturating_add(1);
        if report.accepted > 0 {
            events_with_acceptance = events_with_acceptance.saturating_add(1);
        }
        if report.interaction.is_some() {
            interactions = interactions.saturating_add(1);
        }
        diagnostics = diagnostics
            .saturating_add(u64::try_from(report.diagnostics.len()).unwrap_or(u64::MAX));
    };

    let summary = RunSummary {
        end,
        events,
        events_with_acceptance,
        interactions,
        diagnostics,
        exposure: analysis.finish(),
    };
    callback.on_finish(&summary)?;
    log_run_end(&summary);
    Ok(summary)
}

/// Log the end-of-run summary.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        end = ?summary.end,
        events = summary.events,
        events_with_acceptance = summary.events_with_acceptance,
        interactions = summary.interactions,
        diagnostics = summary.diagnostics,
        raw_total = summary.exposure.raw_total,
        events_per_exposure = summary.exposure.events_per_exposure,
        "run finished"
    );
    if summary.events == 0 {
        warn!("run finished with no events");
    }
}

impl EventSource for VecDeque<EventRecord> {
    type Error = Infallible;

    fn next_event(&mut self) -> Result<Option<EventRecord>, Self::Error> {
        Ok(self.pop_front())
    }
}

impl EventSink for Vec<EventRecord> {
    type Error = Infallible;

    fn write_event(&mut self, event: &EventRecord) -> Result<(), Self::Error> {
        self.push(event.clone());
        Ok(())
    }
}
