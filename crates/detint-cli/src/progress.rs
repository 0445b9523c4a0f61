//! Event callback reporting progress and recording interactions.
//!
//! After each event, [`ProgressCallback`] logs a progress line every
//! `interval` events and, when a table is configured, stages one
//! [`InteractionRow`] per elastic interaction and flushes it.

use std::io::Write;

use detint_core::{CallbackError, EventCallback, EventReport, RunSummary};
use detint_table::{Branch, TableWriter};
use detint_types::EventRecord;
use serde::Serialize;
use tracing::info;

/// One line of the interaction table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionRow {
    /// 0-based event index in the input file.
    pub event: u64,
    /// 1-based index of the interacting particle.
    pub particle: u32,
    /// Target name.
    pub target: &'static str,
    /// Vertex x, in metres.
    pub vertex_x_m: f64,
    /// Vertex y, in metres.
    pub vertex_y_m: f64,
    /// Vertex z, in metres.
    pub vertex_z_m: f64,
    /// Chord length inside the detector, in cm.
    pub path_length_cm: f64,
    /// Elastic cross section, in cm^2.
    pub cross_section_cm2: f64,
    /// Interaction probability.
    pub probability: f64,
    /// Production weight of the event.
    pub weight: f64,
    /// The event's contribution to the run total.
    pub contribution: f64,
}

/// Progress logger and interaction table writer.
pub struct ProgressCallback<W: Write> {
    total: u64,
    interval: u64,
    rows: Branch<InteractionRow>,
    table: Option<TableWriter<W>>,
}

impl<W: Write> ProgressCallback<W> {
    /// Create a callback for a run of `total` events.
    ///
    /// An `interval` of zero disables progress lines.
    pub fn new(total: u64, interval: u64, table: Option<TableWriter<W>>) -> Self {
        Self {
            total,
            interval,
            rows: Branch::new("interactions"),
            table,
        }
    }

    /// Flush and return the table output, if a table was configured.
    pub fn finish(self) -> Result<Option<W>, detint_table::BufferError> {
        self.table.map(TableWriter::finish).transpose()
    }
}

impl<W: Write> EventCallback for ProgressCallback<W> {
    fn on_event(
        &mut self,
        index: u64,
        event: &EventRecord,
        report: &EventReport,
    ) -> Result<(), CallbackError> {
        let processed = index.saturating_add(1);
        if processed.checked_rem(self.interval) == Some(0) {
            info!(processed, total = self.total, "progress");
        }

        // --- Interaction table ---
        let Some(table) = self.table.as_mut() else {
            return Ok(());
        };
        if let Some(interaction) = report.interaction {
            self.rows
                .new_entry(InteractionRow {
                    event: index,
                    particle: interaction.particle,
                    target: interaction.target.as_str(),
                    vertex_x_m: interaction.vertex.x,
                    vertex_y_m: interaction.vertex.y,
                    vertex_z_m: interaction.vertex.z,
                    path_length_cm: interaction.path_length,
                    cross_section_cm2: interaction.cross_section,
                    probability: interaction.probability,
                    weight: event.weight,
                    contribution: report.contribution,
                })
                .map_err(CallbackError::new)?;
        }
        table
            .flush_branch(&mut self.rows)
            .map_err(CallbackError::new)?;
        Ok(())
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<(), CallbackError> {
        let rows = self.table.as_ref().map_or(0, TableWriter::rows_written);
        info!(
            processed = summary.events,
            total = self.total,
            table_rows = rows,
            "event loop complete"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use detint_core::dispatch::Interaction;
    use detint_types::{TargetKind, Vector3};

    use super::*;

    fn report(interaction: Option<Interaction>) -> EventReport {
        EventReport {
            accepted: 1,
            candidates: 1,
            multiplier: 0.25,
            contribution: 5e-37,
            interaction,
            diagnostics: Vec::new(),
        }
    }

    fn elastic() -> Interaction {
        Interaction {
            target: TargetKind::Electron,
            particle: 2,
            vertex: Vector3::new(0.5, 0.5, 10.5),
            path_length: 50.0,
            cross_section: 1e-30,
            probability: 0.25,
        }
    }

    #[test]
    fn writes_one_row_per_interaction() {
        let mut callback = ProgressCallback::new(3, 0, Some(TableWriter::new(Vec::new())));
        let event = EventRecord {
            weight: 2.0,
            ..EventRecord::default()
        };
        callback.on_event(0, &event, &report(Some(elastic()))).unwrap();
        callback.on_event(1, &event, &report(None)).unwrap();
        callback.on_event(2, &event, &report(Some(elastic()))).unwrap();

        let bytes = callback.finish().unwrap().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let rows: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["event"], 0);
        assert_eq!(rows[1]["event"], 2);
        assert_eq!(rows[1]["particle"], 2);
        assert_eq!(rows[1]["target"], "electron");
        assert_eq!(rows[1]["vertex_z_m"], 10.5);
    }

    #[test]
    fn without_a_table_nothing_is_staged() {
        let mut callback: ProgressCallback<Vec<u8>> = ProgressCallback::new(1, 1, None);
        callback
            .on_event(0, &EventRecord::default(), &report(Some(elastic())))
            .unwrap();
        assert!(callback.rows.is_empty());
        assert!(callback.finish().unwrap().is_none());
    }
}
