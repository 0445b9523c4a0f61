//! LHEF writer.
//!
//! Floats are written in shortest round-trip exponent form, so a document
//! read back by [`LhefReader`](crate::LhefReader) reproduces every value
//! exactly. The opening tag and the `<init>` lines after the process lines
//! are copied from the header as read, so comments, extension keys and
//! embedded tags pass through untouched.

use std::io::Write;

use detint_types::{DetectorSetup, EventRecord, ParticleEntry, RunHeader};

use crate::error::LhefError;

/// Opening tag written when the header does not carry one.
pub const DEFAULT_DOCUMENT_TAG: &str = "<LesHouchesEvents version=\"1.0\">";

/// Streaming writer producing an LHEF document.
#[derive(Debug)]
pub struct LhefWriter<W: Write> {
    output: W,
    events: u64,
}

impl<W: Write> LhefWriter<W> {
    /// Write the opening tag, the header block, and the `<init>` block.
    ///
    /// The opening tag and the `<init>` lines following the process lines
    /// are copied from `header` as read. `header_block` is copied as is; a
    /// trailing newline is added when missing. A header built in code has
    /// no recorded lines; fill [`RunHeader::init_lines`] with
    /// [`detector_lines`] to write its detector parameters.
    ///
    /// # Errors
    ///
    /// Returns [`LhefError::Io`] if the output cannot be written.
    pub fn new(mut output: W, header: &RunHeader, header_block: &str) -> Result<Self, LhefError> {
        if header.document_tag.is_empty() {
            writeln!(output, "{DEFAULT_DOCUMENT_TAG}")?;
        } else {
            writeln!(output, "{}", header.document_tag)?;
        }
        if !header_block.is_empty() {
            output.write_all(header_block.as_bytes())?;
            if !header_block.ends_with('\n') {
                writeln!(output)?;
            }
        }

        let beam = &header.beam;
        writeln!(output, "<init>")?;
        writeln!(
            output,
            "{} {} {:e} {:e} {} {} {} {} {} {}",
            beam.ids.0,
            beam.ids.1,
            beam.energies.0,
            beam.energies.1,
            beam.pdf_groups.0,
            beam.pdf_groups.1,
            beam.pdf_sets.0,
            beam.pdf_sets.1,
            beam.weighting_strategy,
            header.processes.len(),
        )?;
        for process in &header.processes {
            writeln!(
                output,
                "{:e} {:e} {:e} {}",
                process.cross_section,
                process.cross_section_error,
                process.max_weight,
                process.process_id,
            )?;
        }
        for line in &header.init_lines {
            writeln!(output, "{line}")?;
        }
        writeln!(output, "</init>")?;

        Ok(Self { output, events: 0 })
    }

    /// Append one event.
    ///
    /// # Errors
    ///
    /// Returns [`LhefError::Io`] if the output cannot be written.
    pub fn write_event(&mut self, event: &EventRecord) -> Result<(), LhefError> {
        let out = &mut self.output;
        writeln!(out, "<event>")?;
        writeln!(
            out,
            "{} {} {:e} {:e} {:e} {:e}",
            event.particle_count(),
            event.process_id,
            event.weight,
            event.scale,
            event.aqed,
            event.aqcd,
        )?;
        for particle in &event.particles {
            write_particle(out, particle)?;
        }
        if !event.annotation.is_empty() {
            writeln!(out, "{}", event.annotation)?;
        }
        writeln!(out, "</event>")?;
        self.events = self.events.saturating_add(1);
        Ok(())
    }

    /// Number of events written so far.
    pub const fn events_written(&self) -> u64 {
        self.events
    }

    /// Write the closing tag, flush, and return the output.
    ///
    /// # Errors
    ///
    /// Returns [`LhefError::Io`] if the output cannot be written.
    pub fn finish(mut self) -> Result<W, LhefError> {
        writeln!(self.output, "</LesHouchesEvents>")?;
        self.output.flush()?;
        Ok(self.output)
    }
}

/// `key value` lines for every detector parameter, in the order the
/// reader accepts them. `alphad` is written only when set.
pub fn detector_lines(detector: &DetectorSetup) -> Vec<String> {
    let floats = [
        ("ebeam", detector.ebeam),
        ("fmass", detector.fmass),
        ("apmass", detector.apmass),
        ("lx", detector.lx),
        ("ly", detector.ly),
        ("lz", detector.lz),
        ("ldet", detector.ldet),
        ("ndet", detector.ndet),
        ("epsilon", detector.epsilon),
    ];
    let mut lines: Vec<String> = floats
        .iter()
        .map(|(key, value)| format!("{key} {value:e}"))
        .collect();
    if let Some(alpha_d) = detector.alpha_d {
        lines.push(format!("alphad {alpha_d:e}"));
    }
    lines.push(format!("procid {}", detector.procid));
    lines.push(format!("seed {}", detector.seed));
    lines.push(format!("ndump {:e}", detector.ndump));
    lines.push(format!("ldump {:e}", detector.ldump));
    lines
}

fn write_particle<W: Write>(out: &mut W, particle: &ParticleEntry) -> Result<(), LhefError> {
    let p = &particle.momentum;
    writeln!(
        out,
        "{} {} {} {} {} {} {:e} {:e} {:e} {:e} {:e} {:e} {:e}",
        particle.id,
        particle.status.0,
        particle.mothers.0,
        particle.mothers.1,
        particle.colour.0,
        particle.colour.1,
        p.px,
        p.py,
        p.pz,
        p.e,
        particle.mass,
        particle.lifetime,
        particle.spin,
    )?;
    Ok(())
}
