//! LHEF reader.
//!
//! [`LhefReader::open`] consumes everything up to and including `</init>`.
//! The lines between the opening `<LesHouchesEvents>` tag and `<init>` are
//! kept verbatim as the header block so the writer can pass them through.
//! Events are then read one at a time with [`LhefReader::next_event`].

use std::io::BufRead;

use detint_types::{
    BeamSetup, DetectorSetup, EventRecord, FourMomentum, ParticleEntry, ProcessLine, RunHeader,
    StatusCode,
};
use tracing::debug;

use crate::error::LhefError;
use crate::fields::{Fields, parse_float};

/// Streaming reader over an LHEF document.
#[derive(Debug)]
pub struct LhefReader<R> {
    input: R,
    line: u64,
    buffer: String,
    header: RunHeader,
    header_block: String,
    finished: bool,
}

impl<R: BufRead> LhefReader<R> {
    /// Read the document preamble and the `<init>` block.
    ///
    /// # Errors
    ///
    /// Returns [`LhefError`] if the opening tag or the `<init>` block is
    /// missing or malformed, or if the stream cannot be read.
    pub fn open(input: R) -> Result<Self, LhefError> {
        let mut reader = Self {
            input,
            line: 0,
            buffer: String::new(),
            header: RunHeader::default(),
            header_block: String::new(),
            finished: false,
        };

        // --- Opening tag ---
        loop {
            if !reader.advance()? {
                return Err(LhefError::MissingTag {
                    tag: "<LesHouchesEvents>",
                });
            }
            if reader.current().starts_with("<LesHouchesEvents") {
                reader.header.document_tag = reader.current().to_owned();
                break;
            }
        }

        // --- Header block, kept verbatim ---
        loop {
            if !reader.advance()? {
                return Err(LhefError::MissingTag { tag: "<init>" });
            }
            if reader.current().starts_with("<init") {
                break;
            }
            reader.header_block.push_str(reader.buffer.trim_end_matches(['\r', '\n']));
            reader.header_block.push('\n');
        }

        reader.read_init()?;
        debug!(
            procid = reader.header.detector.procid,
            processes = reader.header.processes.len(),
            extensions = reader.header.extensions.len(),
            "event file header read"
        );
        Ok(reader)
    }

    /// The run header.
    pub const fn header(&self) -> &RunHeader {
        &self.header
    }

    /// The lines between the opening tag and `<init>`, newline-terminated.
    pub fn header_block(&self) -> &str {
        &self.header_block
    }

    /// Read the next event, or `None` at the end of the document.
    ///
    /// # Errors
    ///
    /// Returns [`LhefError`] if the event block is malformed or truncated.
    pub fn next_event(&mut self) -> Result<Option<EventRecord>, LhefError> {
        if self.finished {
            return Ok(None);
        }

        loop {
            if !self.advance()? {
                self.finished = true;
                return Ok(None);
            }
            let current = self.current();
            if current.starts_with("</LesHouchesEvents") {
                self.finished = true;
                return Ok(None);
            }
            if current.starts_with("<event") {
                break;
            }
        }

        self.require_line("<event>")?;
        let line = self.line;
        let mut fields = Fields::new(self.current(), line);
        let count: usize = fields.int("NUP")?;
        let mut event = EventRecord {
            process_id: fields.int("IDPRUP")?,
            weight: fields.float("XWGTUP")?,
            scale: fields.float("SCALUP")?,
            aqed: fields.float("AQEDUP")?,
            aqcd: fields.float("AQCDUP")?,
            particles: Vec::new(),
            annotation: String::new(),
        };

        for _ in 0..count {
            self.require_line("<event>")?;
            if self.current().starts_with('<') {
                return Err(LhefError::Malformed {
                    line: self.line,
                    reason: format!("event declares {count} particles but ends early"),
                });
            }
            event.particles.push(parse_particle(self.current(), self.line)?);
        }

        let mut trailing: Vec<String> = Vec::new();
        loop {
            self.require_line("<event>")?;
            let current = self.current();
            if current.starts_with("</event") {
                break;
            }
            if current.starts_with("<event") {
                return Err(LhefError::Malformed {
                    line: self.line,
                    reason: "new event before </event>".to_owned(),
                });
            }
            if !current.is_empty() {
                trailing.push(current.to_owned());
            }
        }
        event.annotation = trailing.join("\n");

        Ok(Some(event))
    }

    fn read_init(&mut self) -> Result<(), LhefError> {
        self.require_line("<init>")?;
        let line = self.line;
        let mut fields = Fields::new(self.current(), line);
        let beam = BeamSetup {
            ids: (fields.int("IDBMUP1")?, fields.int("IDBMUP2")?),
            energies: (fields.float("EBMUP1")?, fields.float("EBMUP2")?),
            pdf_groups: (fields.int("PDFGUP1")?, fields.int("PDFGUP2")?),
            pdf_sets: (fields.int("PDFSUP1")?, fields.int("PDFSUP2")?),
            weighting_strategy: fields.int("IDWTUP")?,
        };
        let process_count: usize = fields.int("NPRUP")?;
        self.header.beam = beam;

        for _ in 0..process_count {
            self.require_line("<init>")?;
            let mut fields = Fields::new(self.current(), self.line);
            let process = ProcessLine {
                cross_section: fields.float("XSECUP")?,
                cross_section_error: fields.float("XERRUP")?,
                max_weight: fields.float("XMAXUP")?,
                process_id: fields.int("LPRUP")?,
            };
            self.header.processes.push(process);
        }

        loop {
            self.require_line("<init>")?;
            if self.current().starts_with("</init") {
                return Ok(());
            }
            let raw = self.buffer.trim_end_matches(['\r', '\n']).to_owned();
            let line = self.line;
            let current = raw.trim();
            if !(current.is_empty() || current.starts_with('#') || current.starts_with('<')) {
                let (key, value) = current
                    .split_once(char::is_whitespace)
                    .map_or((current, ""), |(key, rest)| (key, rest.trim()));
                if !apply_detector_key(&mut self.header.detector, key, value, line)? {
                    self.header
                        .extensions
                        .push((key.to_owned(), value.to_owned()));
                }
            }
            self.header.init_lines.push(raw);
        }
    }

    /// Read the next line into the buffer. Returns `false` at end of input.
    fn advance(&mut self) -> Result<bool, LhefError> {
        self.buffer.clear();
        let read = self.input.read_line(&mut self.buffer)?;
        if read == 0 {
            return Ok(false);
        }
        self.line = self.line.saturating_add(1);
        Ok(true)
    }

    fn require_line(&mut self, context: &'static str) -> Result<(), LhefError> {
        if self.advance()? {
            Ok(())
        } else {
            Err(LhefError::UnexpectedEof { context })
        }
    }

    /// The current line without surrounding whitespace.
    fn current(&self) -> &str {
        self.buffer.trim()
    }
}

/// Store a detector parameter. Returns `false` for keys this program does
/// not interpret.
fn apply_detector_key(
    detector: &mut DetectorSetup,
    key: &str,
    value: &str,
    line: u64,
) -> Result<bool, LhefError> {
    let float = |field: &'static str| {
        parse_float(value).ok_or_else(|| LhefError::InvalidField {
            line,
            field,
            value: value.to_owned(),
        })
    };
    match key.to_ascii_lowercase().as_str() {
        "ebeam" => detector.ebeam = float("ebeam")?,
        "fmass" => detector.fmass = float("fmass")?,
        "apmass" => detector.apmass = float("apmass")?,
        "lx" => detector.lx = float("lx")?,
        "ly" => detector.ly = float("ly")?,
        "lz" => detector.lz = float("lz")?,
        "ldet" => detector.ldet = float("ldet")?,
        "ndet" => detector.ndet = float("ndet")?,
        "epsilon" => detector.epsilon = float("epsilon")?,
        "alphad" => detector.alpha_d = Some(float("alphad")?),
        "ndump" => detector.ndump = float("ndump")?,
        "ldump" => detector.ldump = float("ldump")?,
        "procid" => {
            let mut fields = Fields::new(value, line);
            detector.procid = fields.int("procid")?;
        }
        "seed" => {
            let mut fields = Fields::new(value, line);
            detector.seed = fields.int("seed")?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn parse_particle(text: &str, line: u64) -> Result<ParticleEntry, LhefError> {
    let mut fields = Fields::new(text, line);
    Ok(ParticleEntry {
        id: fields.int("IDUP")?,
        status: StatusCode(fields.int("ISTUP")?),
        mothers: (fields.int("MOTHUP1")?, fields.int("MOTHUP2")?),
        colour: (fields.int("ICOLUP1")?, fields.int("ICOLUP2")?),
        momentum: FourMomentum::new(
            fields.float("PUP1")?,
            fields.float("PUP2")?,
            fields.float("PUP3")?,
            fields.float("PUP4")?,
        ),
        mass: fields.float("PUP5")?,
        lifetime: fields.float("VTIMUP")?,
        spin: fields.float("SPINUP")?,
    })
}

/// Count the `<event>` blocks of a document without parsing them.
///
/// # Errors
///
/// Returns [`LhefError::Io`] if the stream cannot be read.
pub fn count_events<R: BufRead>(input: R) -> Result<u64, LhefError> {
    let mut count: u64 = 0;
    for line in input.lines() {
        if line?.trim_start().starts_with("<event") {
            count = count.saturating_add(1);
        }
    }
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn detector_keys_are_case_insensitive() {
        let mut detector = DetectorSetup::default();
        assert!(apply_detector_key(&mut detector, "LDET", "2.5D+01", 1).unwrap());
        assert!(apply_detector_key(&mut detector, "procid", "2", 1).unwrap());
        assert!(apply_detector_key(&mut detector, "alphad", "0.1", 1).unwrap());
        assert!(!apply_detector_key(&mut detector, "run_tag", "x", 1).unwrap());
        assert!((detector.ldet - 25.0).abs() < f64::EPSILON);
        assert_eq!(detector.procid, 2);
        assert_eq!(detector.alpha_d, Some(0.1));
    }

    #[test]
    fn bad_detector_value_names_its_key() {
        let mut detector = DetectorSetup::default();
        let err = apply_detector_key(&mut detector, "ndet", "lots", 9).unwrap_err();
        assert!(matches!(
            err,
            LhefError::InvalidField { line: 9, field: "ndet", .. }
        ));
    }

    #[test]
    fn particle_line_parses_all_columns() {
        let particle =
            parse_particle("611 1 1 2 0 0 0.05 0.05 1.0 1.0005 0.01 0.0 9.0", 3).unwrap();
        assert_eq!(particle.id, 611);
        assert_eq!(particle.status, StatusCode::FINAL);
        assert_eq!(particle.mothers, (1, 2));
        assert!((particle.momentum.e - 1.0005).abs() < f64::EPSILON);
        assert!((particle.spin - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn counts_event_tags() {
        let doc = "<LesHouchesEvents>\n<event>\n</event>\n  <event>\n</event>\n";
        assert_eq!(count_events(doc.as_bytes()).unwrap(), 2);
    }
}
