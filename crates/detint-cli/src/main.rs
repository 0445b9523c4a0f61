//! Detector interaction post-processor.
//!
//! Reads an LHEF file of dark-fermion production events, lets the
//! particles that reach the downstream detector interact in it, writes the
//! modified events to a new LHEF file, and prints the expected number of
//! detector events per electron on target.
//!
//! # Startup Sequence
//!
//! 1. Check the command line (`input_file output_file`)
//! 2. Load configuration from `detint.yaml` or `DETINT_CONFIG`
//! 3. Initialize structured logging (tracing)
//! 4. Count the events in the input file
//! 5. Open the input reader and the output writer
//! 6. Build the kinematics provider and the analysis session
//! 7. Run the event loop
//! 8. Close the outputs and print the exposure-normalised total

mod error;
mod progress;
mod stream;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::process::ExitCode;

use detint_core::config::{DetintConfig, LogFormat};
use detint_core::{Analysis, runner};
use detint_kinematics::DarkPhotonKinematics;
use detint_lhef::{LhefReader, LhefWriter, count_events};
use detint_table::TableWriter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::progress::ProgressCallback;
use crate::stream::{LhefSink, LhefSource};

/// Program name shown in the usage message.
const APP_NAME: &str = "detint";

/// Application entry point.
///
/// Exits with status 1 on a usage error or any failure.
fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage) => {
            print_usage();
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(error = %err, "detint failed");
            eprintln!(" Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!(" Usage: {APP_NAME} input_file output_file");
    println!(" input_file - input file in LHEF format,");
    println!(" output_file - output file in LHEF format.");
}

fn run(args: &[String]) -> Result<(), CliError> {
    // 1. Check the command line.
    let [_, input_path, output_path] = args else {
        return Err(CliError::Usage);
    };
    let input_path = Path::new(input_path);
    let output_path = Path::new(output_path);

    // 2. Load configuration.
    let config = DetintConfig::load(|key| std::env::var(key).ok())?;

    // 3. Initialize structured logging.
    init_logging(config.logging.format);
    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        "detint starting"
    );

    // 4. Count events for progress reporting.
    let total = count_events(BufReader::new(open(input_path)?))?;
    info!(events = total, "input file scanned");

    // 5. Open the event streams.
    let reader = LhefReader::open(BufReader::new(open(input_path)?))?;
    let header = reader.header().clone();
    let output = File::create(output_path).map_err(|err| CliError::open(output_path, err))?;
    let writer = LhefWriter::new(BufWriter::new(output), &header, reader.header_block())?;
    info!(
        process = ?header.process(),
        seed = header.detector.seed,
        ndet = header.detector.ndet,
        exposure_factor = header.exposure_factor(),
        "run header loaded"
    );

    // 6. Build the analysis session.
    let kinematics = DarkPhotonKinematics::new(&header.detector, config.kinematics);
    let analysis = Analysis::new(&header, kinematics);

    let table = match &config.output.table_path {
        Some(path) => {
            let file = File::create(path).map_err(|err| CliError::open(path, err))?;
            info!(path = %path.display(), "interaction table enabled");
            Some(TableWriter::new(BufWriter::new(file)))
        }
        None => None,
    };
    let mut callback = ProgressCallback::new(total, config.output.progress_interval, table);

    // 7. Run the event loop.
    let mut source = LhefSource::new(reader);
    let mut sink = LhefSink::new(writer);
    let summary = runner::run(analysis, &mut source, &mut sink, &mut callback)?;

    // 8. Close the outputs and report.
    sink.finish()?;
    callback.finish()?;
    println!(" Events per EOT: {}", summary.exposure.events_per_exposure);
    Ok(())
}

fn open(path: &Path) -> Result<File, CliError> {
    File::open(path).map_err(|err| CliError::open(path, err))
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
