use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mime_validator_rs::config::DEFAULT_DETECTOR;
use mime_validator_rs::prelude::*;

/// Exit code when a directory or batch file could not be opened
const EXIT_FATAL_RUN: i32 = 2;
/// Exit code after Ctrl-C
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser)]
#[command(name = "mime_validator_rs")]
#[command(about = "Checks that file extensions match their detected content type", long_about = None)]
#[command(group(ArgGroup::new("input").required(true).multiple(true).args(["files", "dir", "batch"])))]
struct Cli {
    /// Files to validate (results only, no summary)
    #[arg(short = 'f', long = "file", num_args = 1..)]
    files: Vec<PathBuf>,

    /// Validate every entry of this directory (not recursive)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Validate the paths listed in this file, one per line
    #[arg(short, long)]
    batch: Option<PathBuf>,

    /// Content-type detector, invoked as `<detector> --mime-type <path>`
    #[arg(long, env = "MIME_VALIDATOR_DETECTOR", default_value = DEFAULT_DETECTOR)]
    detector: String,

    /// Seconds to wait for the detector before giving up on a file
    #[arg(long, default_value_t = 10)]
    detector_timeout: u64,

    /// Count unsupported, empty, extension-less and undetectable files as errors
    #[arg(long)]
    count_all: bool,

    /// Also write every result as JSON Lines to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Hide the progress spinner
    #[arg(long)]
    no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Console output routed around the progress spinner
struct ProgressSink<S> {
    bar: ProgressBar,
    progress: Arc<RunProgress>,
    inner: S,
}

impl<S: OutcomeSink> OutcomeSink for ProgressSink<S> {
    fn outcome(&mut self, outcome: &ValidationOutcome) -> io::Result<()> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.outcome(outcome))?;
        self.bar.inc(1);
        if let Some(source) = self.progress.snapshot().source {
            self.bar.set_message(source);
        }
        Ok(())
    }

    fn summary(&mut self, source: &str, summary: &RunSummary, interrupted: bool) -> io::Result<()> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.summary(source, summary, interrupted))
    }

    fn run_failed(&mut self, error: &RunError) -> io::Result<()> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.run_failed(error))
    }
}

fn init_logging(verbose: bool) {
    // RUST_LOG takes precedence over --verbose
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn progress_bar(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} file(s) checked {msg}")
            .context("Invalid progress template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Set up graceful shutdown handler
    let shutdown_requested = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown_requested.clone();

    ctrlc::set_handler(move || {
        eprintln!("\nShutdown requested. Finishing current file...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let config = ValidatorConfig {
        detector: DetectorConfig {
            timeout: Duration::from_secs(cli.detector_timeout),
            ..DetectorConfig::with_program(cli.detector.clone())
        },
        policy: if cli.count_all {
            CountingPolicy::Strict
        } else {
            CountingPolicy::Reference
        },
    };
    debug!("configuration: {config:?}");

    let progress = Arc::new(RunProgress::new());
    let validator = FileValidator::new(CommandDetector::new(config.detector));
    let runner = BatchRunner::new(validator, config.policy)
        .with_progress(progress.clone())
        .with_cancel_flag(shutdown_requested.clone());

    let bar = progress_bar(cli.no_progress)?;
    let mut sink = MultiSink::new();
    sink.push(ProgressSink {
        bar: bar.clone(),
        progress,
        inner: ConsoleReporter::stdio(),
    });
    if let Some(ref report_path) = cli.report {
        let file = File::create(report_path)
            .with_context(|| format!("Failed to create report file {}", report_path.display()))?;
        sink.push(JsonReportWriter::new(BufWriter::new(file)));
    }

    let mut interrupted = false;
    let mut fatal_runs = 0;

    if !cli.files.is_empty() {
        interrupted = runner
            .validate_files(&cli.files, &mut sink)
            .context("Failed to write results")?;
    }

    let sources = [
        cli.dir.clone().map(CandidateSource::Directory),
        cli.batch.clone().map(CandidateSource::BatchList),
    ];
    for source in sources.into_iter().flatten() {
        if interrupted {
            break;
        }
        match runner.run(&source, &mut sink) {
            Ok(report) => interrupted = report.interrupted,
            Err(RunError::Output(e)) => return Err(e).context("Failed to write results"),
            Err(e) => {
                // Already reported through the sink; carry on with the next source
                debug!("{source} skipped: {e}");
                fatal_runs += 1;
            }
        }
    }

    bar.finish_and_clear();
    drop(sink);

    if interrupted {
        eprintln!("Graceful shutdown complete");
        process::exit(EXIT_INTERRUPTED);
    }
    if fatal_runs > 0 {
        process::exit(EXIT_FATAL_RUN);
    }
    Ok(())
}
