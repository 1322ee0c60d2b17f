//! Report writing functionality

use serde_json::json;
use std::io::{self, Write};

use crate::core::error::RunError;
use crate::core::validator::{ErrorReason, ValidationOutcome};
use crate::reporting::summary::RunSummary;

/// Receiver of everything a run produces
pub trait OutcomeSink {
    /// One processed file
    fn outcome(&mut self, outcome: &ValidationOutcome) -> io::Result<()>;

    /// End of a directory or batch run
    fn summary(&mut self, source: &str, summary: &RunSummary, interrupted: bool) -> io::Result<()>;

    /// A run that could not be carried out
    fn run_failed(&mut self, error: &RunError) -> io::Result<()>;
}

impl<S: OutcomeSink + ?Sized> OutcomeSink for &mut S {
    fn outcome(&mut self, outcome: &ValidationOutcome) -> io::Result<()> {
        (**self).outcome(outcome)
    }

    fn summary(&mut self, source: &str, summary: &RunSummary, interrupted: bool) -> io::Result<()> {
        (**self).summary(source, summary, interrupted)
    }

    fn run_failed(&mut self, error: &RunError) -> io::Result<()> {
        (**self).run_failed(error)
    }
}

/// Fans every event out to several sinks
#[derive(Default)]
pub struct MultiSink<'a> {
    sinks: Vec<Box<dyn OutcomeSink + 'a>>,
}

impl<'a> MultiSink<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl OutcomeSink + 'a) {
        self.sinks.push(Box::new(sink));
    }
}

impl OutcomeSink for MultiSink<'_> {
    fn outcome(&mut self, outcome: &ValidationOutcome) -> io::Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.outcome(outcome))
    }

    fn summary(&mut self, source: &str, summary: &RunSummary, interrupted: bool) -> io::Result<()> {
        self.sinks
            .iter_mut()
            .try_for_each(|s| s.summary(source, summary, interrupted))
    }

    fn run_failed(&mut self, error: &RunError) -> io::Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.run_failed(error))
    }
}

/// Console line for an outcome and whether it belongs on the error stream
pub fn format_outcome(outcome: &ValidationOutcome) -> (String, bool) {
    match outcome {
        ValidationOutcome::Match {
            path,
            claimed_extension,
            detected_extension,
        } => (
            format!(
                "[OK] {}: extension '{}' matches file type '{}'",
                path.display(),
                claimed_extension,
                detected_extension
            ),
            false,
        ),
        ValidationOutcome::Mismatch {
            path,
            claimed_extension,
            detected_extension,
        } => (
            format!(
                "[MISMATCH] {}: extension is '{}', file type is '{}'",
                path.display(),
                claimed_extension,
                detected_extension
            ),
            false,
        ),
        ValidationOutcome::Unsupported {
            path,
            detected_mime,
        } => (
            format!(
                "[INFO] {}: file type '{}' is not supported",
                path.display(),
                detected_mime
            ),
            false,
        ),
        ValidationOutcome::Error { path, reason } => match reason {
            ErrorReason::Empty => (
                format!("[INFO] {}: empty file cannot be classified", path.display()),
                false,
            ),
            ErrorReason::NoExtension => {
                (format!("[INFO] {}: file has no extension", path.display()), false)
            }
            ErrorReason::Unreadable(detail) => (
                format!("[ERROR] cannot open file '{}': {}", path.display(), detail),
                true,
            ),
            ErrorReason::DetectionFailed(detail) => (
                format!("[INFO] {}: mime detection failed: {}", path.display(), detail),
                false,
            ),
        },
    }
}

/// Human-readable lines on stdout, diagnostics on stderr
pub struct ConsoleReporter<O, E> {
    out: O,
    err: E,
}

impl ConsoleReporter<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> OutcomeSink for ConsoleReporter<O, E> {
    fn outcome(&mut self, outcome: &ValidationOutcome) -> io::Result<()> {
        let (line, to_stderr) = format_outcome(outcome);
        if to_stderr {
            writeln!(self.err, "{line}")
        } else {
            writeln!(self.out, "{line}")
        }
    }

    fn summary(&mut self, _source: &str, summary: &RunSummary, interrupted: bool) -> io::Result<()> {
        if interrupted {
            writeln!(self.out, "{summary} (interrupted)")
        } else {
            writeln!(self.out, "{summary}")
        }
    }

    fn run_failed(&mut self, error: &RunError) -> io::Result<()> {
        writeln!(self.err, "[ERROR] {error}")
    }
}

/// Machine-readable report, one JSON object per line
pub struct JsonReportWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_value(&mut self, value: &serde_json::Value) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        writeln!(self.writer)?;
        self.writer.flush()
    }
}

impl<W: Write> OutcomeSink for JsonReportWriter<W> {
    fn outcome(&mut self, outcome: &ValidationOutcome) -> io::Result<()> {
        let value = serde_json::to_value(outcome)?;
        self.write_value(&value)
    }

    fn summary(&mut self, source: &str, summary: &RunSummary, interrupted: bool) -> io::Result<()> {
        self.write_value(&json!({
            "summary": source,
            "total": summary.total(),
            "matched": summary.matched,
            "mismatched": summary.mismatched,
            "errors": summary.errors,
            "policy": summary.policy(),
            "interrupted": interrupted,
        }))
    }

    fn run_failed(&mut self, error: &RunError) -> io::Result<()> {
        self.write_value(&json!({ "run_failed": error.to_string() }))
    }
}
