//! Sequential validation runs over files, directories and batch lists

use log::info;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::file_scanner::{Candidate, CandidateSource};
use super::progress::RunProgress;
use crate::config::CountingPolicy;
use crate::core::detector::ContentDetector;
use crate::core::error::RunError;
use crate::core::validator::{ErrorReason, FileValidator, ValidationOutcome};
use crate::reporting::report_writer::OutcomeSink;
use crate::reporting::summary::RunSummary;

/// Result of a completed (or aborted) directory/batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub summary: RunSummary,
    pub interrupted: bool,
}

/// Drives a [`FileValidator`] over a sequence of paths, one at a time
pub struct BatchRunner<'t, D> {
    validator: FileValidator<'t, D>,
    policy: CountingPolicy,
    progress: Arc<RunProgress>,
    cancel: Arc<AtomicBool>,
}

impl<'t, D: ContentDetector> BatchRunner<'t, D> {
    pub fn new(validator: FileValidator<'t, D>, policy: CountingPolicy) -> Self {
        Self {
            validator,
            policy,
            progress: Arc::new(RunProgress::new()),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an externally observed progress context
    pub fn with_progress(mut self, progress: Arc<RunProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Abort flag, checked between files
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn progress(&self) -> &Arc<RunProgress> {
        &self.progress
    }

    pub fn validator(&self) -> &FileValidator<'t, D> {
        &self.validator
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn process(&self, path: &Path, sink: &mut dyn OutcomeSink) -> Result<ValidationOutcome, RunError> {
        self.progress.begin_file(path.to_path_buf());
        let outcome = self.validator.validate(path);
        sink.outcome(&outcome)?;
        self.progress.finish_file();
        Ok(outcome)
    }

    /// Validate ad-hoc files; no summary is produced for these
    ///
    /// # Returns
    /// `true` if the abort flag stopped processing early
    pub fn validate_files<I, P>(&self, paths: I, sink: &mut dyn OutcomeSink) -> Result<bool, RunError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.progress.begin_run("files");
        for path in paths {
            if self.cancelled() {
                return Ok(true);
            }
            self.process(path.as_ref(), sink)?;
        }
        Ok(false)
    }

    /// Validate every candidate of a directory or batch list and summarize
    ///
    /// Fatal errors (source cannot be opened or read) are reported to the
    /// sink and returned; per-file problems are outcomes and never stop the run.
    pub fn run(&self, source: &CandidateSource, sink: &mut dyn OutcomeSink) -> Result<RunReport, RunError> {
        let label = source.to_string();
        let candidates = match source.candidates() {
            Ok(candidates) => candidates,
            Err(e) => {
                sink.run_failed(&e)?;
                return Err(e);
            }
        };

        info!("validating {label}");
        self.progress.begin_run(label.clone());
        let mut summary = RunSummary::new(self.policy);
        let mut interrupted = false;

        for candidate in candidates {
            if self.cancelled() {
                interrupted = true;
                break;
            }

            let outcome = match candidate {
                Ok(Candidate::Path(path)) => self.process(&path, sink)?,
                Ok(Candidate::Unreadable { path, detail }) => {
                    let outcome = ValidationOutcome::Error {
                        path,
                        reason: ErrorReason::Unreadable(detail),
                    };
                    sink.outcome(&outcome)?;
                    self.progress.finish_file();
                    outcome
                }
                Err(e) => {
                    sink.run_failed(&e)?;
                    return Err(e);
                }
            };
            summary.record(&outcome);
        }

        sink.summary(&label, &summary, interrupted)?;
        info!(
            "finished {label}: {} matched, {} mismatched, {} errors{}",
            summary.matched,
            summary.mismatched,
            summary.errors,
            if interrupted { " (interrupted)" } else { "" }
        );
        Ok(RunReport { summary, interrupted })
    }

    /// Convenience for a directory run
    pub fn run_directory(&self, dir: impl Into<PathBuf>, sink: &mut dyn OutcomeSink) -> Result<RunReport, RunError> {
        self.run(&CandidateSource::Directory(dir.into()), sink)
    }

    /// Convenience for a batch-list run
    pub fn run_batch(&self, list: impl Into<PathBuf>, sink: &mut dyn OutcomeSink) -> Result<RunReport, RunError> {
        self.run(&CandidateSource::BatchList(list.into()), sink)
    }
}
