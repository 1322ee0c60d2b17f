//! Per-run outcome tally

use serde::Serialize;
use std::fmt;

use crate::config::CountingPolicy;
use crate::core::validator::{ErrorReason, ValidationOutcome};

/// Counters for one directory or batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub matched: usize,
    pub mismatched: usize,
    pub errors: usize,
    policy: CountingPolicy,
}

impl RunSummary {
    pub fn new(policy: CountingPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Add one outcome to the tally
    ///
    /// Under [`CountingPolicy::Reference`] only unreadable files count as
    /// errors; unsupported types, empty files, missing extensions and
    /// detector failures leave every counter untouched.
    pub fn record(&mut self, outcome: &ValidationOutcome) {
        match outcome {
            ValidationOutcome::Match { .. } => self.matched += 1,
            ValidationOutcome::Mismatch { .. } => self.mismatched += 1,
            ValidationOutcome::Error {
                reason: ErrorReason::Unreadable(_),
                ..
            } => self.errors += 1,
            ValidationOutcome::Error { .. } | ValidationOutcome::Unsupported { .. } => {
                if self.policy == CountingPolicy::Strict {
                    self.errors += 1;
                }
            }
        }
    }

    /// Files counted as analyzed
    ///
    /// The reference tally counts classified files only, so unreadable files
    /// show up under `errors` without adding to the total. Strict counting
    /// includes them.
    pub fn total(&self) -> usize {
        match self.policy {
            CountingPolicy::Reference => self.matched + self.mismatched,
            CountingPolicy::Strict => self.matched + self.mismatched + self.errors,
        }
    }

    pub fn policy(&self) -> CountingPolicy {
        self.policy
    }

    /// Single `[SUMMARY]` line
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[SUMMARY] files analyzed: {}; files OK: {}; mismatches: {}; errors: {}",
            self.total(),
            self.matched,
            self.mismatched,
            self.errors
        )
    }
}
