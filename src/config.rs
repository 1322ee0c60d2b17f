//! Runtime configuration for the validator

use serde::Serialize;
use std::time::Duration;

/// Default detector executable
pub const DEFAULT_DETECTOR: &str = "file";

/// Option asking the detector for MIME-type-only output
pub const MIME_TYPE_FLAG: &str = "--mime-type";

/// How outcomes that are neither a match nor a mismatch feed the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingPolicy {
    /// Only unreadable files count as errors. Empty files, missing
    /// extensions, detector failures and unsupported types are reported
    /// but left out of the tally.
    #[default]
    Reference,
    /// Every outcome other than match/mismatch counts as an error, so the
    /// total equals the number of files visited.
    Strict,
}

/// Settings for the external content-type detector
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
    /// Consecutive launch failures or timeouts before the detector is disabled
    pub failure_threshold: usize,
    pub cooldown: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_DETECTOR.to_string(),
            args: vec![MIME_TYPE_FLAG.to_string()],
            timeout: Duration::from_secs(10),
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
        }
    }
}

impl DetectorConfig {
    /// Detector config for a different executable, keeping the default flags
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }
}

/// Top-level validator configuration
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfig {
    pub detector: DetectorConfig,
    pub policy: CountingPolicy,
}
