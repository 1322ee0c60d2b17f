//! MIME Validator Library
//!
//! Checks that the extension of a file matches the content type reported by
//! an external detector such as `file --mime-type`.

pub mod config;
pub mod core;
pub mod reporting;
pub mod scanner;

pub use crate::core::validator;
pub use crate::reporting::report_writer;
pub use crate::scanner::file_scanner;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{CountingPolicy, DetectorConfig, ValidatorConfig};
    pub use crate::core::{
        extract_extension, parse_detector_output, reconcile, Classification, CommandDetector,
        ContentDetector, DetectorError, ErrorReason, ExtensionError, FileValidator, RunError,
        SupportedType, TypeTable, ValidationOutcome,
    };
    pub use crate::reporting::{ConsoleReporter, JsonReportWriter, MultiSink, OutcomeSink, RunSummary};
    pub use crate::scanner::{BatchRunner, CandidateSource, ProgressSnapshot, RunProgress, RunReport};
}
