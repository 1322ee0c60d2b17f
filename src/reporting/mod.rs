//! Console and file reporting

pub mod report_writer;
pub mod summary;

pub use report_writer::{format_outcome, ConsoleReporter, JsonReportWriter, MultiSink, OutcomeSink};
pub use summary::RunSummary;
