//! Candidate collection and run orchestration

pub mod batch_runner;
pub mod file_scanner;
pub mod progress;

pub use batch_runner::{BatchRunner, RunReport};
pub use file_scanner::{batch_candidates, directory_candidates, Candidate, CandidateSource};
pub use progress::{ProgressSnapshot, RunProgress};
