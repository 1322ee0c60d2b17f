//! Error types for the validation pipeline

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Failure to derive a claimed extension from a path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    #[error("file name has no extension")]
    NoExtension,
}

/// Failure of the external content-type detector
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("cannot launch detector '{program}': {source}")]
    Unavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("detector exited with {status}")]
    Failed { status: ExitStatus },

    #[error("detector output is malformed: {output:?}")]
    OutputMalformed { output: String },

    #[error("detector did not finish within {0:?}")]
    Timeout(Duration),

    #[error("detector disabled after repeated failures")]
    CircuitOpen,

    #[error("I/O error while running detector: {0}")]
    Io(#[from] io::Error),
}

impl DetectorError {
    /// Whether this failure says something about the detector itself rather
    /// than about the file being inspected
    pub fn is_collaborator_fault(&self) -> bool {
        matches!(self, DetectorError::Unavailable { .. } | DetectorError::Timeout(_))
    }
}

/// Fatal errors that abort a whole directory or batch run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot open directory '{}': {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open batch file '{}': {source}", .path.display())]
    BatchFileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading batch file '{}': {source}", .path.display())]
    BatchFileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write report output: {0}")]
    Output(#[from] io::Error),
}
