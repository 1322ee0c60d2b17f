//! Candidate file collection for directory and batch runs

use log::warn;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::error::RunError;

/// Where a directory or batch run gets its candidate paths from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// Every entry of one directory, dotfiles included, without recursion
    Directory(PathBuf),
    /// A text file with one path per line
    BatchList(PathBuf),
}

impl CandidateSource {
    pub fn path(&self) -> &Path {
        match self {
            CandidateSource::Directory(path) | CandidateSource::BatchList(path) => path,
        }
    }

    /// Open the source and return a lazy, ordered sequence of candidates
    pub fn candidates(&self) -> Result<Candidates, RunError> {
        match self {
            CandidateSource::Directory(dir) => directory_candidates(dir),
            CandidateSource::BatchList(list) => batch_candidates(list),
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::Directory(path) => write!(f, "directory '{}'", path.display()),
            CandidateSource::BatchList(path) => write!(f, "batch file '{}'", path.display()),
        }
    }
}

/// One entry produced by a candidate source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Path(PathBuf),
    /// The source named an entry but could not stat it
    Unreadable { path: PathBuf, detail: String },
}

/// Lazy iterator over the candidates of a run
pub enum Candidates {
    Directory(walkdir::IntoIter),
    Batch(BatchLines),
}

impl Iterator for Candidates {
    type Item = Result<Candidate, RunError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Candidates::Directory(entries) => entries.next().map(|entry| {
                Ok(match entry {
                    Ok(entry) => Candidate::Path(entry.into_path()),
                    Err(e) => {
                        warn!("skipping directory entry: {e}");
                        let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                        Candidate::Unreadable {
                            path,
                            detail: e.to_string(),
                        }
                    }
                })
            }),
            Candidates::Batch(lines) => lines.next(),
        }
    }
}

/// Enumerate the entries of a directory, sorted by file name
///
/// Subdirectories are yielded too; they fail the readability check later.
///
/// # Arguments
/// * `dir` - Directory to enumerate
pub fn directory_candidates(dir: &Path) -> Result<Candidates, RunError> {
    // Surface an unreadable root up front as a fatal error
    fs::read_dir(dir).map_err(|source| RunError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();
    Ok(Candidates::Directory(walker))
}

/// Read candidate paths from a batch list, one per line
///
/// Line terminators (`\n` or `\r\n`) are stripped and blank lines skipped.
///
/// # Arguments
/// * `list` - Path to the batch list
pub fn batch_candidates(list: &Path) -> Result<Candidates, RunError> {
    let file = File::open(list).map_err(|source| RunError::BatchFileUnreadable {
        path: list.to_path_buf(),
        source,
    })?;
    Ok(Candidates::Batch(BatchLines {
        list: list.to_path_buf(),
        reader: BufReader::new(file),
        failed: false,
    }))
}

/// Line reader behind [`batch_candidates`]
pub struct BatchLines {
    list: PathBuf,
    reader: BufReader<File>,
    failed: bool,
}

impl BatchLines {
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }
}

impl Iterator for BatchLines {
    type Item = Result<Candidate, RunError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            match self.read_line() {
                Ok(None) => return None,
                Ok(Some(line)) if line.iter().all(u8::is_ascii_whitespace) => continue,
                Ok(Some(line)) => return Some(Ok(Candidate::Path(path_from_bytes(line)))),
                Err(source) => {
                    self.failed = true;
                    return Some(Err(RunError::BatchFileRead {
                        path: self.list.clone(),
                        source,
                    }));
                }
            }
        }
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}
