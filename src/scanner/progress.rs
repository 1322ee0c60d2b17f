//! Progress context shared between a run and its observers

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Point-in-time view of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub source: Option<String>,
    pub processed: usize,
    pub current: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Progress of the run in flight
///
/// Written by the runner, read by anyone holding a clone of the `Arc`
/// through [`RunProgress::snapshot`].
#[derive(Debug, Default)]
pub struct RunProgress {
    processed: AtomicUsize,
    state: Mutex<ProgressState>,
}

#[derive(Debug, Default)]
struct ProgressState {
    source: Option<String>,
    current: Option<PathBuf>,
    started: Option<Instant>,
}

impl RunProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new run
    pub fn begin_run(&self, source: impl Into<String>) {
        self.processed.store(0, Ordering::Release);
        if let Ok(mut state) = self.state.lock() {
            state.source = Some(source.into());
            state.current = None;
            state.started = Some(Instant::now());
        }
    }

    pub fn begin_file(&self, path: PathBuf) {
        if let Ok(mut state) = self.state.lock() {
            state.current = Some(path);
        }
    }

    pub fn finish_file(&self) {
        self.processed.fetch_add(1, Ordering::AcqRel);
        if let Ok(mut state) = self.state.lock() {
            state.current = None;
        }
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let processed = self.processed();
        match self.state.lock() {
            Ok(state) => ProgressSnapshot {
                source: state.source.clone(),
                processed,
                current: state.current.clone(),
                elapsed: state.started.map(|s| s.elapsed()).unwrap_or_default(),
            },
            Err(_) => ProgressSnapshot {
                source: None,
                processed,
                current: None,
                elapsed: Duration::ZERO,
            },
        }
    }
}
