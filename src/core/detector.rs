//! Content-type detection through an external `file`-style utility

use log::{debug, warn};
use std::borrow::Cow;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use super::circuit_breaker::CircuitBreaker;
use super::error::DetectorError;
use crate::config::DetectorConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Anything that can report the MIME type of a file
pub trait ContentDetector {
    fn detect_mime(&self, path: &Path) -> Result<String, DetectorError>;
}

impl<D: ContentDetector + ?Sized> ContentDetector for &D {
    fn detect_mime(&self, path: &Path) -> Result<String, DetectorError> {
        (**self).detect_mime(path)
    }
}

/// Parse the first line of detector output (`<path>: <mime-type>`)
///
/// Everything after the last `:` is the MIME type, with exactly one
/// leading space and the line terminator removed.
pub fn parse_detector_output(output: &str) -> Result<String, DetectorError> {
    let malformed = || DetectorError::OutputMalformed {
        output: output.to_string(),
    };

    let line = output.lines().next().unwrap_or("");
    let (_, mime) = line.rsplit_once(':').ok_or_else(malformed)?;
    let mime = mime.strip_prefix(' ').unwrap_or(mime);

    if mime.is_empty() {
        return Err(malformed());
    }
    Ok(mime.to_string())
}

/// Detector backed by a child process, one per call
///
/// Output is captured through a fresh pipe for every invocation, so no
/// state is shared between calls.
pub struct CommandDetector {
    config: DetectorConfig,
    breaker: CircuitBreaker,
}

impl CommandDetector {
    pub fn new(config: DetectorConfig) -> Self {
        let breaker = CircuitBreaker::new(config.failure_threshold, config.cooldown);
        Self { config, breaker }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Spawn the detector and collect its stdout within the configured timeout
    ///
    /// The deadline covers both the child's exit and draining its stdout, since
    /// a background process may keep the pipe open after the child is gone.
    fn run(&self, path: &Path) -> Result<String, DetectorError> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(detector_target(path).as_ref())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DetectorError::Unavailable {
                program: self.config.program.clone(),
                source,
            })?;

        // Drain stdout on a side thread so a chatty child cannot block on a full pipe
        let Some(mut stdout) = child.stdout.take() else {
            reap(&mut child);
            return Err(DetectorError::Io(io::Error::new(
                io::ErrorKind::Other,
                "detector stdout was not captured",
            )));
        };
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = tx.send(stdout.read_to_end(&mut buf).map(|_| buf));
        });

        let deadline = Instant::now() + self.config.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    reap(&mut child);
                    return Err(e.into());
                }
            }
            if Instant::now() >= deadline {
                reap(&mut child);
                return Err(DetectorError::Timeout(self.config.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        let captured = match rx.recv_timeout(remaining) {
            Ok(result) => result?,
            Err(RecvTimeoutError::Timeout) => return Err(DetectorError::Timeout(self.config.timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(DetectorError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    "detector output reader stopped",
                )))
            }
        };

        if !status.success() {
            return Err(DetectorError::Failed { status });
        }
        Ok(String::from_utf8_lossy(&captured).into_owned())
    }
}

/// Path as handed to the detector; a relative path starting with `-`
/// gets a `./` prefix so it is not parsed as an option
fn detector_target(path: &Path) -> Cow<'_, Path> {
    if path.as_os_str().to_string_lossy().starts_with('-') {
        Cow::Owned(Path::new(".").join(path))
    } else {
        Cow::Borrowed(path)
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl ContentDetector for CommandDetector {
    fn detect_mime(&self, path: &Path) -> Result<String, DetectorError> {
        if self.breaker.is_open() {
            return Err(DetectorError::CircuitOpen);
        }

        debug!("running {} on {}", self.config.program, path.display());
        let output = match self.run(path) {
            Ok(output) => {
                self.breaker.record_success();
                output
            }
            Err(e) => {
                if e.is_collaborator_fault() && self.breaker.record_failure() {
                    warn!(
                        "detector '{}' failed {} times in a row, pausing it for {:?}",
                        self.config.program,
                        self.breaker.failure_count(),
                        self.config.cooldown
                    );
                }
                return Err(e);
            }
        };

        let mime = parse_detector_output(&output)?;
        debug!("{}: detected {}", path.display(), mime);
        Ok(mime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_line() {
        assert_eq!(
            parse_detector_output("docs/a.pdf: application/pdf\n").unwrap(),
            "application/pdf"
        );
    }

    #[test]
    fn test_parse_path_with_colon() {
        assert_eq!(
            parse_detector_output("C:/scans/x: y.png: image/png\n").unwrap(),
            "image/png"
        );
    }

    #[test]
    fn test_parse_crlf_and_only_first_line() {
        assert_eq!(
            parse_detector_output("a.gif: image/gif\r\nb.gif: image/png\r\n").unwrap(),
            "image/gif"
        );
    }

    #[test]
    fn test_parse_trims_exactly_one_space() {
        assert_eq!(parse_detector_output("a:  text/html\n").unwrap(), " text/html");
        assert_eq!(parse_detector_output("a:text/html").unwrap(), "text/html");
    }

    #[test]
    fn test_parse_malformed() {
        for bad in ["", "\n", "no separator here\n", "a.pdf: \n", "a.pdf:"] {
            assert!(
                matches!(
                    parse_detector_output(bad),
                    Err(DetectorError::OutputMalformed { .. })
                ),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_dash_prefixed_target() {
        assert_eq!(detector_target(Path::new("-x.pdf")).as_ref(), Path::new("./-x.pdf"));
        assert_eq!(detector_target(Path::new("a/-x.pdf")).as_ref(), Path::new("a/-x.pdf"));
        assert_eq!(detector_target(Path::new("/tmp/-x.pdf")).as_ref(), Path::new("/tmp/-x.pdf"));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let detector = CommandDetector::new(DetectorConfig::with_program(
            "/nonexistent/mime-validator-detector",
        ));
        let err = detector.detect_mime(Path::new("whatever.pdf")).unwrap_err();
        assert!(matches!(err, DetectorError::Unavailable { .. }));
        assert_eq!(detector.breaker().failure_count(), 1);
    }

    #[test]
    fn test_breaker_stops_spawning() {
        let config = DetectorConfig {
            failure_threshold: 2,
            ..DetectorConfig::with_program("/nonexistent/mime-validator-detector")
        };
        let detector = CommandDetector::new(config);
        let path = Path::new("x.png");

        assert!(matches!(detector.detect_mime(path), Err(DetectorError::Unavailable { .. })));
        assert!(matches!(detector.detect_mime(path), Err(DetectorError::Unavailable { .. })));
        assert!(matches!(detector.detect_mime(path), Err(DetectorError::CircuitOpen)));
    }
}
