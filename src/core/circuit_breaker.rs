use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

const CLOSED: u8 = 0;
const OPEN: u8 = 1;
const HALF_OPEN: u8 = 2;

/// Circuit breaker that stops spawning a detector which keeps failing
///
/// States:
/// - CLOSED: detector runs normally
/// - OPEN: too many consecutive failures, calls are refused
/// - HALF_OPEN: cooldown elapsed, the next call is a trial run
pub struct CircuitBreaker {
    state: AtomicU8,
    failure_count: AtomicUsize,
    failure_threshold: usize,
    /// Milliseconds since `epoch` of the most recent failure
    last_failure_ms: AtomicU64,
    cooldown_duration: Duration,
    epoch: Instant,
}

impl CircuitBreaker {
    /// Create a new circuit breaker
    ///
    /// # Arguments
    /// * `failure_threshold` - Consecutive failures before opening (0 disables the breaker)
    /// * `cooldown_duration` - Time to wait before allowing a trial run
    pub fn new(failure_threshold: usize, cooldown_duration: Duration) -> Self {
        Self {
            state: AtomicU8::new(CLOSED),
            failure_count: AtomicUsize::new(0),
            failure_threshold,
            last_failure_ms: AtomicU64::new(0),
            cooldown_duration,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Check if the breaker is refusing calls
    pub fn is_open(&self) -> bool {
        if self.state.load(Ordering::Acquire) != OPEN {
            return false;
        }

        let since_failure = self
            .now_ms()
            .saturating_sub(self.last_failure_ms.load(Ordering::Acquire));
        if u128::from(since_failure) >= self.cooldown_duration.as_millis() {
            self.state.store(HALF_OPEN, Ordering::Release);
            false
        } else {
            true
        }
    }

    /// Record a successful detector run
    pub fn record_success(&self) {
        self.failure_count.store(0, Ordering::Release);
        self.state.store(CLOSED, Ordering::Release);
    }

    /// Record a failed detector run
    ///
    /// Returns `true` when this failure moved the breaker to OPEN.
    pub fn record_failure(&self) -> bool {
        let failures = self.failure_count.fetch_add(1, Ordering::AcqRel) + 1;
        self.last_failure_ms.store(self.now_ms(), Ordering::Release);

        if self.failure_threshold == 0 {
            return false;
        }

        // A failed trial run re-opens immediately
        let was_half_open = self.state.load(Ordering::Acquire) == HALF_OPEN;
        if failures >= self.failure_threshold || was_half_open {
            let previous = self.state.swap(OPEN, Ordering::AcqRel);
            return previous != OPEN;
        }
        false
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count.load(Ordering::Acquire)
    }

    /// Current state as string for logging
    pub fn state_name(&self) -> &'static str {
        match self.state.load(Ordering::Acquire) {
            CLOSED => "CLOSED",
            OPEN => "OPEN",
            HALF_OPEN => "HALF_OPEN",
            _ => "UNKNOWN",
        }
    }
}
