use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sym::decider::Timeout;

/// Engine configuration, shared read-only across branches.
#[derive(Clone, Debug)]
pub struct Config {
    /// heuristic decisions: the single-candidate shortcut, alias probes
    pub check_timeout: Duration,
    /// per-step probes in the split fold: chunk emptiness, need satisfied
    pub split_timeout: Duration,
    /// counterexample-preserving mode; disables the single-candidate
    /// shortcut, which must answer in one atomic solver decision
    pub counterexamples: bool,
    /// summarization cache toggle
    pub caching: bool,
    /// escape hatch: always consume by summarize-and-assert, never by
    /// splitting the heap
    pub assert_only: bool,
    /// cooperative cancellation of the whole verification run, checked
    /// between solver round-trips
    pub cancel: Arc<AtomicBool>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            check_timeout: Duration::from_millis(100),
            split_timeout: Duration::from_millis(10),
            counterexamples: false,
            caching: true,
            assert_only: false,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Config {
    pub fn heuristic_timeout(&self) -> Timeout {
        Timeout::Bounded(self.check_timeout)
    }

    pub fn step_timeout(&self) -> Timeout {
        Timeout::Bounded(self.split_timeout)
    }

    pub fn canceled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}
