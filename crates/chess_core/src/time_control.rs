//! Budget for one engine turn: a depth cap, a clock and a stop flag.
//!
//! Clones of a [`TimeControl`] share the flag and the clock, so whoever
//! launches a search on another thread keeps a clone to cancel it. A stop
//! is final: nothing clears the flag, and a search handed an already
//! stopped control returns at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Nodes between two looks at the clock.
const CLOCK_CHECK_INTERVAL: u64 = 256;

#[derive(Debug, Clone)]
pub struct SearchLimits {
    /// Deepest iteration, in plies.
    pub depth: u8,
    pub time_control: TimeControl,
}

impl SearchLimits {
    /// No time limit.
    pub fn depth(depth: u8) -> Self {
        Self {
            depth,
            time_control: TimeControl::new(None),
        }
    }

    pub fn depth_and_time(depth: u8, move_time: Duration) -> Self {
        Self {
            depth,
            time_control: TimeControl::new(Some(move_time)),
        }
    }

    pub fn start(&self) {
        self.time_control.start();
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeControl {
    stopped: Arc<AtomicBool>,
    started: Arc<OnceLock<Instant>>,
    limit: Option<Duration>,
}

impl TimeControl {
    pub fn new(limit: Option<Duration>) -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            started: Arc::new(OnceLock::new()),
            limit,
        }
    }

    /// Starts the clock. Later calls keep the first start time, and the stop
    /// flag is left alone.
    pub fn start(&self) {
        self.started.get_or_init(Instant::now);
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Whether the search must stop. Raises the flag once the limit has
    /// passed; the clock only runs after [`TimeControl::start`].
    pub fn check_time(&self) -> bool {
        if self.is_stopped() {
            return true;
        }
        if let Some(limit) = self.limit
            && let Some(start) = self.started.get()
            && start.elapsed() >= limit
        {
            self.stop();
            return true;
        }
        false
    }

    #[inline]
    pub fn should_check_time(&self, nodes: u64) -> bool {
        nodes.is_multiple_of(CLOCK_CHECK_INTERVAL)
    }
}

#[cfg(test)]
#[path = "time_control_tests.rs"]
mod time_control_tests;
