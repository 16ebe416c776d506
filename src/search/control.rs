//! Search control: stop flag, deadline and node budget.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Decides when a search must stop.
///
/// The stop flag and node budget are checked on every call; the wall clock
/// is read every 1024 nodes inside the tree and directly at every root-move
/// boundary. Once any limit trips, the flag latches and all later checks
/// return immediately. The flag doubles as the cancellation token for
/// worker threads.
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    start: Instant,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
}

impl SearchControl {
    pub fn new(deadline: Option<Instant>, node_limit: Option<u64>) -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            start: Instant::now(),
            deadline,
            node_limit,
        }
    }

    /// No deadline, no node budget; stops only on [`stop`](Self::stop).
    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    /// Latch the stop flag.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Has the stop flag been latched?
    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Abort check for the kernel: flag and node budget every call, the
    /// clock every 1024 nodes.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }
        if let Some(limit) = self.node_limit
            && nodes >= limit
        {
            self.stop();
            return true;
        }
        if nodes & 1023 != 0 {
            return false;
        }
        if self.past_deadline() {
            self.stop();
            return true;
        }
        false
    }

    /// Direct deadline check for root-move boundaries and the deepening
    /// loop (no node masking).
    pub fn out_of_time(&self) -> bool {
        if self.past_deadline() {
            self.stop();
            return true;
        }
        false
    }

    /// Is there room for more work between iterations?
    pub fn should_stop_iterating(&self, nodes: u64) -> bool {
        if self.stopped() {
            return true;
        }
        if let Some(limit) = self.node_limit
            && nodes >= limit
        {
            return true;
        }
        self.past_deadline()
    }

    fn past_deadline(&self) -> bool {
        matches!(self.deadline, Some(d) if Instant::now() >= d)
    }

    /// Elapsed time since this control was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
