//! Producer liveness
//!
//! When the producer exits, every mapping a reader still holds keeps the last
//! snapshot, signature included. The only sign of its absence is a cycle
//! counter that stops moving, so the host watches for that and reconnects.

use argus_link::PollOutcome;
use std::time::{Duration, Instant};

/// Result of a liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// A new cycle arrived within the limit.
    Fresh,
    /// No new cycle for longer than the limit.
    Stale {
        /// Milliseconds since the last progress.
        age_ms: u64,
    },
}

/// Tracks the time since the producer last published a new cycle.
#[derive(Debug, Clone)]
pub struct CycleWatch {
    limit: Duration,
    last_progress: Instant,
}

impl CycleWatch {
    /// Watch that turns stale after `limit` without progress.
    pub fn new(limit: Duration, now: Instant) -> Self {
        Self {
            limit,
            last_progress: now,
        }
    }

    /// Count `now` as progress (a fresh connection or a delivered cycle).
    pub fn reset(&mut self, now: Instant) {
        self.last_progress = now;
    }

    /// Liveness at `now`.
    pub fn check(&self, now: Instant) -> Liveness {
        let age = now.saturating_duration_since(self.last_progress);
        if age >= self.limit {
            Liveness::Stale {
                age_ms: age.as_millis() as u64,
            }
        } else {
            Liveness::Fresh
        }
    }

    /// Feed one poll result: a delivered cycle resets the watch, anything
    /// else only ages it.
    pub fn observe(&mut self, outcome: &PollOutcome, now: Instant) -> Liveness {
        if outcome.has_new_data() {
            self.reset(now);
        }
        self.check(now)
    }
}
