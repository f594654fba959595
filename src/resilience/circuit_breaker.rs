//! Circuit breaker guarding the generative service.
//!
//! # States
//! - Closed: `now >= lockout_until`, calls pass through
//! - Open: `now < lockout_until`, calls fail fast with a cooldown error
//!
//! # State Transitions
//! ```text
//! Closed → Open: retry budget exhausted on rate limiting (trip)
//! Open → Closed: deadline passes (no half-open trial, no explicit reset)
//! ```
//!
//! # Design Decisions
//! - One deadline for the whole process, not a failure counter: the only
//!   failure that trips it is provider rate limiting, which is bursty
//! - The deadline lives in the key-value store so it survives restarts
//! - A second trip overwrites the deadline rather than extending it

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::observability::metrics;
use crate::storage::{KvStore, LOCKOUT_KEY};

/// Process-wide lockout deadline.
#[derive(Clone)]
pub struct CircuitBreaker {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl CircuitBreaker {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Stored deadline in epoch milliseconds; `0` when absent or malformed.
    pub fn lockout_until(&self) -> u64 {
        self.store
            .get(LOCKOUT_KEY)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0)
    }

    pub fn is_open(&self) -> bool {
        self.clock.now_ms() < self.lockout_until()
    }

    /// Time left until the breaker closes again.
    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.lockout_until().saturating_sub(self.clock.now_ms()))
    }

    /// Open the breaker for `duration` from now.
    pub fn trip(&self, duration: Duration) {
        let until = self.clock.now_ms().saturating_add(duration.as_millis() as u64);
        if let Err(e) = self.store.set(LOCKOUT_KEY, until.to_string()) {
            // The in-process view still reads from the store, so a failed write
            // means the breaker stays closed.
            tracing::warn!(error = %e, "Failed to persist circuit lockout");
            return;
        }
        metrics::record_breaker_trip();
        tracing::debug!(lockout_until = until, "Circuit breaker opened");
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("lockout_until", &self.lockout_until())
            .finish()
    }
}
