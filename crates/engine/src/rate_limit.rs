// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Per-provider token bucket (§5 "Rate limiting"). Acquisition is
//! non-blocking: an exhausted bucket is reported immediately so the
//! caller can mark the stage `Policy` and defer to the next walk,
//! rather than stalling a worker.

use memo_core::Clock;
use parking_lot::Mutex;
use std::time::Instant;

struct State {
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter<C: Clock> {
    capacity: f64,
    refill_per_ms: f64,
    state: Mutex<State>,
    _clock: std::marker::PhantomData<C>,
}

impl<C: Clock> RateLimiter<C> {
    pub fn new(requests_per_minute: u32, clock: &C) -> Self {
        let capacity = requests_per_minute.max(1) as f64;
        Self {
            capacity,
            refill_per_ms: capacity / 60_000.0,
            state: Mutex::new(State { tokens: capacity, last_refill: clock.now() }),
            _clock: std::marker::PhantomData,
        }
    }

    /// Attempts to take one token, refilling for elapsed time first.
    pub fn try_acquire(&self, clock: &C) -> bool {
        let now = clock.now();
        let mut state = self.state.lock();
        let elapsed_ms = now.saturating_duration_since(state.last_refill).as_millis() as f64;
        state.tokens = (state.tokens + elapsed_ms * self.refill_per_ms).min(self.capacity);
        state.last_refill = now;
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;
