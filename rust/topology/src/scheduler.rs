// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time-budgeted wall rebuilds.
//!
//! A pass walks the dirty levels in view in creation order and rebuilds them
//! one at a time. The clock is read once at the start of the pass and after
//! each rebuild; when the budget is spent and levels remain, the pass stops
//! and asks to be resumed after the retry delay. A level is never left half
//! rebuilt.

use std::time::{Duration, Instant};

use geo::Rect;

use crate::engine::TopologyEngine;
use crate::error::Result;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// How a rebuild pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// No dirty level remains in view
    Complete { rebuilt: usize },
    /// The budget ran out; call again after `retry_after`
    Deferred { rebuilt: usize, retry_after: Duration },
}

#[derive(Debug)]
pub struct RebuildScheduler<C: Clock = SystemClock> {
    clock: C,
    next_pass_at: Option<Instant>,
}

impl Default for RebuildScheduler<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> RebuildScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            next_pass_at: None,
        }
    }

    /// Whether a deferred pass is waiting.
    pub fn pending(&self) -> bool {
        self.next_pass_at.is_some()
    }

    /// Whether the deferred pass, if any, is due at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_pass_at.is_some_and(|at| now >= at)
    }

    /// Run one pass over the dirty levels of `number` within `extent`.
    pub fn run_pass(
        &mut self,
        engine: &mut TopologyEngine,
        number: i32,
        extent: &Rect<f64>,
    ) -> Result<PassOutcome> {
        let started = self.clock.now();
        let budget = engine.config().rebuild_budget;
        let dirty = engine.dirty_levels(number, extent);
        let total = dirty.len();
        self.next_pass_at = None;

        for (done, key) in dirty.into_iter().enumerate() {
            engine.rebuild_level(key)?;

            let remaining = total - done - 1;
            if remaining > 0 {
                let now = self.clock.now();
                if now.duration_since(started) > budget {
                    let retry_after = engine.config().retry_delay;
                    self.next_pass_at = Some(now + retry_after);
                    tracing::debug!(
                        number,
                        rebuilt = done + 1,
                        remaining,
                        "Rebuild budget exceeded, deferring"
                    );
                    return Ok(PassOutcome::Deferred {
                        rebuilt: done + 1,
                        retry_after,
                    });
                }
            }
        }

        Ok(PassOutcome::Complete { rebuilt: total })
    }

    /// Run the deferred pass if it is due.
    pub fn poll(
        &mut self,
        engine: &mut TopologyEngine,
        number: i32,
        extent: &Rect<f64>,
    ) -> Result<Option<PassOutcome>> {
        if !self.is_due(self.clock.now()) {
            return Ok(None);
        }
        self.run_pass(engine, number, extent).map(Some)
    }
}
