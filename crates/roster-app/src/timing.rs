// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Deadline-driven debounce and throttle primitives.
//!
//! Nothing here sleeps or spawns. The owning event loop passes the current
//! `Instant` in and calls `poll` once a returned deadline has passed, which
//! keeps every state change on the loop thread and makes the timing fully
//! deterministic under test.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending<T> {
    value: T,
    due: Instant,
}

/// Mirrors an input value once it has stopped changing for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    value: T,
    pending: Option<Pending<T>>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            value: initial,
            pending: None,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn input(&mut self, value: T, now: Instant) {
        if self.pending.is_none() && value == self.value {
            return;
        }
        self.pending = Some(Pending {
            value,
            due: now + self.delay,
        });
    }

    /// Returns the new value when the quiet period has elapsed and it differs
    /// from the last propagated one.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self.pending.as_ref()?.due;
        if now < due {
            return None;
        }
        let Pending { value, .. } = self.pending.take()?;
        if value == self.value {
            return None;
        }
        self.value = value.clone();
        Some(value)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending update without propagating it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Trailing-edge throttle: at most one run per `delay`, and the latest
/// arguments seen during a wait are the ones that eventually run.
#[derive(Debug, Clone)]
pub struct Throttler<A> {
    delay: Duration,
    last_run: Option<Instant>,
    pending: Option<Pending<A>>,
}

impl<A> Throttler<A> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_run: None,
            pending: None,
        }
    }

    /// Returns `Some(args)` when the caller should run now. Otherwise the
    /// arguments are parked as the single trailing call.
    pub fn call(&mut self, args: A, now: Instant) -> Option<A> {
        let elapsed = self
            .last_run
            .map(|last| now.saturating_duration_since(last));

        match elapsed {
            Some(elapsed) if elapsed < self.delay => {
                match &mut self.pending {
                    Some(pending) => pending.value = args,
                    None => {
                        self.pending = Some(Pending {
                            value: args,
                            due: now + (self.delay - elapsed),
                        });
                    }
                }
                None
            }
            _ => {
                // A leading run supersedes anything still parked.
                self.pending = None;
                self.last_run = Some(now);
                Some(args)
            }
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<A> {
        let due = self.pending.as_ref()?.due;
        if now < due {
            return None;
        }
        let pending = self.pending.take()?;
        self.last_run = Some(now);
        Some(pending.value)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Releases the trailing call without invoking it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
