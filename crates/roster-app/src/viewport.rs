// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

use crate::pagination::ScrollMetrics;
use crate::timing::Throttler;
use crate::window::{VirtualWindow, WindowInput, compute_window, max_scroll_offset};

/// Capability a list hands to its owner so the owner can reset scrolling
/// without reaching into the list's internals.
pub trait ScrollHandle {
    fn scroll_to_top(&mut self);
}

/// Scroll state of the virtualized list.
///
/// `position` is where the host is actually scrolled and moves on every
/// event. `offset` is the throttled copy the window is computed from; it
/// trails `position` by at most one throttle interval and the buffer rows
/// hide the difference.
#[derive(Debug, Clone)]
pub struct ListViewport {
    item_height: u32,
    buffer: u32,
    viewport_height: u32,
    item_count: usize,
    position: u32,
    offset: u32,
    throttler: Throttler<u32>,
    window: VirtualWindow,
}

impl ListViewport {
    pub fn new(item_height: u32, buffer: u32, viewport_height: u32, throttle: Duration) -> Self {
        let mut viewport = Self {
            item_height: item_height.max(1),
            buffer,
            viewport_height,
            item_count: 0,
            position: 0,
            offset: 0,
            throttler: Throttler::new(throttle),
            window: VirtualWindow::default(),
        };
        viewport.recompute();
        viewport
    }

    pub fn item_height(&self) -> u32 {
        self.item_height
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn window(&self) -> VirtualWindow {
        self.window
    }

    pub fn total_height(&self) -> u64 {
        self.window.total_height
    }

    pub fn max_position(&self) -> u32 {
        max_scroll_offset(self.total_height(), self.viewport_height)
    }

    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_offset: self.offset,
            scroll_height: self.total_height(),
            viewport_height: self.viewport_height,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.throttler.next_deadline()
    }

    /// Moves the host scroll position. Returns the metrics to act on when the
    /// throttle lets this event through immediately.
    pub fn scroll_to(&mut self, position: u32, now: Instant) -> Option<ScrollMetrics> {
        self.position = position.min(self.max_position());
        let position = self.throttler.call(self.position, now)?;
        Some(self.apply(position))
    }

    pub fn scroll_by(&mut self, delta: i64, now: Instant) -> Option<ScrollMetrics> {
        let target = (i64::from(self.position) + delta).clamp(0, i64::from(u32::MAX));
        self.scroll_to(u32::try_from(target).unwrap_or(u32::MAX), now)
    }

    /// Runs the trailing throttled scroll once it is due.
    pub fn poll(&mut self, now: Instant) -> Option<ScrollMetrics> {
        let position = self.throttler.poll(now)?;
        Some(self.apply(position))
    }

    /// Viewport height changed (terminal resize). Applied without throttling.
    pub fn resize(&mut self, viewport_height: u32) {
        if viewport_height == self.viewport_height {
            return;
        }
        tracing::debug!(
            from = self.viewport_height,
            to = viewport_height,
            "viewport resized"
        );
        self.viewport_height = viewport_height;
        self.clamp_positions();
        self.recompute();
    }

    /// Number of materializable items changed (data, filter, or page size).
    pub fn set_item_count(&mut self, item_count: usize) {
        if item_count == self.item_count {
            return;
        }
        self.item_count = item_count;
        self.recompute();
        self.clamp_positions();
        self.recompute();
    }

    pub fn teardown(&mut self) {
        self.throttler.cancel();
    }

    fn apply(&mut self, position: u32) -> ScrollMetrics {
        self.offset = position.min(self.max_position());
        self.recompute();
        self.metrics()
    }

    fn clamp_positions(&mut self) {
        let max = self.max_position();
        self.position = self.position.min(max);
        self.offset = self.offset.min(max);
    }

    fn recompute(&mut self) {
        self.window = compute_window(WindowInput {
            scroll_offset: self.offset,
            viewport_height: self.viewport_height,
            item_height: self.item_height,
            buffer: self.buffer,
            item_count: self.item_count,
        });
    }
}

impl ScrollHandle for ListViewport {
    fn scroll_to_top(&mut self) {
        self.throttler.cancel();
        self.position = 0;
        self.offset = 0;
        self.recompute();
    }
}
