// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

/// Scroll geometry as observed by the host, in the same units as the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_offset: u32,
    pub scroll_height: u64,
    pub viewport_height: u32,
}

impl ScrollMetrics {
    pub fn distance_from_bottom(&self) -> i64 {
        self.scroll_height as i64 - i64::from(self.scroll_offset) - i64::from(self.viewport_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Idle,
    LoadingMore { due: Instant },
}

#[derive(Debug, Clone)]
pub struct PaginationController {
    threshold: u32,
    delay: Duration,
    step: usize,
    state: PaginationState,
}

impl PaginationController {
    pub fn new(threshold: u32, delay: Duration, step: usize) -> Self {
        Self {
            threshold,
            delay,
            step,
            state: PaginationState::Idle,
        }
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn is_loading_more(&self) -> bool {
        matches!(self.state, PaginationState::LoadingMore { .. })
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            PaginationState::Idle => None,
            PaginationState::LoadingMore { due } => Some(due),
        }
    }

    /// Starts a load-more cycle when the viewport is near the bottom. Returns
    /// whether a cycle was started; repeated calls while one is pending are
    /// no-ops.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, has_more: bool, now: Instant) -> bool {
        if !has_more || self.is_loading_more() {
            return false;
        }
        if metrics.distance_from_bottom() >= i64::from(self.threshold) {
            return false;
        }

        self.state = PaginationState::LoadingMore {
            due: now + self.delay,
        };
        tracing::debug!(
            distance = metrics.distance_from_bottom(),
            "load more scheduled"
        );
        true
    }

    /// Yields the display-count increment once the artificial delay is over.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        match self.state {
            PaginationState::LoadingMore { due } if now >= due => {
                self.state = PaginationState::Idle;
                Some(self.step)
            }
            _ => None,
        }
    }

    /// Forces `Idle`, dropping any pending increment.
    pub fn cancel(&mut self) {
        self.state = PaginationState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::{PaginationController, PaginationState, ScrollMetrics};
    use std::time::{Duration, Instant};

    fn controller() -> PaginationController {
        PaginationController::new(100, Duration::from_millis(300), 20)
    }

    fn near_bottom() -> ScrollMetrics {
        // 1_440 - 790 - 600 = 50
        ScrollMetrics {
            scroll_offset: 790,
            scroll_height: 1_440,
            viewport_height: 600,
        }
    }

    #[test]
    fn triggers_once_and_increments_once() {
        let start = Instant::now();
        let mut pagination = controller();

        assert!(pagination.on_scroll(near_bottom(), true, start));
        assert!(!pagination.on_scroll(near_bottom(), true, start + Duration::from_millis(10)));
        assert_eq!(
            pagination.state(),
            PaginationState::LoadingMore {
                due: start + Duration::from_millis(300)
            }
        );

        assert_eq!(pagination.poll(start + Duration::from_millis(299)), None);
        assert_eq!(pagination.poll(start + Duration::from_millis(300)), Some(20));
        assert_eq!(pagination.poll(start + Duration::from_millis(900)), None);
        assert_eq!(pagination.state(), PaginationState::Idle);
    }

    #[test]
    fn does_not_trigger_without_more_items() {
        let mut pagination = controller();
        assert!(!pagination.on_scroll(near_bottom(), false, Instant::now()));
        assert!(!pagination.is_loading_more());
    }

    #[test]
    fn does_not_trigger_far_from_bottom() {
        let mut pagination = controller();
        let metrics = ScrollMetrics {
            scroll_offset: 0,
            scroll_height: 1_440,
            viewport_height: 600,
        };
        assert!(!pagination.on_scroll(metrics, true, Instant::now()));
        let at_threshold = ScrollMetrics {
            scroll_offset: 740,
            ..metrics
        };
        assert_eq!(at_threshold.distance_from_bottom(), 100);
        assert!(!pagination.on_scroll(at_threshold, true, Instant::now()));
    }

    #[test]
    fn short_content_counts_as_near_bottom() {
        let mut pagination = controller();
        let metrics = ScrollMetrics {
            scroll_offset: 0,
            scroll_height: 144,
            viewport_height: 600,
        };
        assert!(metrics.distance_from_bottom() < 0);
        assert!(pagination.on_scroll(metrics, true, Instant::now()));
    }

    #[test]
    fn cancel_drops_pending_increment() {
        let start = Instant::now();
        let mut pagination = controller();
        pagination.on_scroll(near_bottom(), true, start);
        pagination.cancel();
        assert_eq!(pagination.poll(start + Duration::from_secs(5)), None);
        assert!(pagination.on_scroll(near_bottom(), true, start + Duration::from_secs(5)));
    }
}
