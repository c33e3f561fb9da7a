// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Fixed-height list virtualization.
//!
//! Units are whatever the host measures in: pixels for a browser-style
//! surface, terminal rows for the TUI. Every item occupies `item_height`
//! units and is positioned absolutely at `index * item_height`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowInput {
    pub scroll_offset: u32,
    pub viewport_height: u32,
    pub item_height: u32,
    pub buffer: u32,
    pub item_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualWindow {
    pub start: usize,
    pub end: usize,
    pub total_height: u64,
    pub item_height: u32,
}

impl VirtualWindow {
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub const fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    pub const fn item_top(&self, index: usize) -> u64 {
        index as u64 * self.item_height as u64
    }

    /// `(index, top)` for every materialized item.
    pub fn items(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        (self.start..self.end).map(|index| (index, self.item_top(index)))
    }
}

pub fn compute_window(input: WindowInput) -> VirtualWindow {
    let item_height = input.item_height.max(1);
    let item_count = input.item_count;
    let total_height = item_count as u64 * u64::from(item_height);
    if item_count == 0 {
        return VirtualWindow {
            start: 0,
            end: 0,
            total_height,
            item_height,
        };
    }

    let buffer = input.buffer as usize;
    let first_visible = (input.scroll_offset / item_height) as usize;
    let bottom = u64::from(input.scroll_offset) + u64::from(input.viewport_height);
    let last_visible = (bottom / u64::from(item_height)) as usize;

    let end = last_visible.saturating_add(buffer).min(item_count);
    // Offsets past the content would otherwise leave start > end.
    let start = first_visible.saturating_sub(buffer).min(end);

    VirtualWindow {
        start,
        end,
        total_height,
        item_height,
    }
}

/// Largest scroll offset that still fills the viewport.
pub fn max_scroll_offset(total_height: u64, viewport_height: u32) -> u32 {
    let max = total_height.saturating_sub(u64::from(viewport_height));
    u32::try_from(max).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{WindowInput, compute_window, max_scroll_offset};

    fn input(scroll_offset: u32, item_count: usize) -> WindowInput {
        WindowInput {
            scroll_offset,
            viewport_height: 600,
            item_height: 72,
            buffer: 5,
            item_count,
        }
    }

    #[test]
    fn reference_example_matches_formula() {
        let window = compute_window(input(720, 100));
        assert_eq!(window.start, 5);
        assert_eq!(window.end, 23);
        assert_eq!(window.total_height, 7_200);
    }

    #[test]
    fn top_of_list_clamps_start_to_zero() {
        let window = compute_window(input(0, 100));
        assert_eq!(window.start, 0);
        assert_eq!(window.end, 600 / 72 + 5);
    }

    #[test]
    fn end_never_exceeds_item_count() {
        let window = compute_window(input(0, 3));
        assert_eq!((window.start, window.end), (0, 3));
        assert_eq!(window.total_height, 216);
    }

    #[test]
    fn empty_list_has_empty_window() {
        let window = compute_window(input(500, 0));
        assert!(window.is_empty());
        assert_eq!(window.total_height, 0);
        assert_eq!(window.items().count(), 0);
    }

    #[test]
    fn window_invariant_holds_across_inputs() {
        for item_count in [0usize, 1, 2, 7, 20, 100, 1_000] {
            for item_height in [1u32, 3, 72] {
                for viewport_height in [1u32, 10, 600, 5_000] {
                    for buffer in [0u32, 1, 5] {
                        for scroll_offset in [0u32, 1, 71, 720, 10_000, 1_000_000] {
                            let window = compute_window(WindowInput {
                                scroll_offset,
                                viewport_height,
                                item_height,
                                buffer,
                                item_count,
                            });
                            assert!(
                                window.start <= window.end && window.end <= item_count,
                                "bad window {window:?} for offset={scroll_offset} viewport={viewport_height} height={item_height} buffer={buffer} count={item_count}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn items_are_positioned_by_index() {
        let window = compute_window(input(720, 100));
        let tops: Vec<(usize, u64)> = window.items().take(2).collect();
        assert_eq!(tops, vec![(5, 360), (6, 432)]);
        assert!(window.contains(22));
        assert!(!window.contains(23));
    }

    #[test]
    fn zero_item_height_is_treated_as_one_unit() {
        let window = compute_window(WindowInput {
            scroll_offset: 4,
            viewport_height: 3,
            item_height: 0,
            buffer: 0,
            item_count: 10,
        });
        assert_eq!((window.start, window.end), (4, 7));
    }

    #[test]
    fn max_scroll_offset_saturates() {
        assert_eq!(max_scroll_offset(7_200, 600), 6_600);
        assert_eq!(max_scroll_offset(100, 600), 0);
    }
}
