// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::{CompletionOutcome, FetchCompletion, FetchConsumer, FetchTicket, RemoteCache};
use crate::filter::filter_indices;
use crate::model::{User, UserPayload};
use crate::pagination::{PaginationController, ScrollMetrics};
use crate::text::{clamp_chars, truncate_message};
use crate::timing::Debouncer;
use crate::viewport::{ListViewport, ScrollHandle};
use crate::window::VirtualWindow;

pub const API_URL: &str = "https://mohamed-hashem.github.io/searchable-user-list-db/api.json";
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);
pub const MAX_SEARCH_LENGTH: usize = 100;
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 100;
pub const INITIAL_DISPLAY_COUNT: usize = 20;
pub const LOAD_MORE_COUNT: usize = 20;
pub const LOAD_MORE_DELAY: Duration = Duration::from_millis(300);
pub const ITEM_HEIGHT: u32 = 72;
pub const VISIBLE_HEIGHT: u32 = 600;
pub const BUFFER: u32 = 5;
pub const LOAD_MORE_THRESHOLD: u32 = 100;
pub const SCROLL_THROTTLE_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSettings {
    pub source: String,
    pub item_height: u32,
    pub viewport_height: u32,
    pub buffer: u32,
    pub load_more_threshold: u32,
    pub initial_count: usize,
    pub page_step: usize,
    pub load_more_delay: Duration,
    pub debounce_delay: Duration,
    pub scroll_throttle: Duration,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            source: API_URL.to_owned(),
            item_height: ITEM_HEIGHT,
            viewport_height: VISIBLE_HEIGHT,
            buffer: BUFFER,
            load_more_threshold: LOAD_MORE_THRESHOLD,
            initial_count: INITIAL_DISPLAY_COUNT,
            page_step: LOAD_MORE_COUNT,
            load_more_delay: LOAD_MORE_DELAY,
            debounce_delay: DEBOUNCE_DELAY,
            scroll_throttle: SCROLL_THROTTLE_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    SetQuery(String),
    ClearQuery,
    ScrollTo(u32),
    ScrollBy(i64),
    Resize { viewport_height: u32 },
    ScrollToTop,
    Refresh,
    Retry,
}

#[derive(Debug, Clone)]
pub enum ListEvent {
    FetchRequested(FetchTicket),
    FetchApplied { users: usize },
    FetchFailed(String),
    QueryApplied(String),
    DisplayCountChanged(usize),
    LoadMoreScheduled,
    ScrolledToTop,
}

/// Exactly one of these is on screen below the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Error { message: String },
    Empty,
    Items,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSummary {
    pub displayed: usize,
    pub total: usize,
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow<'a> {
    pub index: usize,
    pub top: u64,
    pub user: &'a User,
}

/// Search-filtered, paginated, virtualized list of users.
///
/// Derived data (the filtered index list and the window) is recomputed
/// eagerly whenever one of its inputs changes: the fetched payload, the
/// debounced query, the display count, the scroll offset, or the viewport.
#[derive(Debug)]
pub struct ListState {
    settings: ListSettings,
    consumer: FetchConsumer,
    raw_query: String,
    query: Debouncer<String>,
    display_count: usize,
    pagination: PaginationController,
    viewport: ListViewport,
    payload: Option<Arc<UserPayload>>,
    filtered: Vec<usize>,
}

impl ListState {
    pub fn new(settings: ListSettings, cache: &mut RemoteCache) -> Self {
        let viewport = ListViewport::new(
            settings.item_height,
            settings.buffer,
            settings.viewport_height,
            settings.scroll_throttle,
        );
        let pagination = PaginationController::new(
            settings.load_more_threshold,
            settings.load_more_delay,
            settings.page_step,
        );
        Self {
            consumer: cache.consumer(),
            raw_query: String::new(),
            query: Debouncer::new(String::new(), settings.debounce_delay),
            display_count: settings.initial_count,
            pagination,
            viewport,
            payload: None,
            filtered: Vec::new(),
            settings,
        }
    }

    /// Initial load: served synchronously from the cache when possible.
    pub fn start(&mut self, cache: &mut RemoteCache, now: Instant) -> Vec<ListEvent> {
        match self.consumer.load(cache, &self.settings.source) {
            Some(ticket) => vec![ListEvent::FetchRequested(ticket)],
            None => {
                self.sync_payload();
                let mut events = vec![ListEvent::FetchApplied {
                    users: self.payload_len(),
                }];
                events.extend(self.fill_viewport(now));
                events
            }
        }
    }

    pub fn dispatch(
        &mut self,
        cache: &mut RemoteCache,
        command: ListCommand,
        now: Instant,
    ) -> Vec<ListEvent> {
        match command {
            ListCommand::SetQuery(text) => self.edit_query(text, now),
            ListCommand::ClearQuery => self.edit_query(String::new(), now),
            ListCommand::ScrollTo(position) => {
                let metrics = self.viewport.scroll_to(position, now);
                self.after_scroll(metrics, now)
            }
            ListCommand::ScrollBy(delta) => {
                let metrics = self.viewport.scroll_by(delta, now);
                self.after_scroll(metrics, now)
            }
            ListCommand::Resize { viewport_height } => {
                self.viewport.resize(viewport_height);
                self.fill_viewport(now)
            }
            ListCommand::ScrollToTop => {
                self.scroll_to_top();
                vec![ListEvent::ScrolledToTop]
            }
            ListCommand::Refresh | ListCommand::Retry => {
                self.scroll_to_top();
                let mut events = vec![ListEvent::ScrolledToTop];
                events.extend(self.reset_display_count());
                let ticket = self.consumer.refresh(cache, &self.settings.source);
                tracing::info!(source = self.settings.source.as_str(), "refresh requested");
                events.push(ListEvent::FetchRequested(ticket));
                events
            }
        }
    }

    /// Fires whatever timers are due: debounced query, trailing scroll, and
    /// the load-more delay.
    pub fn tick(&mut self, now: Instant) -> Vec<ListEvent> {
        let mut events = Vec::new();

        if let Some(query) = self.query.poll(now) {
            tracing::debug!(query = query.as_str(), "query applied");
            events.extend(self.reset_display_count());
            self.refilter();
            self.viewport.scroll_to_top();
            events.push(ListEvent::QueryApplied(query));
            events.extend(self.fill_viewport(now));
        }

        if let Some(metrics) = self.viewport.poll(now) {
            events.extend(self.on_scroll(metrics, now));
        }

        if let Some(step) = self.pagination.poll(now) {
            self.display_count += step;
            tracing::debug!(display_count = self.display_count, "load more applied");
            self.resize_window();
            events.push(ListEvent::DisplayCountChanged(self.display_count));
            events.extend(self.fill_viewport(now));
        }

        events
    }

    pub fn complete_fetch(
        &mut self,
        cache: &mut RemoteCache,
        completion: FetchCompletion,
        now: Instant,
    ) -> Vec<ListEvent> {
        match self.consumer.complete(cache, completion) {
            CompletionOutcome::Applied => {
                self.sync_payload();
                let mut events = vec![ListEvent::FetchApplied {
                    users: self.payload_len(),
                }];
                events.extend(self.fill_viewport(now));
                events
            }
            CompletionOutcome::Failed(error) => vec![ListEvent::FetchFailed(error.to_string())],
            CompletionOutcome::Discarded => Vec::new(),
        }
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.query.next_deadline(),
            self.viewport.next_deadline(),
            self.pagination.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn teardown(&mut self) {
        self.query.cancel();
        self.viewport.teardown();
        self.pagination.cancel();
        self.consumer.teardown();
    }

    pub fn settings(&self) -> &ListSettings {
        &self.settings
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn query(&self) -> &str {
        self.query.value()
    }

    pub fn display_count(&self) -> usize {
        self.display_count
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn displayed_len(&self) -> usize {
        self.filtered.len().min(self.display_count)
    }

    pub fn has_more(&self) -> bool {
        self.display_count < self.filtered.len()
    }

    pub fn is_loading(&self) -> bool {
        self.consumer.loading()
    }

    pub fn is_loading_more(&self) -> bool {
        self.pagination.is_loading_more()
    }

    pub fn error(&self) -> Option<&str> {
        self.consumer.error()
    }

    pub fn viewport(&self) -> &ListViewport {
        &self.viewport
    }

    pub fn window(&self) -> VirtualWindow {
        self.viewport.window()
    }

    pub fn summary(&self) -> ListSummary {
        ListSummary {
            displayed: self.displayed_len(),
            total: self.filtered_len(),
            loading: self.is_loading(),
        }
    }

    pub fn view(&self) -> ListView {
        let data_empty = self.payload.as_ref().is_none_or(|payload| payload.is_empty());
        if let Some(error) = self.consumer.error()
            && data_empty
        {
            return ListView::Error {
                message: truncate_message(error, MAX_ERROR_MESSAGE_LENGTH),
            };
        }
        if self.payload.is_none() {
            return ListView::Loading;
        }
        if self.displayed_len() == 0 {
            return ListView::Empty;
        }
        ListView::Items
    }

    /// Users inside the current window, with their absolute offsets.
    pub fn visible_rows(&self) -> Vec<VisibleRow<'_>> {
        let Some(payload) = &self.payload else {
            return Vec::new();
        };
        self.window()
            .items()
            .filter_map(|(index, top)| {
                let user = payload.users.get(*self.filtered.get(index)?)?;
                Some(VisibleRow { index, top, user })
            })
            .collect()
    }

    fn edit_query(&mut self, text: String, now: Instant) -> Vec<ListEvent> {
        let text = clamp_chars(&text, MAX_SEARCH_LENGTH).to_owned();
        self.query.input(text.clone(), now);
        self.raw_query = text;
        self.reset_display_count()
    }

    fn reset_display_count(&mut self) -> Vec<ListEvent> {
        self.pagination.cancel();
        if self.display_count == self.settings.initial_count {
            return Vec::new();
        }
        self.display_count = self.settings.initial_count;
        self.resize_window();
        vec![ListEvent::DisplayCountChanged(self.display_count)]
    }

    fn scroll_to_top(&mut self) {
        self.viewport.scroll_to_top();
        self.pagination.cancel();
    }

    fn after_scroll(&mut self, metrics: Option<ScrollMetrics>, now: Instant) -> Vec<ListEvent> {
        match metrics {
            Some(metrics) => self.on_scroll(metrics, now),
            None => Vec::new(),
        }
    }

    fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) -> Vec<ListEvent> {
        if self.pagination.on_scroll(metrics, self.has_more(), now) {
            return vec![ListEvent::LoadMoreScheduled];
        }
        Vec::new()
    }

    /// A viewport taller than the loaded rows cannot produce scroll events,
    /// so pagination is re-checked after every geometry change.
    fn fill_viewport(&mut self, now: Instant) -> Vec<ListEvent> {
        if self.payload.is_none() {
            return Vec::new();
        }
        let metrics = self.viewport.metrics();
        self.on_scroll(metrics, now)
    }

    fn sync_payload(&mut self) {
        self.payload = self.consumer.data().cloned();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = match &self.payload {
            Some(payload) => filter_indices(&payload.users, self.query.value()),
            None => Vec::new(),
        };
        self.resize_window();
    }

    fn resize_window(&mut self) {
        self.viewport.set_item_count(self.displayed_len());
    }

    fn payload_len(&self) -> usize {
        self.payload.as_ref().map_or(0, |payload| payload.len())
    }
}
