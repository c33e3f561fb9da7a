// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use roster_app::{
    FetchCompletion, FetchError, FetchTicket, ListCommand, ListEvent, ListState, ListView,
    RemoteCache, format_count, highlight_segments,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const MOUSE_SCROLL_ROWS: i64 = 3;
const HEADER_ROWS: u16 = 3;
const SEARCH_ROWS: u16 = 3;
const STATUS_ROWS: u16 = 2;
const LIST_BORDER_ROWS: u16 = 2;
const SEARCH_PLACEHOLDER: &str = "Search users...";

pub trait AppRuntime {
    fn run_fetch(&mut self, ticket: FetchTicket) -> FetchCompletion;
    fn spawn_fetch(&mut self, ticket: FetchTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let completion = self.run_fetch(ticket);
        tx.send(InternalEvent::FetchCompleted(completion))
            .map_err(|_| anyhow!("fetch event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    FetchCompleted(FetchCompletion),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    status_line: Option<String>,
    status_token: u64,
    help_visible: bool,
}

/// Rows left for the list body once header, search box, status bar, and the
/// list's own borders are laid out.
pub fn list_viewport_rows(terminal_rows: u16) -> u32 {
    let chrome = HEADER_ROWS + SEARCH_ROWS + STATUS_ROWS + LIST_BORDER_ROWS;
    u32::from(terminal_rows.saturating_sub(chrome)).max(1)
}

pub fn run_app<R: AppRuntime>(
    list: &mut ListState,
    cache: &mut RemoteCache,
    runtime: &mut R,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let size = terminal.size().context("read terminal size")?;
    let now = Instant::now();
    let events = list.dispatch(
        cache,
        ListCommand::Resize {
            viewport_height: list_viewport_rows(size.height),
        },
        now,
    );
    apply_list_events(runtime, &mut view_data, &internal_tx, events);
    let events = list.start(cache, now);
    apply_list_events(runtime, &mut view_data, &internal_tx, events);

    let mut result = Ok(());
    loop {
        process_internal_events(list, cache, runtime, &mut view_data, &internal_tx, &internal_rx);

        let events = list.tick(Instant::now());
        apply_list_events(runtime, &mut view_data, &internal_tx, events);

        if let Err(error) = terminal.draw(|frame| render(frame, list, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let timeout = poll_timeout(list.next_deadline(), Instant::now());
        let has_event = match event::poll(timeout).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        let event = match event::read().context("read event") {
            Ok(event) => event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        let now = Instant::now();
        match event {
            Event::Key(key) => {
                if handle_key_event(list, cache, runtime, &mut view_data, &internal_tx, key, now)
                {
                    break;
                }
            }
            Event::Mouse(mouse) => {
                handle_mouse_event(list, cache, runtime, &mut view_data, &internal_tx, mouse, now);
            }
            Event::Resize(_, rows) => {
                let viewport_height = list_viewport_rows(rows);
                tracing::debug!(viewport_height, "terminal resized");
                let events = list.dispatch(cache, ListCommand::Resize { viewport_height }, now);
                apply_list_events(runtime, &mut view_data, &internal_tx, events);
            }
            _ => {}
        }
    }

    list.teardown();
    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    result
}

fn poll_timeout(deadline: Option<Instant>, now: Instant) -> Duration {
    deadline.map_or(POLL_INTERVAL, |deadline| {
        deadline.saturating_duration_since(now).min(POLL_INTERVAL)
    })
}

fn process_internal_events<R: AppRuntime>(
    list: &mut ListState,
    cache: &mut RemoteCache,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::FetchCompleted(completion) => {
                let events = list.complete_fetch(cache, completion, Instant::now());
                apply_list_events(runtime, view_data, tx, events);
            }
        }
    }
}

fn apply_list_events<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    events: Vec<ListEvent>,
) {
    for event in events {
        match event {
            ListEvent::FetchRequested(ticket) => {
                let fallback = ticket.clone();
                if let Err(error) = runtime.spawn_fetch(ticket, tx.clone()) {
                    let message = format!("{error:#}");
                    tracing::warn!(error = message.as_str(), "fetch could not start");
                    // The consumer is still waiting on this request; fail it so
                    // retry stays available.
                    let _ = tx.send(InternalEvent::FetchCompleted(FetchCompletion {
                        consumer: fallback.consumer,
                        request_id: fallback.request_id,
                        key: fallback.key,
                        result: Err(FetchError::transport(message)),
                    }));
                }
            }
            ListEvent::FetchFailed(message) => {
                emit_status(view_data, tx, format!("load failed: {message}; ctrl+r retries"));
            }
            ListEvent::FetchApplied { users } => {
                tracing::debug!(users, "user list applied");
            }
            ListEvent::QueryApplied(_)
            | ListEvent::DisplayCountChanged(_)
            | ListEvent::LoadMoreScheduled
            | ListEvent::ScrolledToTop => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_line = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    list: &mut ListState,
    cache: &mut RemoteCache,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.help_visible {
        view_data.help_visible = false;
        return false;
    }

    let Some(command) = list_command_for_key(list, key) else {
        if key.code == KeyCode::F(1) {
            view_data.help_visible = true;
        }
        return false;
    };

    if matches!(command, ListCommand::Refresh | ListCommand::Retry) {
        emit_status(view_data, internal_tx, "refreshing users");
    }
    let events = list.dispatch(cache, command, now);
    apply_list_events(runtime, view_data, internal_tx, events);
    false
}

fn list_command_for_key(list: &ListState, key: KeyEvent) -> Option<ListCommand> {
    let item_rows = i64::from(list.viewport().item_height());
    let page_rows = i64::from(list.viewport().viewport_height());

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('r') => Some(ListCommand::Refresh),
            KeyCode::Char('u') => Some(ListCommand::ClearQuery),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('r') if matches!(list.view(), ListView::Error { .. }) => {
            Some(ListCommand::Retry)
        }
        KeyCode::Enter if matches!(list.view(), ListView::Error { .. }) => {
            Some(ListCommand::Retry)
        }
        KeyCode::Char(ch) => {
            let mut query = list.raw_query().to_owned();
            query.push(ch);
            Some(ListCommand::SetQuery(query))
        }
        KeyCode::Backspace => {
            let mut query = list.raw_query().to_owned();
            query.pop()?;
            Some(ListCommand::SetQuery(query))
        }
        KeyCode::Esc if !list.raw_query().is_empty() => Some(ListCommand::ClearQuery),
        KeyCode::Up => Some(ListCommand::ScrollBy(-item_rows)),
        KeyCode::Down => Some(ListCommand::ScrollBy(item_rows)),
        KeyCode::PageUp => Some(ListCommand::ScrollBy(-page_rows)),
        KeyCode::PageDown => Some(ListCommand::ScrollBy(page_rows)),
        KeyCode::Home => Some(ListCommand::ScrollToTop),
        KeyCode::End => Some(ListCommand::ScrollTo(list.viewport().max_position())),
        _ => None,
    }
}

fn handle_mouse_event<R: AppRuntime>(
    list: &mut ListState,
    cache: &mut RemoteCache,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
    now: Instant,
) {
    let delta = match mouse.kind {
        MouseEventKind::ScrollDown => MOUSE_SCROLL_ROWS,
        MouseEventKind::ScrollUp => -MOUSE_SCROLL_ROWS,
        _ => return,
    };
    let events = list.dispatch(cache, ListCommand::ScrollBy(delta), now);
    apply_list_events(runtime, view_data, internal_tx, events);
}

fn render(frame: &mut ratatui::Frame<'_>, list: &ListState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_ROWS),
            Constraint::Length(SEARCH_ROWS),
            Constraint::Min(1),
            Constraint::Length(STATUS_ROWS),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(list))
        .style(Style::default().fg(Color::White))
        .block(Block::default().title("roster").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    render_search(frame, layout[1], list);
    render_body(frame, layout[2], list);

    let status_widget = Paragraph::new(status_text(view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[3]);

    if view_data.help_visible {
        let area = centered_rect(64, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn header_text(list: &ListState) -> String {
    let summary = list.summary();
    let mut text = format!(
        "{} of {} Results",
        format_count(summary.displayed),
        format_count(summary.total)
    );
    if summary.loading {
        text.push_str("  Refreshing...");
    }
    text
}

fn render_search(frame: &mut ratatui::Frame<'_>, area: Rect, list: &ListState) {
    let query = list.raw_query();
    let line = if query.is_empty() {
        Line::from(Span::styled(
            SEARCH_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(query)
    };
    let search = Paragraph::new(line).block(Block::default().title("search").borders(Borders::ALL));
    frame.render_widget(search, area);

    let typed = u16::try_from(query.chars().count()).unwrap_or(u16::MAX);
    let x = area
        .x
        .saturating_add(1)
        .saturating_add(typed)
        .min(area.right().saturating_sub(2));
    frame.set_cursor_position(Position::new(x, area.y.saturating_add(1)));
}

fn render_body(frame: &mut ratatui::Frame<'_>, area: Rect, list: &ListState) {
    let mut block = Block::default().title("users").borders(Borders::ALL);
    if list.is_loading_more() {
        block = block.title_bottom(Line::from("Loading more...").centered());
    }

    let body = match list.view() {
        ListView::Loading => {
            Paragraph::new("Loading users...").style(Style::default().fg(Color::Cyan))
        }
        ListView::Error { message } => Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Error: {message}"),
                Style::default().fg(Color::Red),
            )),
            Line::default(),
            Line::from("press r to retry"),
        ]),
        ListView::Empty => {
            Paragraph::new("No users found").style(Style::default().fg(Color::DarkGray))
        }
        ListView::Items => {
            let height = usize::from(area.height.saturating_sub(LIST_BORDER_ROWS));
            Paragraph::new(list_lines(list, height))
        }
    };
    frame.render_widget(body.block(block), area);
}

/// Lays the windowed rows out relative to the applied (throttled) scroll
/// offset; rows above or below the viewport are clipped.
fn list_lines(list: &ListState, height: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::default(); height];
    let scroll = i64::from(list.viewport().offset());
    let item_rows = list.viewport().item_height();
    let query = list.query();

    for row in list.visible_rows() {
        let top = i64::try_from(row.top).unwrap_or(i64::MAX) - scroll;
        for offset in 0..item_rows {
            let Ok(target) = usize::try_from(top + i64::from(offset)) else {
                continue;
            };
            let Some(slot) = lines.get_mut(target) else {
                break;
            };
            *slot = match offset {
                0 => name_line(&row.user.display_name(), query),
                1 => Line::from(Span::styled(
                    format!("  {}", row.user.email),
                    Style::default().fg(Color::DarkGray),
                )),
                _ => Line::default(),
            };
        }
    }
    lines
}

fn name_line(name: &str, query: &str) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    spans.extend(highlight_segments(name, query).into_iter().map(|segment| {
        let style = if segment.matched {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Span::styled(segment.text.to_owned(), style)
    }));
    Line::from(spans)
}

fn status_text(view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }
    let default = "type to search | esc clear | up/down pgup/pgdn home/end | ctrl+r refresh | F1 help | ctrl+q";
    match &view_data.status_line {
        Some(status) => format!("{status} | {default}"),
        None => default.to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "search: type to filter | backspace delete | esc or ctrl+u clear\n\
scroll: up/down row | pgup/pgdn page | home top | end bottom | mouse wheel\n\
data: ctrl+r refresh | r or enter retry (error view)\n\
global: F1 help | ctrl+q or ctrl+c quit\n\
help: any key close"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
