// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use roster_app::{
    CompletionOutcome, FetchTicket, ListCommand, ListEvent, ListSettings, ListState, ListView,
    RemoteCache, run_ticket,
};
use roster_testkit::{ALI_MATCHES, DEMO_SOURCE, ScriptedFetcher, sample_users};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

fn settings() -> ListSettings {
    ListSettings {
        source: DEMO_SOURCE.to_owned(),
        ..ListSettings::default()
    }
}

fn requested(events: &[ListEvent]) -> Option<FetchTicket> {
    events.iter().find_map(|event| match event {
        ListEvent::FetchRequested(ticket) => Some(ticket.clone()),
        _ => None,
    })
}

fn loaded_state(
    fetcher: &ScriptedFetcher,
    cache: &mut RemoteCache,
    now: Instant,
) -> Result<ListState> {
    let mut state = ListState::new(settings(), cache);
    let events = state.start(cache, now);
    let ticket = requested(&events).ok_or_else(|| anyhow!("initial fetch expected"))?;
    let completion = run_ticket(fetcher, ticket);
    state.complete_fetch(cache, completion, now);
    Ok(state)
}

#[test]
fn search_narrows_fifty_users_to_three() -> Result<()> {
    let now = Instant::now();
    let fetcher = ScriptedFetcher::new(sample_users(50));
    let mut cache = RemoteCache::new();
    let mut state = loaded_state(&fetcher, &mut cache, now)?;

    assert_eq!(state.summary().total, 50);
    assert_eq!(state.summary().displayed, 20);

    state.dispatch(&mut cache, ListCommand::SetQuery("ali".to_owned()), now);
    state.dispatch(
        &mut cache,
        ListCommand::SetQuery("ALI ".to_owned()),
        now + Duration::from_millis(120),
    );
    // Still inside the quiet period of the second keystroke.
    state.tick(now + Duration::from_millis(350));
    assert_eq!(state.filtered_len(), 50);

    let events = state.tick(now + Duration::from_millis(420));
    assert!(
        events
            .iter()
            .any(|event| matches!(event, ListEvent::QueryApplied(query) if query == "ALI "))
    );

    let summary = state.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.displayed, 3.min(state.display_count()));
    let names: Vec<String> = state
        .visible_rows()
        .iter()
        .map(|row| row.user.display_name().into_owned())
        .collect();
    assert_eq!(names, ALI_MATCHES.to_vec());
    assert!(!state.has_more());
    assert_eq!(fetcher.calls(), vec![DEMO_SOURCE.to_owned()]);
    Ok(())
}

#[test]
fn scrolling_near_bottom_runs_exactly_one_load_more_cycle() -> Result<()> {
    let now = Instant::now();
    let fetcher = ScriptedFetcher::new(sample_users(50));
    let mut cache = RemoteCache::new();
    let mut state = loaded_state(&fetcher, &mut cache, now)?;
    assert!(state.has_more());

    // 20 rows * 72 = 1_440; at 790 the bottom is 50 units away.
    let mut scheduled = 0;
    for step in 0..10u64 {
        let at = now + Duration::from_millis(step * 20);
        let mut events = state.dispatch(&mut cache, ListCommand::ScrollTo(790 + step as u32), at);
        events.extend(state.tick(at));
        scheduled += events
            .iter()
            .filter(|event| matches!(event, ListEvent::LoadMoreScheduled))
            .count();
    }
    assert_eq!(scheduled, 1);
    assert!(state.is_loading_more());
    assert_eq!(state.display_count(), 20);

    let events = state.tick(now + Duration::from_millis(300));
    assert!(
        events
            .iter()
            .any(|event| matches!(event, ListEvent::DisplayCountChanged(40)))
    );
    assert_eq!(state.display_count(), 40);
    assert_eq!(state.summary().displayed, 40);
    assert!(!state.is_loading_more());

    state.tick(now + Duration::from_secs(5));
    assert_eq!(state.display_count(), 40);
    Ok(())
}

#[test]
fn superseded_request_never_reaches_the_list() -> Result<()> {
    let fetcher = Arc::new(ScriptedFetcher::new(sample_users(50)));
    let mut cache = RemoteCache::new();
    let mut consumer = cache.consumer();

    let first = consumer
        .load(&mut cache, DEMO_SOURCE)
        .ok_or_else(|| anyhow!("first load should fetch"))?;
    let second = consumer
        .load(&mut cache, DEMO_SOURCE)
        .ok_or_else(|| anyhow!("second load should fetch"))?;

    let (tx, rx) = mpsc::channel();
    for ticket in [second, first] {
        let fetcher = Arc::clone(&fetcher);
        let tx = tx.clone();
        thread::spawn(move || {
            let _ = tx.send(run_ticket(fetcher.as_ref(), ticket));
        });
    }
    drop(tx);

    let mut outcomes = Vec::new();
    for completion in rx {
        outcomes.push(consumer.complete(&mut cache, completion));
    }
    outcomes.sort_by_key(|outcome| matches!(outcome, CompletionOutcome::Applied));
    assert_eq!(
        outcomes,
        vec![CompletionOutcome::Discarded, CompletionOutcome::Applied]
    );
    assert_eq!(fetcher.calls().len(), 1);
    assert_eq!(consumer.data().map(|data| data.len()), Some(50));
    Ok(())
}

#[test]
fn failed_first_load_offers_retry() -> Result<()> {
    let now = Instant::now();
    let fetcher = ScriptedFetcher::new(sample_users(5));
    fetcher.push(Err(roster_app::FetchError::Network { status: 503 }));
    let mut cache = RemoteCache::new();
    let mut state = loaded_state(&fetcher, &mut cache, now)?;

    assert_eq!(
        state.view(),
        ListView::Error {
            message: "HTTP error! status: 503".to_owned()
        }
    );

    let events = state.dispatch(&mut cache, ListCommand::Retry, now);
    let ticket = requested(&events).ok_or_else(|| anyhow!("retry should fetch"))?;
    state.complete_fetch(&mut cache, run_ticket(&fetcher, ticket), now);
    assert_eq!(state.view(), ListView::Items);
    assert_eq!(state.error(), None);
    Ok(())
}
