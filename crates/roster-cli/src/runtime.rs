// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use roster_app::{FetchCompletion, FetchTicket, Fetcher, run_ticket};
use roster_tui::{AppRuntime, InternalEvent};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

/// Runs each fetch on its own worker thread; the result is posted back to
/// the UI loop, which owns every state mutation.
pub struct FetchRuntime<F> {
    fetcher: Arc<F>,
}

impl<F: Fetcher + 'static> FetchRuntime<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }
}

impl<F: Fetcher + 'static> AppRuntime for FetchRuntime<F> {
    fn run_fetch(&mut self, ticket: FetchTicket) -> FetchCompletion {
        run_ticket(self.fetcher.as_ref(), ticket)
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let fetcher = Arc::clone(&self.fetcher);
        tracing::debug!(
            request = ticket.request_id.get(),
            source = ticket.key.as_str(),
            "spawning fetch worker"
        );
        thread::Builder::new()
            .name("roster-fetch".to_owned())
            .spawn(move || {
                let completion = run_ticket(fetcher.as_ref(), ticket);
                if tx.send(InternalEvent::FetchCompleted(completion)).is_err() {
                    tracing::debug!("ui loop closed before fetch completed");
                }
            })
            .context("spawn fetch worker thread")?;
        Ok(())
    }
}
