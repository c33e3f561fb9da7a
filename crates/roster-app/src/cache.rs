// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Fetch-once cache keyed by source, with per-consumer cancellation.
//!
//! `RemoteCache` is the shared map; it is constructed once by the host and
//! passed by reference to every consumer. A `FetchConsumer` tracks one
//! caller's view (`data`, `loading`, `error`) and at most one in-flight
//! request. Issuing a new request cancels the consumer's previous one, and
//! only the consumer's newest ticket can mutate its state. Cancellation is
//! scoped to the consumer: another consumer's request for the same key keeps
//! running and still writes the shared map when it succeeds.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::FetchError;
use crate::ids::{ConsumerId, RequestId};
use crate::model::UserPayload;

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub trait Fetcher: Send + Sync {
    fn fetch(&self, key: &str, cancel: &CancelToken) -> Result<UserPayload, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    fn fetch(&self, key: &str, cancel: &CancelToken) -> Result<UserPayload, FetchError> {
        (**self).fetch(key, cancel)
    }
}

#[derive(Debug, Default)]
pub struct RemoteCache {
    entries: HashMap<String, Arc<UserPayload>>,
    next_consumer: i64,
}

impl RemoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consumer(&mut self) -> FetchConsumer {
        self.next_consumer += 1;
        FetchConsumer::new(ConsumerId::new(self.next_consumer))
    }

    pub fn get(&self, key: &str) -> Option<Arc<UserPayload>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, payload: Arc<UserPayload>) {
        self.entries.insert(key.into(), payload);
    }

    pub fn evict(&mut self, key: &str) -> Option<Arc<UserPayload>> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A request handed to the host for execution off the loop thread.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub consumer: ConsumerId,
    pub request_id: RequestId,
    pub key: String,
    pub cancel: CancelToken,
}

#[derive(Debug, Clone)]
pub struct FetchCompletion {
    pub consumer: ConsumerId,
    pub request_id: RequestId,
    pub key: String,
    pub result: Result<UserPayload, FetchError>,
}

/// Runs a ticket to completion. A ticket cancelled before it starts never
/// touches the fetcher; one cancelled while in flight reports `Cancelled`.
pub fn run_ticket<F: Fetcher + ?Sized>(fetcher: &F, ticket: FetchTicket) -> FetchCompletion {
    let result = if ticket.cancel.is_cancelled() {
        Err(FetchError::Cancelled)
    } else {
        match fetcher.fetch(&ticket.key, &ticket.cancel) {
            Ok(_) if ticket.cancel.is_cancelled() => Err(FetchError::Cancelled),
            other => other,
        }
    };

    FetchCompletion {
        consumer: ticket.consumer,
        request_id: ticket.request_id,
        key: ticket.key,
        result,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Applied,
    Failed(FetchError),
    Discarded,
}

#[derive(Debug, Clone)]
struct InFlight {
    request_id: RequestId,
    cancel: CancelToken,
}

#[derive(Debug)]
pub struct FetchConsumer {
    id: ConsumerId,
    next_request: i64,
    in_flight: Option<InFlight>,
    data: Option<Arc<UserPayload>>,
    loading: bool,
    error: Option<String>,
}

impl FetchConsumer {
    fn new(id: ConsumerId) -> Self {
        Self {
            id,
            next_request: 0,
            in_flight: None,
            data: None,
            loading: false,
            error: None,
        }
    }

    pub fn id(&self) -> ConsumerId {
        self.id
    }

    pub fn data(&self) -> Option<&Arc<UserPayload>> {
        self.data.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight.as_ref().map(|in_flight| in_flight.request_id)
    }

    /// Serves `key` from the cache when present, otherwise issues a ticket.
    pub fn load(&mut self, cache: &mut RemoteCache, key: &str) -> Option<FetchTicket> {
        if let Some(payload) = cache.get(key) {
            self.cancel_in_flight();
            self.data = Some(payload);
            self.loading = false;
            self.error = None;
            tracing::debug!(consumer = self.id.get(), key, "served from cache");
            return None;
        }
        Some(self.issue(key))
    }

    /// Drops the cached entry and always issues a fresh ticket.
    pub fn refresh(&mut self, cache: &mut RemoteCache, key: &str) -> FetchTicket {
        cache.evict(key);
        self.issue(key)
    }

    pub fn complete(
        &mut self,
        cache: &mut RemoteCache,
        completion: FetchCompletion,
    ) -> CompletionOutcome {
        let current = self.in_flight.as_ref().is_some_and(|in_flight| {
            completion.consumer == self.id
                && in_flight.request_id == completion.request_id
                && !in_flight.cancel.is_cancelled()
        });
        if !current {
            tracing::debug!(
                consumer = self.id.get(),
                request = completion.request_id.get(),
                "discarded superseded fetch result"
            );
            return CompletionOutcome::Discarded;
        }

        self.in_flight = None;
        self.loading = false;
        match completion.result {
            Ok(payload) => {
                let payload = Arc::new(payload);
                tracing::info!(
                    key = completion.key.as_str(),
                    users = payload.len(),
                    "fetch applied"
                );
                cache.insert(completion.key, Arc::clone(&payload));
                self.data = Some(payload);
                CompletionOutcome::Applied
            }
            Err(error) if error.is_cancelled() => CompletionOutcome::Discarded,
            Err(error) => {
                tracing::warn!(
                    key = completion.key.as_str(),
                    status = error.status(),
                    %error,
                    "fetch failed"
                );
                self.error = Some(error.to_string());
                CompletionOutcome::Failed(error)
            }
        }
    }

    /// Cancels any in-flight request; called when the consumer goes away.
    pub fn teardown(&mut self) {
        self.cancel_in_flight();
        self.loading = false;
    }

    fn issue(&mut self, key: &str) -> FetchTicket {
        self.cancel_in_flight();
        self.next_request += 1;
        let request_id = RequestId::new(self.next_request);
        let cancel = CancelToken::new();
        self.in_flight = Some(InFlight {
            request_id,
            cancel: cancel.clone(),
        });
        self.loading = true;
        self.error = None;
        tracing::debug!(
            consumer = self.id.get(),
            request = request_id.get(),
            key,
            "fetch issued"
        );
        FetchTicket {
            consumer: self.id,
            request_id,
            key: key.to_owned(),
            cancel,
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
        }
    }
}
