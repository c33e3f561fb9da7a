// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use roster_app::{CancelToken, FetchError, Fetcher, User, UserId, UserPayload};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

pub const DEMO_SOURCE: &str = "demo://users";

const FIRST_NAMES: [&str; 10] = [
    "Brenda", "Carlos", "Diego", "Elena", "Fiona", "George", "Hannah", "Ivan", "Julia", "Kevin",
];

const LAST_NAMES: [&str; 5] = ["Baker", "Cooper", "Dunn", "Evans", "Foster"];

/// Names planted in the sample set that contain "ali" (case-insensitive);
/// no generated name does.
pub const ALI_MATCHES: [&str; 3] = ["Alice Smith", "Kalina Ortiz", "Rosalie Park"];

/// Deterministic sample directory. Records alternate between the
/// `name` field and split first/last fields so display-name assembly is
/// exercised, and three records match the query "ali".
pub fn sample_users(count: usize) -> UserPayload {
    let users = (0..count)
        .map(|index| {
            let id = UserId::new(index as i64 + 1);
            match index {
                3 => full_name(id, ALI_MATCHES[0]),
                17 => split_name(id, "Kalina", "Ortiz"),
                41 => split_name(id, "Rosalie", "Park"),
                _ => generated(id, index),
            }
        })
        .collect();
    UserPayload::new(users)
}

fn generated(id: UserId, index: usize) -> User {
    let first = FIRST_NAMES[index % FIRST_NAMES.len()];
    let last = LAST_NAMES[(index / FIRST_NAMES.len()) % LAST_NAMES.len()];
    let mut user = match index % 4 {
        0 => full_name(id, &format!("{first} {last}")),
        1 => User {
            last_name: None,
            ..split_name(id, first, last)
        },
        _ => split_name(id, first, last),
    };
    if index >= FIRST_NAMES.len() * LAST_NAMES.len() {
        // Past the unique combinations, suffix with a number so names stay distinct.
        user.last_name = Some(format!("{last}{index}"));
        user.name = user.name.map(|name| format!("{name}{index}"));
    }
    user
}

fn full_name(id: UserId, name: &str) -> User {
    User {
        id,
        name: Some(name.to_owned()),
        first_name: None,
        last_name: None,
        email: email_for(name, id),
    }
}

fn split_name(id: UserId, first: &str, last: &str) -> User {
    User {
        id,
        name: None,
        first_name: Some(first.to_owned()),
        last_name: Some(last.to_owned()),
        email: email_for(&format!("{first}.{last}"), id),
    }
}

fn email_for(name: &str, id: UserId) -> String {
    let local: String = name
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '.')
        .collect::<String>()
        .to_ascii_lowercase();
    format!("{local}{}@example.com", id.get())
}

/// Fetcher that replays queued results, falling back to a default payload.
#[derive(Debug)]
pub struct ScriptedFetcher {
    default: UserPayload,
    script: Mutex<VecDeque<Result<UserPayload, FetchError>>>,
    calls: Mutex<Vec<String>>,
    latency: Duration,
}

impl ScriptedFetcher {
    pub fn new(default: UserPayload) -> Self {
        Self {
            default,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push(&self, result: Result<UserPayload, FetchError>) {
        match self.script.lock() {
            Ok(mut script) => script.push_back(result),
            Err(poisoned) => poisoned.into_inner().push_back(result),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch(&self, key: &str, cancel: &CancelToken) -> Result<UserPayload, FetchError> {
        match self.calls.lock() {
            Ok(mut calls) => calls.push(key.to_owned()),
            Err(poisoned) => poisoned.into_inner().push(key.to_owned()),
        }
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        let next = match self.script.lock() {
            Ok(mut script) => script.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        next.unwrap_or_else(|| Ok(self.default.clone()))
    }
}
