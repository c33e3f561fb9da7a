// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::User;

pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Keeps users whose display name contains `query`, preserving order. The
/// query is normalized again here so callers may pass raw text.
pub fn filter_users<'a>(users: &'a [User], query: &str) -> Vec<&'a User> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return users.iter().collect();
    }

    users
        .iter()
        .filter(|user| user.display_name().to_lowercase().contains(&needle))
        .collect()
}

/// Index-based variant used by the list state so the filtered view can be
/// stored alongside a shared payload without borrowing it.
pub fn filter_indices(users: &[User], query: &str) -> Vec<usize> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return (0..users.len()).collect();
    }

    users
        .iter()
        .enumerate()
        .filter(|(_, user)| user.display_name().to_lowercase().contains(&needle))
        .map(|(index, _)| index)
        .collect()
}
