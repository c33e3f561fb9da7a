// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const ELLIPSIS: &str = "...";

/// Caps `text` at `max_chars` characters, appending `...` when cut.
pub fn truncate_message(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_owned(),
    }
}

/// Caps raw input at `max_chars` characters without a suffix.
pub fn clamp_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// `1234567` -> `1,234,567`.
pub fn format_count(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// Splits `text` into runs that do and do not match `query`
/// case-insensitively. A blank query yields the whole text unmatched.
pub fn highlight_segments<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    let needle: Vec<char> = query.trim().chars().collect();
    if needle.is_empty() || text.is_empty() {
        return vec![Segment {
            text,
            matched: false,
        }];
    }

    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;
    while cursor < text.len() {
        if let Some(len) = match_len_at(&text[cursor..], &needle) {
            if plain_start < cursor {
                segments.push(Segment {
                    text: &text[plain_start..cursor],
                    matched: false,
                });
            }
            segments.push(Segment {
                text: &text[cursor..cursor + len],
                matched: true,
            });
            cursor += len;
            plain_start = cursor;
            continue;
        }
        cursor += text[cursor..].chars().next().map_or(1, char::len_utf8);
    }
    if plain_start < text.len() {
        segments.push(Segment {
            text: &text[plain_start..],
            matched: false,
        });
    }
    segments
}

fn match_len_at(haystack: &str, needle: &[char]) -> Option<usize> {
    let mut len = 0;
    let mut chars = haystack.chars();
    for expected in needle {
        let actual = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        len += actual.len_utf8();
    }
    Some(len)
}

#[cfg(test)]
mod tests {
    use super::{Segment, clamp_chars, format_count, highlight_segments, truncate_message};

    fn seg(text: &str, matched: bool) -> Segment<'_> {
        Segment { text, matched }
    }

    #[test]
    fn truncate_leaves_short_messages_alone() {
        assert_eq!(truncate_message("boom", 100), "boom");
        assert_eq!(truncate_message("", 100), "");
    }

    #[test]
    fn truncate_caps_at_limit_with_ellipsis() {
        let long = "x".repeat(150);
        let cut = truncate_message(&long, 100);
        assert_eq!(cut.len(), 103);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_message(&"y".repeat(100), 100).len(), 100);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_message("héllo wörld", 4), "héll...");
        assert_eq!(clamp_chars("ünïcode", 3), "ünï");
    }

    #[test]
    fn format_count_groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn highlight_marks_every_case_insensitive_match() {
        assert_eq!(
            highlight_segments("Alice Ali", "ali"),
            vec![seg("Ali", true), seg("ce ", false), seg("Ali", true)]
        );
    }

    #[test]
    fn highlight_without_query_returns_whole_text() {
        assert_eq!(highlight_segments("Bob", "  "), vec![seg("Bob", false)]);
        assert_eq!(highlight_segments("Bob", "zed"), vec![seg("Bob", false)]);
    }

    #[test]
    fn highlight_handles_multibyte_text() {
        assert_eq!(
            highlight_segments("Zoë Ëlla", "ë"),
            vec![seg("Zo", false), seg("ë", true), seg(" ", false), seg("Ë", true), seg("lla", false)]
        );
    }
}
