// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Free-text helpers shared by extraction and retrieval.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Ticket-style identifiers such as `ENG-142`.
static TICKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}-\d+\b").unwrap());

/// Keep at most `max` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Topic entities found in `text`.
///
/// Vocabulary entries match case-insensitively as substrings and come first in
/// sorted order, followed by ticket ids in order of appearance. Duplicates are
/// dropped and the result is capped at `max`.
pub fn extract_topics(text: &str, vocabulary: &BTreeSet<String>, max: usize) -> Vec<String> {
    if max == 0 || text.trim().is_empty() {
        return Vec::new();
    }

    let lower = text.to_lowercase();
    let mut found: Vec<String> = vocabulary
        .iter()
        .filter(|topic| lower.contains(topic.as_str()))
        .cloned()
        .collect();

    for ticket in TICKET_PATTERN.find_iter(text) {
        let ticket = ticket.as_str().to_string();
        if !found.contains(&ticket) {
            found.push(ticket);
        }
    }

    found.truncate(max);
    found
}

/// Split `Display Name <addr@host>` into `(name, address)`.
///
/// A bare address yields an empty name; a bare name yields an empty address.
/// `Unknown` (what connectors emit for a missing header) yields two empties.
pub fn parse_email_address(raw: &str) -> (String, String) {
    let raw = raw.trim();
    if raw.is_empty() || raw == "Unknown" {
        return (String::new(), String::new());
    }

    if let Some(open) = raw.rfind('<').filter(|_| raw.ends_with('>')) {
        let name = raw[..open].trim().trim_matches('"').trim();
        let address = raw[open + 1..raw.len() - 1].trim();
        if address.contains('@') {
            return (name.to_string(), address.to_string());
        }
    }

    if raw.contains('@') {
        (String::new(), raw.to_string())
    } else {
        (raw.to_string(), String::new())
    }
}

/// Loose check for an email-looking field value.
pub fn looks_like_email(value: &str) -> bool {
    value.contains('@') && value.contains('.') && !value.contains(char::is_whitespace)
}

/// Quote each word as an FTS5 phrase and OR-join them.
///
/// Returns `None` when there are no words.
pub fn fts_match_expression<'a>(words: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let terms: Vec<String> = words
        .into_iter()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(|w| format!("\"{}\"", w.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// `%needle%` LIKE pattern with `\` escaping for `%`, `_` and `\`.
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
