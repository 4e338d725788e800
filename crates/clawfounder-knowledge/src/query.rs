// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid retrieval: full-text phase plus entity-substring phase.
//!
//! Both phases run independently and their hits are merged: deduplicated by
//! item id (first occurrence wins), re-sorted newest first and truncated.
//! A failing phase is logged and contributes nothing, so search degrades
//! rather than failing.

use std::collections::{BTreeSet, HashSet};

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use tracing::warn;

use crate::store::parse_metadata;
use crate::text::{extract_topics, fts_match_expression, like_pattern, truncate_chars};
use crate::types::SearchHit;

const HIT_COLUMNS: &str = "ki.id, ki.connector, ki.tool_name, ki.source_id, ki.event_date, \
                           ki.title, ki.snippet, ki.metadata, ki.account_id";

/// Phase A: items whose full-text projection matches `match_expr`, by rank.
pub(crate) fn fts_hits(
    conn: &Connection,
    match_expr: &str,
    connector: Option<&str>,
    limit: usize,
) -> Result<Vec<SearchHit>, rusqlite::Error> {
    let mut sql = format!(
        "SELECT {HIT_COLUMNS} FROM knowledge_fts
         JOIN knowledge_items ki ON ki.id = knowledge_fts.rowid
         WHERE knowledge_fts MATCH ?1"
    );
    let mut values: Vec<SqlValue> = vec![SqlValue::from(match_expr.to_string())];
    if let Some(connector) = connector {
        sql.push_str(" AND ki.connector = ?2");
        values.push(SqlValue::from(connector.to_string()));
    }
    values.push(sql_limit(limit));
    sql.push_str(&format!(" ORDER BY knowledge_fts.rank LIMIT ?{}", values.len()));

    let mut stmt = conn.prepare(&sql)?;
    let hits = stmt
        .query_map(params_from_iter(values), row_to_hit)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(hits)
}

/// Phase B: items linked to an entity whose normalized value matches any of
/// `patterns` (already escaped `LIKE` patterns), newest first.
pub(crate) fn entity_hits(
    conn: &Connection,
    patterns: &[String],
    connector: Option<&str>,
    limit: usize,
) -> Result<Vec<SearchHit>, rusqlite::Error> {
    if patterns.is_empty() {
        return Ok(Vec::new());
    }

    let clauses = (1..=patterns.len())
        .map(|i| format!("e.normalized LIKE ?{i} ESCAPE '\\'"))
        .collect::<Vec<_>>()
        .join(" OR ");
    let mut sql = format!(
        "SELECT DISTINCT {HIT_COLUMNS} FROM entities e
         JOIN item_entities ie ON ie.entity_id = e.id
         JOIN knowledge_items ki ON ki.id = ie.item_id
         WHERE ({clauses})"
    );
    let mut values: Vec<SqlValue> = patterns.iter().cloned().map(SqlValue::from).collect();
    if let Some(connector) = connector {
        sql.push_str(&format!(" AND ki.connector = ?{}", patterns.len() + 1));
        values.push(SqlValue::from(connector.to_string()));
    }
    values.push(sql_limit(limit));
    sql.push_str(&format!(" ORDER BY ki.event_date DESC LIMIT ?{}", values.len()));

    let mut stmt = conn.prepare(&sql)?;
    let hits = stmt
        .query_map(params_from_iter(values), row_to_hit)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(hits)
}

/// `LIMIT` bound as an integer; SQLite reads anything past `i64::MAX` as REAL.
fn sql_limit(limit: usize) -> SqlValue {
    SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX))
}

/// Dedup by item id keeping the first occurrence, sort newest first (missing
/// dates last, ties keep phase order) and truncate to `limit`.
pub(crate) fn merge_hits<I>(phases: I, limit: usize) -> Vec<SearchHit>
where
    I: IntoIterator<Item = Vec<SearchHit>>,
{
    let mut seen = HashSet::new();
    let mut merged: Vec<SearchHit> = phases
        .into_iter()
        .flatten()
        .filter(|hit| seen.insert(hit.id))
        .collect();
    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged.truncate(limit);
    merged
}

/// Run both phases of an explicit search. Never fails.
pub(crate) fn run_search(
    conn: &Connection,
    query: &str,
    connector: Option<&str>,
    limit: usize,
    fts_enabled: bool,
) -> Vec<SearchHit> {
    let fts = match fts_match_expression(query.split_whitespace()) {
        Some(expr) if fts_enabled => fts_hits(conn, &expr, connector, limit).unwrap_or_else(|e| {
            warn!(error = %e, "full-text phase failed, using entity matches only");
            Vec::new()
        }),
        _ => Vec::new(),
    };

    let pattern = like_pattern(&query.trim().to_lowercase());
    let entities = entity_hits(conn, &[pattern], connector, limit).unwrap_or_else(|e| {
        warn!(error = %e, "entity phase failed, using full-text matches only");
        Vec::new()
    });

    merge_hits([fts, entities], limit)
}

/// Batched lookup for quick search: one full-text query over every
/// candidate word and one entity query OR-ing every candidate.
pub(crate) fn run_quick_search(
    conn: &Connection,
    candidates: &[String],
    limit: usize,
    fts_enabled: bool,
) -> Result<Vec<SearchHit>, rusqlite::Error> {
    let has_items: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM knowledge_items)",
        [],
        |row| row.get(0),
    )?;
    if !has_items {
        return Ok(Vec::new());
    }

    let words = candidates.iter().flat_map(|c| c.split_whitespace());
    let fts = match fts_match_expression(words) {
        Some(expr) if fts_enabled => fts_hits(conn, &expr, None, limit).unwrap_or_else(|e| {
            warn!(error = %e, "quick search full-text phase failed");
            Vec::new()
        }),
        _ => Vec::new(),
    };

    let patterns: Vec<String> = candidates
        .iter()
        .map(|c| like_pattern(&c.to_lowercase()))
        .collect();
    let entities = entity_hits(conn, &patterns, None, limit).unwrap_or_else(|e| {
        warn!(error = %e, "quick search entity phase failed");
        Vec::new()
    });

    Ok(merge_hits([fts, entities], limit))
}

/// Candidate entity strings in a chat message.
///
/// Vocabulary topics (and ticket ids) first, then `@mentions`, then
/// capitalized words that do not open the message, are not stoplisted and are
/// not short all-caps acronyms. Deduplicated case-insensitively and capped.
pub fn quick_candidates(
    message: &str,
    vocabulary: &BTreeSet<String>,
    stoplist: &BTreeSet<String>,
    max: usize,
) -> Vec<String> {
    let mut candidates = Vec::new();
    for topic in extract_topics(message, vocabulary, usize::MAX) {
        push_unique(&mut candidates, topic);
    }

    let words: Vec<&str> = message.split_whitespace().collect();
    for token in &words {
        if let Some(mention) = token.strip_prefix('@') {
            push_unique(&mut candidates, strip_punctuation(mention).to_string());
        }
    }

    for token in words.iter().skip(1) {
        if token.starts_with('@') {
            continue;
        }
        let word = strip_punctuation(token);
        let Some(first) = word.chars().next() else {
            continue;
        };
        if !first.is_uppercase() || stoplist.contains(&word.to_lowercase()) {
            continue;
        }
        if word.chars().count() <= 3 && !word.chars().any(char::is_lowercase) {
            continue;
        }
        push_unique(&mut candidates, word.to_string());
    }

    candidates.truncate(max);
    candidates
}

/// The context block injected ahead of a conversation turn.
pub(crate) fn render_quick_context(
    candidates: &[String],
    hits: &[SearchHit],
    title_length: usize,
    snippet_length: usize,
) -> String {
    let mut lines = Vec::with_capacity(hits.len() + 1);
    lines.push(format!("Relevant memory for: {}", candidates.join(", ")));
    for hit in hits {
        let mut line = format!("- [{}]", hit.connector);
        let date = truncate_chars(&hit.date, 10);
        if !date.is_empty() {
            line.push(' ');
            line.push_str(&date);
        }
        line.push_str(": ");
        line.push_str(&truncate_chars(hit.title.trim(), title_length));
        let snippet = truncate_chars(hit.snippet.trim(), snippet_length);
        if !snippet.is_empty() {
            line.push_str(" - ");
            line.push_str(&snippet);
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn push_unique(candidates: &mut Vec<String>, candidate: String) {
    if candidate.is_empty() {
        return;
    }
    let lower = candidate.to_lowercase();
    if !candidates.iter().any(|c| c.to_lowercase() == lower) {
        candidates.push(candidate);
    }
}

fn strip_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_'))
}

fn row_to_hit(row: &rusqlite::Row<'_>) -> Result<SearchHit, rusqlite::Error> {
    let event_date: Option<String> = row.get(4)?;
    let metadata: String = row.get(7)?;
    Ok(SearchHit {
        id: row.get(0)?,
        connector: row.get(1)?,
        tool: row.get(2)?,
        source_id: row.get(3)?,
        date: event_date.unwrap_or_default(),
        title: row.get(5)?,
        snippet: row.get(6)?,
        metadata: parse_metadata(&metadata),
        account: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(id: i64, date: &str) -> SearchHit {
        SearchHit {
            id,
            connector: "gmail".into(),
            tool: "gmail_search".into(),
            source_id: format!("m{id}"),
            date: date.into(),
            title: format!("Title {id}"),
            snippet: String::new(),
            metadata: json!({}),
            account: String::new(),
        }
    }

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn seeded_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        crate::migrations::run_migrations(&mut conn).unwrap();
        let fts = crate::database::ensure_fts(&conn);
        assert!(fts);
        conn.execute_batch(
            "INSERT INTO knowledge_items (id, connector, tool_name, source_id, event_date, title, snippet, entity_text)
             VALUES (1, 'gmail', 'gmail_search', 'm1', '2024-01-01T10:00:00', 'Project update', 'deadline', 'Jane Doe');
             INSERT INTO knowledge_fts(rowid, title, snippet, entity_text)
             VALUES (1, 'Project update', 'deadline', 'Jane Doe');
             INSERT INTO entities (id, type, value, normalized) VALUES (1, 'person', 'Jane Doe', 'jane doe');
             INSERT INTO item_entities (item_id, entity_id, role) VALUES (1, 1, 'sender');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn oversized_limit_still_returns_hits() {
        let conn = seeded_conn();
        assert_eq!(fts_hits(&conn, "\"jane\"", None, usize::MAX).unwrap().len(), 1);
        let patterns = vec![like_pattern("jane")];
        assert_eq!(entity_hits(&conn, &patterns, None, usize::MAX).unwrap().len(), 1);
        assert_eq!(run_search(&conn, "Jane", Some("gmail"), usize::MAX, true).len(), 1);
    }

    #[test]
    fn merge_dedupes_sorts_and_truncates() {
        let fts = vec![hit(1, "2024-01-01"), hit(2, "")];
        let entity = vec![hit(2, ""), hit(3, "2024-03-01"), hit(4, "2023-12-01")];
        let merged = merge_hits([fts, entity], 3);
        let ids: Vec<i64> = merged.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![3, 1, 4]);
    }

    #[test]
    fn merge_puts_undated_last() {
        let merged = merge_hits([vec![hit(1, ""), hit(2, "2020-01-01")]], 10);
        assert_eq!(merged[0].id, 2);
        assert_eq!(merged[1].id, 1);
    }

    #[test]
    fn candidates_from_capitalized_words() {
        let candidates = quick_candidates("Any update from Jane?", &set(&[]), &set(&["any"]), 8);
        assert_eq!(candidates, vec!["Jane"]);
    }

    #[test]
    fn first_word_and_stopwords_are_ignored() {
        let candidates = quick_candidates(
            "Jane said Monday that The API is ready",
            &set(&[]),
            &set(&["monday", "the"]),
            8,
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn candidates_include_topics_mentions_and_cap() {
        let candidates = quick_candidates(
            "ping @bob about the deploy deadline, ask Carol and Dave and Erin",
            &set(&["deploy", "deadline"]),
            &set(&[]),
            4,
        );
        assert_eq!(candidates, vec!["deadline", "deploy", "bob", "Carol"]);
    }

    #[test]
    fn candidates_dedupe_case_insensitively() {
        let candidates =
            quick_candidates("tell @Jane that Jane and JANE agree", &set(&[]), &set(&[]), 8);
        assert_eq!(candidates, vec!["Jane"]);
    }

    #[test]
    fn render_lines_truncate_and_omit_empty_parts() {
        let mut long = hit(1, "2024-01-01T10:00:00");
        long.title = "Project update".into();
        long.snippet = "deadline is Friday".into();
        let undated = hit(2, "");

        let block = render_quick_context(&["Jane".to_string()], &[long, undated], 7, 8);
        assert_eq!(
            block,
            "Relevant memory for: Jane\n- [gmail] 2024-01-01: Project - deadline\n- [gmail]: Title 2"
        );
    }
}
