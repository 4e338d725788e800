// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rolling digest of what the knowledge store knows about.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::store::stats;
use crate::types::EntityKind;

/// Build the digest text, or `None` for an empty store.
pub(crate) fn compute_summary(
    conn: &Connection,
    top_n: usize,
) -> Result<Option<String>, rusqlite::Error> {
    let items = stats(conn)?.items;
    if items == 0 {
        return Ok(None);
    }

    let mut lines = vec![format!("Knowledge base: {items} items indexed")];
    for (label, kind) in [
        ("People", EntityKind::Person),
        ("Repos", EntityKind::Repo),
        ("Topics", EntityKind::Topic),
    ] {
        let top = top_entities(conn, kind, top_n)?;
        if !top.is_empty() {
            lines.push(format!("{label}: {}", top.join(", ")));
        }
    }
    Ok(Some(lines.join("\n")))
}

/// Most-linked entity values of one kind. Raw email addresses are left out
/// of the people list; the display name of the same sender is kept.
fn top_entities(
    conn: &Connection,
    kind: EntityKind,
    limit: usize,
) -> Result<Vec<String>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT e.value, COUNT(DISTINCT ie.item_id) AS mentions
         FROM entities e
         JOIN item_entities ie ON ie.entity_id = e.id
         WHERE e.type = ?1 AND (?1 != 'person' OR instr(e.value, '@') = 0)
         GROUP BY e.id
         ORDER BY mentions DESC, e.normalized ASC
         LIMIT ?2",
    )?;
    let values = stmt
        .query_map(params![kind.as_str(), limit as i64], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(values)
}

#[derive(Debug)]
struct CachedSummary {
    computed_at: DateTime<Utc>,
    text: String,
}

/// Last computed summary with the time it was computed.
#[derive(Debug, Default)]
pub struct SummaryCache {
    entry: ArcSwapOption<CachedSummary>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached text if it was computed less than `ttl` before `now`.
    pub fn get(&self, now: DateTime<Utc>, ttl: std::time::Duration) -> Option<String> {
        let entry = self.entry.load_full()?;
        let age = now.signed_duration_since(entry.computed_at).to_std().ok()?;
        (age < ttl).then(|| entry.text.clone())
    }

    pub fn store(&self, now: DateTime<Utc>, text: String) {
        self.entry.store(Some(Arc::new(CachedSummary {
            computed_at: now,
            text,
        })));
    }

    pub fn invalidate(&self) {
        self.entry.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use chrono::{Duration, TimeZone};
    use std::time::Duration as StdDuration;

    fn setup_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    fn link(conn: &Connection, item: i64, kind: &str, value: &str) {
        conn.execute(
            "INSERT OR IGNORE INTO entities (type, value, normalized) VALUES (?1, ?2, lower(?2))",
            params![kind, value],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO item_entities (item_id, entity_id, role)
             SELECT ?1, id, 'mentioned' FROM entities WHERE type = ?2 AND normalized = lower(?3)",
            params![item, kind, value],
        )
        .unwrap();
    }

    #[test]
    fn empty_store_has_no_summary() {
        let conn = setup_conn();
        assert_eq!(compute_summary(&conn, 5).unwrap(), None);
    }

    #[test]
    fn summary_ranks_entities_and_hides_addresses() {
        let conn = setup_conn();
        for id in 1..=3 {
            conn.execute(
                "INSERT INTO knowledge_items (id, connector, tool_name, source_id) VALUES (?1, 'gmail', 't', ?1)",
                params![id],
            )
            .unwrap();
        }
        link(&conn, 1, "person", "Jane Doe");
        link(&conn, 2, "person", "Jane Doe");
        link(&conn, 1, "person", "jane@x.com");
        link(&conn, 3, "person", "Bob");
        link(&conn, 2, "repo", "org/app");
        link(&conn, 3, "topic", "deadline");

        let summary = compute_summary(&conn, 5).unwrap().unwrap();
        assert_eq!(
            summary,
            "Knowledge base: 3 items indexed\nPeople: Jane Doe, Bob\nRepos: org/app\nTopics: deadline"
        );
    }

    #[test]
    fn cache_expires_after_ttl() {
        let cache = SummaryCache::new();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ttl = StdDuration::from_secs(300);
        assert_eq!(cache.get(t0, ttl), None);

        cache.store(t0, "digest".to_string());
        assert_eq!(cache.get(t0 + Duration::seconds(299), ttl).as_deref(), Some("digest"));
        assert_eq!(cache.get(t0 + Duration::seconds(300), ttl), None);

        cache.invalidate();
        assert_eq!(cache.get(t0, ttl), None);
    }
}
