// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity normalization and id resolution.

use std::collections::HashMap;

use dashmap::DashMap;
use rusqlite::{params, Connection};

use crate::types::EntityKind;

/// Canonical form used to deduplicate entities: trimmed and lower-cased.
///
/// Returns `None` for values that are blank after trimming.
pub fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Ids resolved inside one open write transaction.
///
/// They reach the [`EntityCache`] only through [`EntityCache::publish`] once
/// the transaction has committed. A rolled-back insert must not leave its id
/// behind: SQLite hands the same id to the next entity.
#[derive(Debug, Default)]
pub struct PendingEntities {
    ids: HashMap<(EntityKind, String), i64>,
}

impl PendingEntities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Process-local `(kind, normalized) -> entity id` cache of committed rows.
///
/// Entries may outlive their rows if another process clears the store; the
/// write path evicts and re-resolves when a link insert reports a missing
/// entity.
#[derive(Debug, Default)]
pub struct EntityCache {
    ids: DashMap<(EntityKind, String), i64>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the entity `(kind, normalized)`, inserting it with `display` as
    /// its value when absent. The first display value seen is kept.
    ///
    /// Ids looked up in the database are recorded in `pending`, not here.
    pub fn resolve(
        &self,
        conn: &Connection,
        pending: &mut PendingEntities,
        kind: EntityKind,
        display: &str,
        normalized: &str,
    ) -> Result<i64, rusqlite::Error> {
        let key = (kind, normalized.to_string());
        if let Some(id) = self.ids.get(&key) {
            return Ok(*id);
        }
        if let Some(id) = pending.ids.get(&key) {
            return Ok(*id);
        }

        conn.execute(
            "INSERT OR IGNORE INTO entities (type, value, normalized) VALUES (?1, ?2, ?3)",
            params![kind.as_str(), display, normalized],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM entities WHERE type = ?1 AND normalized = ?2",
            params![kind.as_str(), normalized],
            |row| row.get(0),
        )?;

        pending.ids.insert(key, id);
        Ok(id)
    }

    /// Make ids from a committed transaction visible to later writes.
    pub fn publish(&self, pending: PendingEntities) {
        for (key, id) in pending.ids {
            self.ids.insert(key, id);
        }
    }

    pub fn evict(&self, kind: EntityKind, normalized: &str) {
        self.ids.remove(&(kind, normalized.to_string()));
    }

    pub fn clear(&self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
