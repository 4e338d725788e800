// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write path of the knowledge store: upserts, retention and reset.
//!
//! The full-text table uses external content, so it is kept in sync by hand:
//! before a row changes, its previous `(title, snippet, entity_text)` is
//! replayed as an FTS5 `delete` command, then the new values are inserted.
//! Every batch runs inside one `BEGIN IMMEDIATE` transaction so another
//! process can never interleave between the read of the old values and the
//! write of the new ones.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use clawfounder_core::ClawfounderError;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::{Map, Value};
use tracing::debug;

use crate::database::{map_tr_err, Database};
use crate::dates::format_timestamp;
use crate::normalize::{normalize, EntityCache, PendingEntities};
use crate::types::{
    Entity, EntityKind, EntityMention, ExtractedItem, KnowledgeItem, KnowledgeStats,
};

/// Where a batch of extracted items came from.
#[derive(Debug, Clone)]
struct ItemOrigin {
    connector: String,
    tool_name: String,
    account_id: String,
    indexed_at: String,
}

/// Persistent knowledge store: items, entities and their links.
#[derive(Debug)]
pub struct KnowledgeStore {
    db: Database,
    entities: Arc<EntityCache>,
}

impl KnowledgeStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            entities: Arc::new(EntityCache::new()),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn fts_enabled(&self) -> bool {
        self.db.fts_enabled()
    }

    /// Number of entity ids cached by this process.
    pub fn cached_entities(&self) -> usize {
        self.entities.len()
    }

    /// Upsert a batch of items extracted from one tool result.
    ///
    /// Returns the number of items written.
    pub async fn write_items(
        &self,
        connector: &str,
        tool_name: &str,
        account_id: Option<&str>,
        indexed_at: DateTime<Utc>,
        items: Vec<ExtractedItem>,
    ) -> Result<usize, ClawfounderError> {
        if items.is_empty() {
            return Ok(0);
        }

        let origin = ItemOrigin {
            connector: connector.to_string(),
            tool_name: tool_name.to_string(),
            account_id: account_id.unwrap_or("").to_string(),
            indexed_at: format_timestamp(indexed_at),
        };
        let cache = Arc::clone(&self.entities);
        let fts = self.db.fts_enabled();

        self.db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let mut pending = PendingEntities::new();
                for item in &items {
                    upsert_item(&tx, &cache, &mut pending, &origin, item, fts)?;
                }
                tx.commit()?;
                cache.publish(pending);
                Ok(items.len())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Delete items ingested before `cutoff`, removing their full-text rows
    /// first. Returns the number of items removed.
    pub async fn sweep_retention(&self, cutoff: DateTime<Utc>) -> Result<usize, ClawfounderError> {
        let cutoff = format_timestamp(cutoff);
        let fts = self.db.fts_enabled();
        let removed = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                if fts {
                    tx.execute(
                        "INSERT INTO knowledge_fts(knowledge_fts, rowid, title, snippet, entity_text)
                         SELECT 'delete', id, title, snippet, entity_text
                         FROM knowledge_items WHERE indexed_at < ?1",
                        params![cutoff],
                    )?;
                }
                let removed =
                    tx.execute("DELETE FROM knowledge_items WHERE indexed_at < ?1", params![cutoff])?;
                tx.commit()?;
                Ok(removed)
            })
            .await
            .map_err(map_tr_err)?;
        if removed > 0 {
            debug!(removed, "retention sweep removed expired knowledge items");
        }
        Ok(removed)
    }

    /// Remove every item, entity and link, and empty the full-text table.
    pub async fn clear(&self) -> Result<(), ClawfounderError> {
        let fts = self.db.fts_enabled();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                tx.execute_batch(
                    "DELETE FROM item_entities;
                     DELETE FROM entities;
                     DELETE FROM knowledge_items;",
                )?;
                if fts {
                    tx.execute_batch("INSERT INTO knowledge_fts(knowledge_fts) VALUES('rebuild');")?;
                }
                tx.commit()
            })
            .await
            .map_err(map_tr_err)?;
        self.entities.clear();
        Ok(())
    }

    /// Row counts of the three tables.
    pub async fn stats(&self) -> Result<KnowledgeStats, ClawfounderError> {
        self.db
            .connection()
            .call(|conn| -> Result<KnowledgeStats, rusqlite::Error> { stats(conn) })
            .await
            .map_err(map_tr_err)
    }

    /// Look up one item by its natural key.
    pub async fn get_item(
        &self,
        connector: &str,
        source_id: &str,
        account_id: Option<&str>,
    ) -> Result<Option<KnowledgeItem>, ClawfounderError> {
        let connector = connector.to_string();
        let source_id = source_id.to_string();
        let account_id = account_id.unwrap_or("").to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<KnowledgeItem>, rusqlite::Error> {
                conn.query_row(
                    "SELECT id, connector, tool_name, source_id, account_id, event_date, indexed_at,
                            title, snippet, metadata
                     FROM knowledge_items
                     WHERE connector = ?1 AND source_id = ?2 AND account_id = ?3",
                    params![connector, source_id, account_id],
                    row_to_item,
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    /// All entities, optionally of one kind, ordered by kind then value.
    pub async fn entities(&self, kind: Option<EntityKind>) -> Result<Vec<Entity>, ClawfounderError> {
        let kind = kind.map(|k| k.as_str());
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<Entity>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, type, value, normalized FROM entities
                     WHERE ?1 IS NULL OR type = ?1
                     ORDER BY type, normalized",
                )?;
                let rows = stmt.query_map(params![kind], row_to_entity)?;
                let entities = rows.collect::<Result<Vec<_>, _>>()?;
                Ok(entities.into_iter().flatten().collect())
            })
            .await
            .map_err(map_tr_err)
    }

    pub async fn close(self) -> Result<(), ClawfounderError> {
        self.db.close().await
    }
}

/// Upsert one item and its links inside the caller's transaction.
///
/// Newly resolved entity ids go to `pending` and are published by the caller
/// after commit.
fn upsert_item(
    conn: &Connection,
    cache: &EntityCache,
    pending: &mut PendingEntities,
    origin: &ItemOrigin,
    item: &ExtractedItem,
    fts: bool,
) -> Result<i64, rusqlite::Error> {
    let old: Option<(String, String, String)> = conn
        .query_row(
            "SELECT title, snippet, entity_text FROM knowledge_items
             WHERE connector = ?1 AND source_id = ?2 AND account_id = ?3",
            params![origin.connector, item.source_id, origin.account_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let entity_text = item.entity_text();
    let item_id: i64 = conn.query_row(
        "INSERT INTO knowledge_items
             (connector, tool_name, source_id, account_id, event_date, indexed_at,
              title, snippet, metadata, entity_text)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(connector, source_id, account_id) DO UPDATE SET
             tool_name = excluded.tool_name,
             event_date = excluded.event_date,
             indexed_at = excluded.indexed_at,
             title = excluded.title,
             snippet = excluded.snippet,
             metadata = excluded.metadata,
             entity_text = excluded.entity_text
         RETURNING id",
        params![
            origin.connector,
            origin.tool_name,
            item.source_id,
            origin.account_id,
            item.event_date,
            origin.indexed_at,
            item.title,
            item.snippet,
            item.metadata.to_string(),
            entity_text,
        ],
        |row| row.get(0),
    )?;

    conn.execute("DELETE FROM item_entities WHERE item_id = ?1", params![item_id])?;
    for mention in &item.entities {
        link_entity(conn, cache, pending, item_id, mention)?;
    }

    if fts {
        if let Some((old_title, old_snippet, old_entity_text)) = &old {
            conn.execute(
                "INSERT INTO knowledge_fts(knowledge_fts, rowid, title, snippet, entity_text)
                 VALUES ('delete', ?1, ?2, ?3, ?4)",
                params![item_id, old_title, old_snippet, old_entity_text],
            )?;
        }
        conn.execute(
            "INSERT INTO knowledge_fts(rowid, title, snippet, entity_text) VALUES (?1, ?2, ?3, ?4)",
            params![item_id, item.title, item.snippet, entity_text],
        )?;
    }

    Ok(item_id)
}

/// Resolve a mention to an entity id and link it to the item.
///
/// A cached id whose row was removed by another process fails the foreign
/// key; the entry is evicted and resolution retried once.
fn link_entity(
    conn: &Connection,
    cache: &EntityCache,
    pending: &mut PendingEntities,
    item_id: i64,
    mention: &EntityMention,
) -> Result<(), rusqlite::Error> {
    let Some(normalized) = normalize(&mention.value) else {
        return Ok(());
    };
    let display = mention.value.trim();

    let entity_id = cache.resolve(conn, pending, mention.kind, display, &normalized)?;
    match insert_link(conn, item_id, entity_id, mention) {
        Err(e) if is_foreign_key_violation(&e) => {
            debug!(entity = %normalized, "cached entity id is stale, re-resolving");
            cache.evict(mention.kind, &normalized);
            let entity_id = cache.resolve(conn, pending, mention.kind, display, &normalized)?;
            insert_link(conn, item_id, entity_id, mention)
        }
        other => other,
    }
}

fn insert_link(
    conn: &Connection,
    item_id: i64,
    entity_id: i64,
    mention: &EntityMention,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO item_entities (item_id, entity_id, role) VALUES (?1, ?2, ?3)",
        params![item_id, entity_id, mention.role.as_str()],
    )?;
    Ok(())
}

fn is_foreign_key_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

pub(crate) fn stats(conn: &Connection) -> Result<KnowledgeStats, rusqlite::Error> {
    conn.query_row(
        "SELECT (SELECT COUNT(*) FROM knowledge_items),
                (SELECT COUNT(*) FROM entities),
                (SELECT COUNT(*) FROM item_entities)",
        [],
        |row| {
            Ok(KnowledgeStats {
                items: row.get::<_, i64>(0)? as u64,
                entities: row.get::<_, i64>(1)? as u64,
                links: row.get::<_, i64>(2)? as u64,
            })
        },
    )
}

fn row_to_item(row: &rusqlite::Row<'_>) -> Result<KnowledgeItem, rusqlite::Error> {
    let account_id: String = row.get(4)?;
    let metadata: String = row.get(9)?;
    Ok(KnowledgeItem {
        id: row.get(0)?,
        connector: row.get(1)?,
        tool_name: row.get(2)?,
        source_id: row.get(3)?,
        account_id: (!account_id.is_empty()).then_some(account_id),
        event_date: row.get(5)?,
        indexed_at: row.get(6)?,
        title: row.get(7)?,
        snippet: row.get(8)?,
        metadata: parse_metadata(&metadata),
    })
}

/// Rows with an unrecognized `type` are skipped.
fn row_to_entity(row: &rusqlite::Row<'_>) -> Result<Option<Entity>, rusqlite::Error> {
    let kind: String = row.get(1)?;
    let Some(kind) = EntityKind::from_str_value(&kind) else {
        return Ok(None);
    };
    Ok(Some(Entity {
        id: row.get(0)?,
        kind,
        value: row.get(2)?,
        normalized: row.get(3)?,
    }))
}

/// Stored metadata as JSON; unreadable text becomes an empty object.
pub(crate) fn parse_metadata(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::Object(Map::new()))
}
