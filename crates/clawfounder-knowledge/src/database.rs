// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! Each process holds one [`Database`]. Its statements are serialized through
//! tokio-rusqlite's background thread; other processes coordinate through
//! SQLite's own WAL locking.

use std::path::Path;

use clawfounder_core::ClawfounderError;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use crate::migrations::run_migrations;

const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;";

/// External-content full-text projection of `knowledge_items`, kept in sync
/// by the write path rather than triggers.
const FTS_SCHEMA: &str = "CREATE VIRTUAL TABLE IF NOT EXISTS knowledge_fts USING fts5(
    title, snippet, entity_text,
    content='knowledge_items',
    content_rowid='id',
    tokenize='porter unicode61'
);";

pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ClawfounderError {
    ClawfounderError::storage(e)
}

/// An open knowledge database.
pub struct Database {
    conn: Connection,
    fts_enabled: bool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("fts_enabled", &self.fts_enabled)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Open (creating if needed) the database at `path`, apply pragmas, run
    /// migrations and set up the full-text table.
    pub async fn open(path: &str) -> Result<Self, ClawfounderError> {
        let parent = Path::new(path)
            .parent()
            .filter(|p| path != ":memory:" && !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            std::fs::create_dir_all(parent).map_err(ClawfounderError::storage)?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(ClawfounderError::storage)?;
        let db = Self::init(conn).await?;
        debug!(path, fts = db.fts_enabled, "knowledge database opened");
        Ok(db)
    }

    /// Open a private in-memory database.
    pub async fn open_in_memory() -> Result<Self, ClawfounderError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(ClawfounderError::storage)?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, ClawfounderError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch(PRAGMAS) })
            .await
            .map_err(map_tr_err)?;

        conn.call(|conn| run_migrations(conn))
            .await
            .map_err(ClawfounderError::storage)?;

        let fts_enabled = conn
            .call(|conn| -> Result<bool, rusqlite::Error> { Ok(ensure_fts(conn)) })
            .await
            .map_err(map_tr_err)?;

        Ok(Self { conn, fts_enabled })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether the full-text projection is available in this build.
    pub fn fts_enabled(&self) -> bool {
        self.fts_enabled
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), ClawfounderError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        self.conn.close().await.map_err(ClawfounderError::storage)
    }
}

/// Create the full-text table if possible.
///
/// Returns `false` when FTS5 is unavailable; the store then runs with
/// entity-only search. A freshly created table over existing rows is rebuilt
/// from the stored `entity_text` so later deletes find their postings.
pub(crate) fn ensure_fts(conn: &rusqlite::Connection) -> bool {
    let existed = match conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'knowledge_fts')",
        [],
        |row| row.get::<_, bool>(0),
    ) {
        Ok(existed) => existed,
        Err(e) => {
            warn!(error = %e, "could not inspect schema, full-text search disabled");
            return false;
        }
    };

    if let Err(e) = conn.execute_batch(FTS_SCHEMA) {
        warn!(error = %e, "FTS5 unavailable, full-text search disabled");
        return false;
    }

    if !existed {
        let rebuilt = conn
            .query_row("SELECT EXISTS(SELECT 1 FROM knowledge_items)", [], |row| {
                row.get::<_, bool>(0)
            })
            .and_then(|has_rows| {
                if has_rows {
                    conn.execute_batch("INSERT INTO knowledge_fts(knowledge_fts) VALUES('rebuild');")
                } else {
                    Ok(())
                }
            });
        if let Err(e) = rebuilt {
            warn!(error = %e, "full-text rebuild failed, full-text search disabled");
            return false;
        }
    }
    true
}
