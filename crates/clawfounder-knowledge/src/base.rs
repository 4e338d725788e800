// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The knowledge base context object.
//!
//! One [`KnowledgeBase`] per agent process. It owns the database handle, the
//! entity-id cache, the summary cache and a snapshot of the configuration.
//! Apart from `open`, no public operation surfaces a storage error: indexing
//! failures are logged and absorbed, reads degrade to "nothing found".

use std::sync::Arc;

use arc_swap::ArcSwap;
use clawfounder_config::validation::validate_config;
use clawfounder_config::ClawfounderConfig;
use clawfounder_core::{ClawfounderError, Clock, SystemClock};
use serde_json::Value;
use tracing::{debug, warn};

use crate::database::{map_tr_err, Database};
use crate::extract::{ExtractContext, ExtractorRegistry};
use crate::metrics::{record_indexed, record_search};
use crate::query::{quick_candidates, render_quick_context, run_quick_search, run_search};
use crate::store::KnowledgeStore;
use crate::summary::{compute_summary, SummaryCache};
use crate::types::{
    Entity, EntityKind, KnowledgeItem, KnowledgeStats, SearchHit, SearchResponse,
};

/// Upper bound on hits returned by one `search` call.
pub const MAX_SEARCH_RESULTS: usize = 100;

/// Cross-connector knowledge store for one agent process.
pub struct KnowledgeBase {
    store: KnowledgeStore,
    config: ArcSwap<ClawfounderConfig>,
    registry: ExtractorRegistry,
    summary: SummaryCache,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("store", &self.store)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl KnowledgeBase {
    /// Open the store at `config.storage.database_path` using the system clock.
    pub async fn open(config: Arc<ClawfounderConfig>) -> Result<Self, ClawfounderError> {
        Self::open_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Open the store with an explicit time source.
    ///
    /// Rejects an invalid configuration, then runs the retention sweep before
    /// returning.
    pub async fn open_with_clock(
        config: Arc<ClawfounderConfig>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ClawfounderError> {
        check_config(&config)?;
        let db = Database::open(&config.storage.database_path).await?;
        Ok(Self::from_database(db, config, clock).await)
    }

    /// Open a private in-memory store.
    pub async fn open_in_memory(
        config: Arc<ClawfounderConfig>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ClawfounderError> {
        check_config(&config)?;
        let db = Database::open_in_memory().await?;
        Ok(Self::from_database(db, config, clock).await)
    }

    async fn from_database(
        db: Database,
        config: Arc<ClawfounderConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let kb = Self {
            store: KnowledgeStore::new(db),
            config: ArcSwap::new(config),
            registry: ExtractorRegistry::with_defaults(),
            summary: SummaryCache::new(),
            clock,
        };
        if let Err(e) = kb.sweep_retention().await {
            warn!(error = %e, "retention sweep failed");
        }
        kb
    }

    /// Replace the extractor registry.
    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<ClawfounderConfig> {
        self.config.load_full()
    }

    /// Swap in a new configuration and drop the cached summary.
    pub fn reload_config(&self, config: Arc<ClawfounderConfig>) {
        self.config.store(config);
        self.summary.invalidate();
    }

    pub fn fts_enabled(&self) -> bool {
        self.store.fts_enabled()
    }

    /// Absorb one connector tool result.
    ///
    /// Never fails: unknown connectors, non-JSON results and storage errors
    /// all result in nothing being written. Returns the number of items
    /// written.
    pub async fn index(
        &self,
        connector: &str,
        tool_name: &str,
        result: &str,
        args: Option<&Value>,
        account_id: Option<&str>,
    ) -> usize {
        let config = self.config.load_full();
        let vocabulary = config.knowledge.topic_vocabulary();
        let now = self.clock.now();
        let ctx = ExtractContext {
            snippet_length: config.knowledge.snippet_length,
            max_topics: config.knowledge.max_topics_per_item,
            vocabulary: &vocabulary,
            now,
        };

        let null = Value::Null;
        let args = args.unwrap_or(&null);
        let items = self
            .registry
            .extract(connector, tool_name, result, args, &ctx);
        if items.is_empty() {
            return 0;
        }

        let account_id = account_id.filter(|a| !a.is_empty());
        match self
            .store
            .write_items(connector, tool_name, account_id, now, items)
            .await
        {
            Ok(written) => {
                record_indexed(connector, written);
                debug!(connector, tool = tool_name, written, "indexed tool result");
                written
            }
            Err(e) => {
                warn!(connector, tool = tool_name, error = %e, "knowledge indexing failed");
                0
            }
        }
    }

    /// Hybrid search over everything indexed.
    ///
    /// `max_results` defaults to `knowledge.default_max_results` and is capped
    /// at [`MAX_SEARCH_RESULTS`].
    pub async fn search(
        &self,
        query: &str,
        connector: Option<&str>,
        max_results: Option<usize>,
    ) -> SearchResponse {
        let query = query.trim();
        if query.is_empty() {
            return SearchResponse::no_results(query);
        }

        let limit = max_results
            .unwrap_or(self.config.load().knowledge.default_max_results)
            .clamp(1, MAX_SEARCH_RESULTS);
        let fts = self.store.fts_enabled();
        let owned_query = query.to_string();
        let connector = connector.map(str::to_string);

        let hits = self
            .store
            .database()
            .connection()
            .call(move |conn| -> Result<Vec<SearchHit>, rusqlite::Error> {
                Ok(run_search(conn, &owned_query, connector.as_deref(), limit, fts))
            })
            .await
            .map_err(map_tr_err);

        match hits {
            Ok(hits) => {
                record_search("search", hits.len());
                SearchResponse::from_hits(query, hits)
            }
            Err(e) => {
                warn!(error = %e, "knowledge search failed");
                SearchResponse::no_results(query)
            }
        }
    }

    /// Proactive lookup for a raw chat message.
    ///
    /// Returns a context block ready for prompt injection, or `None` when the
    /// message names nothing the store knows about.
    pub async fn quick_search(&self, message: &str) -> Option<String> {
        let config = self.config.load_full();
        let knowledge = &config.knowledge;
        let candidates = quick_candidates(
            message,
            &knowledge.topic_vocabulary(),
            &knowledge.common_word_set(),
            knowledge.quick_search_max_entities,
        );
        if candidates.is_empty() {
            return None;
        }

        let limit = knowledge.quick_search_max_results.max(1);
        let fts = self.store.fts_enabled();
        let lookup = candidates.clone();
        let hits = self
            .store
            .database()
            .connection()
            .call(move |conn| run_quick_search(conn, &lookup, limit, fts))
            .await
            .map_err(map_tr_err);

        let hits = match hits {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "quick search failed");
                return None;
            }
        };
        record_search("quick", hits.len());
        if hits.is_empty() {
            return None;
        }
        Some(render_quick_context(
            &candidates,
            &hits,
            knowledge.quick_title_length,
            knowledge.quick_snippet_length,
        ))
    }

    /// Short digest of the most mentioned people, repos and topics.
    ///
    /// Recomputed at most once per `knowledge.summary_ttl_secs`.
    pub async fn get_summary(&self) -> Option<String> {
        let config = self.config.load_full();
        let now = self.clock.now();
        if let Some(cached) = self.summary.get(now, config.knowledge.summary_ttl()) {
            return Some(cached);
        }

        let top_n = config.knowledge.summary_top_n;
        let summary = self
            .store
            .database()
            .connection()
            .call(move |conn| compute_summary(conn, top_n))
            .await
            .map_err(map_tr_err);

        match summary {
            Ok(Some(text)) => {
                self.summary.store(now, text.clone());
                Some(text)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "knowledge summary failed");
                None
            }
        }
    }

    /// Delete everything and reset the process-local caches.
    pub async fn clear(&self) -> Result<(), ClawfounderError> {
        self.store.clear().await?;
        self.summary.invalidate();
        debug!("knowledge base cleared");
        Ok(())
    }

    pub async fn stats(&self) -> Result<KnowledgeStats, ClawfounderError> {
        self.store.stats().await
    }

    /// One item by natural key.
    pub async fn get_item(
        &self,
        connector: &str,
        source_id: &str,
        account_id: Option<&str>,
    ) -> Result<Option<KnowledgeItem>, ClawfounderError> {
        self.store.get_item(connector, source_id, account_id).await
    }

    pub async fn entities(&self, kind: Option<EntityKind>) -> Result<Vec<Entity>, ClawfounderError> {
        self.store.entities(kind).await
    }

    /// Remove items ingested more than `knowledge.retention_days` ago.
    pub async fn sweep_retention(&self) -> Result<usize, ClawfounderError> {
        let days = i64::from(self.config.load().knowledge.retention_days);
        let cutoff = self.clock.now() - chrono::Duration::days(days);
        self.store.sweep_retention(cutoff).await
    }

    /// Checkpoint and close the database.
    pub async fn close(self) -> Result<(), ClawfounderError> {
        self.store.close().await
    }
}

fn check_config(config: &ClawfounderConfig) -> Result<(), ClawfounderError> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        ClawfounderError::Config(messages.join("; "))
    })
}
