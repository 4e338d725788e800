// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-connector knowledge store for the ClawFounder agent.
//!
//! Every connector tool result is offered to [`KnowledgeBase::index`]. JSON
//! results from known connector families are turned into knowledge items,
//! the people, repos, topics and tickers they mention are deduplicated into
//! entities, and everything lands in one SQLite database shared by all agent
//! processes. Reads combine FTS5 full-text matches with entity-substring
//! matches.
//!
//! ## Architecture
//!
//! - **ExtractorRegistry**: per-family extractors (email, GitHub, Telegram,
//!   finance, Firebase, Supabase)
//! - **EntityCache**: normalization and process-local entity-id cache
//! - **KnowledgeStore**: upserts with hand-synced FTS5, retention, reset
//! - **Query engine**: hybrid `search`, batched `quick_search`, summary
//! - **SearchKnowledgeTool**: the `search_knowledge` tool for the model
//! - **KnowledgeBase**: the per-process context object tying it together

pub mod base;
pub mod database;
pub mod dates;
pub mod extract;
pub mod metrics;
pub mod migrations;
pub mod normalize;
pub mod query;
pub mod store;
pub mod summary;
pub mod text;
pub mod tool;
pub mod types;

pub use base::KnowledgeBase;
pub use database::Database;
pub use extract::{ConnectorFamily, ExtractContext, Extractor, ExtractorRegistry};
pub use normalize::{normalize, EntityCache, PendingEntities};
pub use query::quick_candidates;
pub use store::KnowledgeStore;
pub use tool::{search_knowledge_definition, SearchKnowledgeTool};
pub use types::*;
