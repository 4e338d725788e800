// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short-TTL file caches shared by every ClawFounder agent process.
//!
//! [`ToolCache`] holds raw connector tool results under a content-addressed
//! key with per-connector TTLs. [`BriefingCache`] holds whole gathered
//! briefing bundles. Both live in one directory (`storage.cache_dir`) and
//! take time from an injected [`Clock`](clawfounder_core::Clock).

pub mod briefing;
mod entry;
pub mod key;
pub mod metrics;
pub mod tool_cache;

pub use briefing::BriefingCache;
pub use key::{briefing_key, cache_key};
pub use metrics::register_metrics;
pub use tool_cache::ToolCache;
