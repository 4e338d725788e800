// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder these are no-ops.

use metrics::{describe_counter, describe_histogram};

/// Register knowledge-store metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "clawfounder_knowledge_items_indexed_total",
        "Knowledge items written from connector tool results"
    );
    describe_counter!(
        "clawfounder_knowledge_searches_total",
        "Knowledge searches served, by kind"
    );
    describe_histogram!(
        "clawfounder_knowledge_search_hits",
        "Number of hits returned per knowledge search"
    );
}

/// Record items written for one connector.
pub fn record_indexed(connector: &str, items: usize) {
    metrics::counter!("clawfounder_knowledge_items_indexed_total", "connector" => connector.to_string())
        .increment(items as u64);
}

/// Record a search of the given kind (`search`, `quick`).
pub fn record_search(kind: &'static str, hits: usize) {
    metrics::counter!("clawfounder_knowledge_searches_total", "kind" => kind).increment(1);
    metrics::histogram!("clawfounder_knowledge_search_hits", "kind" => kind).record(hits as f64);
}
