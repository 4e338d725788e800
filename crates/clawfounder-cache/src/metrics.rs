// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache metric registration and recording.

use metrics::describe_counter;

/// Register cache metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        "clawfounder_tool_cache_requests_total",
        "Cache lookups by cache kind and result (hit, miss, expired, corrupt)"
    );
}

pub(crate) fn record_lookup(cache: &'static str, result: &'static str) {
    metrics::counter!(
        "clawfounder_tool_cache_requests_total",
        "cache" => cache,
        "result" => result
    )
    .increment(1);
}
