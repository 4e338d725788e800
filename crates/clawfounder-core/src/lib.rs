// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the ClawFounder knowledge subsystem.
//!
//! Provides the shared error type, the provider-neutral [`Tool`] trait used to
//! expose knowledge search to the model, and the [`Clock`] abstraction used by
//! every TTL and retention decision.

pub mod clock;
pub mod error;
pub mod tool;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ClawfounderError;
pub use tool::{Tool, ToolDefinition, ToolOutput};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_render() {
        let storage = ClawfounderError::storage(std::io::Error::other("disk gone"));
        assert_eq!(storage.to_string(), "storage error: disk gone");

        let cache = ClawfounderError::cache("write failed", std::io::Error::other("full"));
        assert_eq!(cache.to_string(), "cache error: write failed");

        let config = ClawfounderError::Config("bad".into());
        assert_eq!(config.to_string(), "configuration error: bad");
    }

    #[test]
    fn serde_errors_convert() {
        let err: ClawfounderError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ClawfounderError::Serialization(_)));
    }
}
