// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ClawfounderConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing on the first.
pub fn validate_config(config: &ClawfounderConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.cache_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.cache_dir must not be empty".to_string(),
        });
    }

    let knowledge = &config.knowledge;
    if knowledge.retention_days == 0 {
        errors.push(ConfigError::Validation {
            message: "knowledge.retention_days must be at least 1".to_string(),
        });
    }

    for (name, value) in [
        ("snippet_length", knowledge.snippet_length),
        ("default_max_results", knowledge.default_max_results),
        ("quick_search_max_results", knowledge.quick_search_max_results),
        ("quick_title_length", knowledge.quick_title_length),
    ] {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("knowledge.{name} must be at least 1"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&ClawfounderConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_violations() {
        let mut config = ClawfounderConfig::default();
        config.knowledge.retention_days = 0;
        config.knowledge.snippet_length = 0;
        config.storage.cache_dir = "  ".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
