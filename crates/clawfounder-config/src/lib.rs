// SPDX-FileCopyrightText: 2026 ClawFounder Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the ClawFounder knowledge subsystem.
//!
//! Defaults are compiled in; the JSON file on disk only holds the user's
//! overrides. Loading layers defaults, the override file and `CLAWFOUNDER_*`
//! environment variables through Figment. A corrupt override file never
//! fails a read: [`ConfigStore::get_config`] falls back to defaults.
//!
//! # Usage
//!
//! ```no_run
//! use clawfounder_config::ConfigStore;
//!
//! let store = ConfigStore::at_default_path();
//! let config = store.get_config();
//! println!("retention: {} days", config.knowledge.retention_days);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod store;
pub mod validation;

pub use diagnostic::ConfigError;
pub use loader::{default_config_path, load_config_from_path, load_config_from_str};
pub use model::{CacheConfig, ClawfounderConfig, KnowledgeConfig, StorageConfig};
pub use store::ConfigStore;
