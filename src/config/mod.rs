//! Configuration module - Application settings
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.clipsync/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definition (Config)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{
    DEFAULT_MAX_HISTORY_SIZE, DEFAULT_PASTE_DELAY_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_PREVIEW_CHARS, DEFAULT_SUPPRESSION_WINDOW_MS,
};

pub use types::Config;

pub use loader::{default_config_path, load_config, read_config};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
