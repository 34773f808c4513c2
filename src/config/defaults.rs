//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Maximum number of entries kept in the history
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 50;

/// Clipboard poll interval
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// How long monitor captures stay suppressed after a programmatic paste
pub const DEFAULT_SUPPRESSION_WINDOW_MS: u64 = 500;

/// Delay between the clipboard write and the synthetic paste keystroke
pub const DEFAULT_PASTE_DELAY_MS: u64 = 100;

/// Number of characters kept in a text entry's preview
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

/// Built-in feature flags
pub const DEFAULT_CAPTURE_IMAGES: bool = false;
pub const DEFAULT_AUTO_PASTE: bool = true;

/// Default location of the history store
pub const DEFAULT_STORAGE_PATH: &str = "~/.clipsync/store.json";

/// Default location of the config file
pub const DEFAULT_CONFIG_PATH: &str = "~/.clipsync/config.json";
