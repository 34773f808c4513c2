//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::*;

/// Application configuration, read from ~/.clipsync/config.json
///
/// Every field is optional in the file; missing fields take the defaults
/// from `defaults.rs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Maximum number of history entries (default: 50)
    #[serde(default = "default_max_history_size")]
    pub max_history_size: usize,
    /// Clipboard poll interval in milliseconds (default: 1000)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Suppression window after a programmatic paste in milliseconds (default: 500)
    #[serde(default = "default_suppression_window_ms")]
    pub suppression_window_ms: u64,
    /// Delay before the synthetic paste keystroke in milliseconds (default: 100)
    #[serde(default = "default_paste_delay_ms")]
    pub paste_delay_ms: u64,
    /// Characters kept in a text preview (default: 100)
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// Record image markers when the clipboard holds an image (default: false)
    #[serde(default = "default_capture_images")]
    pub capture_images: bool,
    /// Send a paste keystroke after writing the clipboard (default: true)
    /// If false, paste only places the content on the clipboard
    #[serde(default = "default_auto_paste")]
    pub auto_paste: bool,
    /// Command used to synthesize the paste keystroke, e.g. ["wtype", "-M", "ctrl", "v"]
    /// Platform default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paste_command: Option<Vec<String>>,
    /// Location of the history store file, `~` is expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
}

fn default_max_history_size() -> usize {
    DEFAULT_MAX_HISTORY_SIZE
}
fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
fn default_suppression_window_ms() -> u64 {
    DEFAULT_SUPPRESSION_WINDOW_MS
}
fn default_paste_delay_ms() -> u64 {
    DEFAULT_PASTE_DELAY_MS
}
fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}
fn default_capture_images() -> bool {
    DEFAULT_CAPTURE_IMAGES
}
fn default_auto_paste() -> bool {
    DEFAULT_AUTO_PASTE
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            suppression_window_ms: DEFAULT_SUPPRESSION_WINDOW_MS,
            paste_delay_ms: DEFAULT_PASTE_DELAY_MS,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            capture_images: DEFAULT_CAPTURE_IMAGES,
            auto_paste: DEFAULT_AUTO_PASTE,
            paste_command: None,
            storage_path: None,
        }
    }
}

impl Config {
    /// Returns the history cap, never below 1
    pub fn get_max_history_size(&self) -> usize {
        self.max_history_size.max(1)
    }

    /// Returns the poll interval, never below 1ms
    pub fn get_poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Returns the suppression window, never below 1ms
    pub fn get_suppression_window(&self) -> Duration {
        Duration::from_millis(self.suppression_window_ms.max(1))
    }

    /// Returns the keystroke delay (zero allowed)
    pub fn get_paste_delay(&self) -> Duration {
        Duration::from_millis(self.paste_delay_ms)
    }

    /// Returns the preview length, never below 1 character
    pub fn get_preview_chars(&self) -> usize {
        self.preview_chars.max(1)
    }

    /// Returns the expanded storage path, or the default (~/.clipsync/store.json)
    pub fn get_storage_path(&self) -> PathBuf {
        let raw = self.storage_path.as_deref().unwrap_or(DEFAULT_STORAGE_PATH);
        PathBuf::from(shellexpand::tilde(raw).as_ref())
    }

    /// Returns the configured paste command if it names a program
    pub fn get_paste_command(&self) -> Option<&[String]> {
        self.paste_command
            .as_deref()
            .filter(|argv| argv.first().is_some_and(|program| !program.trim().is_empty()))
    }
}
