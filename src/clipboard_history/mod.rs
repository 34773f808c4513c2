//! Clipboard History Module
//!
//! Bounded, deduplicated clipboard history with polling capture and paste
//! replay.
//!
//! ## Features
//! - Newest-first history, unique content, capped at `maxHistorySize`
//! - Write-through persistence to a JSON key-value store
//! - Polling monitor with a suppression window around our own pastes
//! - Paste replay (clipboard write + synthetic keystroke) and copy-only
//! - Case-insensitive filtering and relative age labels
//!
//! ## Module Structure
//! - `types`: Core types (ContentKind, ClipboardEntry, previews, ages)
//! - `clock`: Injected time source
//! - `storage`: Key-value backends (JSON file, in-memory)
//! - `store`: The history store
//! - `filter`: Search
//! - `clipboard`: System clipboard access
//! - `image`: Image markers
//! - `monitor`: Change detection state machine
//! - `paste`: Paste dispatcher

mod clipboard;
mod clock;
mod filter;
mod image;
mod monitor;
mod paste;
mod storage;
mod store;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use clipboard::{ArboardClipboard, SystemClipboard};
pub use clock::{Clock, ManualClock, SystemClock};
pub use filter::filter_entries;
pub use image::{image_marker, parse_dimensions as image_dimensions};
pub use monitor::{ClipboardMonitor, MonitorState, TickOutcome};
pub use paste::{PasteDispatcher, PasteOutcome};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};
pub use store::{HistoryStore, SubscriptionId, HISTORY_KEY, SCHEMA_VERSION};
pub use types::{format_age, make_preview, ClipboardEntry, ContentKind, IMAGE_PREVIEW};
