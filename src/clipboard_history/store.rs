//! History store: the single owner of the ordered clipboard entries.
//!
//! Entries are newest first, content is unique and the list never grows past
//! `max_size`. Every mutation is written through to `Storage` and then
//! broadcast to subscribers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::clock::Clock;
use super::storage::Storage;
use super::types::{make_preview, ClipboardEntry, ContentKind};
use crate::config::Config;
use crate::error::{ClipsyncError, ResultExt};

/// Storage key holding the history document
pub const HISTORY_KEY: &str = "clipboardHistory";

/// Version written into the history document
pub const SCHEMA_VERSION: u32 = 1;

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&[ClipboardEntry])>;

#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedHistory {
    Versioned {
        #[serde(rename = "schemaVersion")]
        schema_version: u32,
        entries: Vec<ClipboardEntry>,
    },
    Legacy(Vec<ClipboardEntry>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedHistoryRef<'a> {
    schema_version: u32,
    entries: &'a [ClipboardEntry],
}

pub struct HistoryStore {
    entries: Vec<ClipboardEntry>,
    max_size: usize,
    preview_chars: usize,
    storage: Box<dyn Storage>,
    clock: Arc<dyn Clock>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
    /// Highest id handed out so far, kept across deletes so ids never repeat
    last_id: i64,
}

impl HistoryStore {
    pub fn new(
        storage: Box<dyn Storage>,
        clock: Arc<dyn Clock>,
        max_size: usize,
        preview_chars: usize,
    ) -> Self {
        HistoryStore {
            entries: Vec::new(),
            max_size: max_size.max(1),
            preview_chars: preview_chars.max(1),
            storage,
            clock,
            listeners: Vec::new(),
            next_subscription: 1,
            last_id: 0,
        }
    }

    pub fn from_config(config: &Config, storage: Box<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            storage,
            clock,
            config.get_max_history_size(),
            config.get_preview_chars(),
        )
    }

    /// Replace in-memory state with what storage holds.
    ///
    /// Read or parse failures start an empty history. Over-cap lists and
    /// duplicate content are corrected silently (newest occurrence wins).
    #[instrument(name = "history_load", skip(self), fields(backend = self.storage.name()))]
    pub fn load(&mut self) -> &[ClipboardEntry] {
        self.entries = match self.read_persisted() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Failed to load clipboard history, starting empty");
                Vec::new()
            }
        };

        let before = self.entries.len();
        self.normalize();
        if self.entries.len() != before {
            info!(
                loaded = before,
                kept = self.entries.len(),
                "Corrected persisted clipboard history"
            );
        }

        self.last_id = self.entries.iter().map(|e| e.id).max().unwrap_or(0);
        info!(entry_count = self.entries.len(), "Loaded clipboard history");
        &self.entries
    }

    fn read_persisted(&self) -> Result<Vec<ClipboardEntry>, ClipsyncError> {
        let value = self
            .storage
            .get(HISTORY_KEY)
            .map_err(|e| ClipsyncError::Storage {
                key: HISTORY_KEY.to_string(),
                message: format!("{:#}", e),
            })?;

        let Some(value) = value else {
            debug!("No persisted clipboard history");
            return Ok(Vec::new());
        };

        match serde_json::from_value::<PersistedHistory>(value)? {
            PersistedHistory::Versioned {
                schema_version,
                entries,
            } => {
                if schema_version != SCHEMA_VERSION {
                    warn!(
                        schema_version,
                        expected = SCHEMA_VERSION,
                        "Unexpected history schema version, reading anyway"
                    );
                }
                Ok(entries)
            }
            PersistedHistory::Legacy(entries) => {
                info!(entry_count = entries.len(), "Migrating legacy clipboard history");
                Ok(entries)
            }
        }
    }

    fn normalize(&mut self) {
        let mut seen = std::collections::HashSet::new();
        let preview_chars = self.preview_chars;
        self.entries.retain_mut(|entry| {
            if entry.content.trim().is_empty() || !seen.insert(entry.content.clone()) {
                return false;
            }
            if entry.preview.is_empty() {
                entry.preview = make_preview(&entry.content, entry.kind, preview_chars);
            }
            true
        });
        self.entries.truncate(self.max_size);
    }

    /// Record new content at the front of the history.
    ///
    /// Whitespace-only content is ignored. Existing identical content is
    /// moved to the front with a fresh id and timestamp.
    #[instrument(name = "history_add", skip(self, content), fields(kind = kind.as_str(), len = content.len()))]
    pub fn add(&mut self, content: &str, kind: ContentKind) -> &[ClipboardEntry] {
        if content.trim().is_empty() {
            debug!("Ignoring empty clipboard content");
            return &self.entries;
        }

        if let Some(pos) = self.entries.iter().position(|e| e.content == content) {
            let previous = self.entries.remove(pos);
            debug!(previous_id = previous.id, position = pos, "Bumping duplicate entry");
        }

        let now = self.clock.now_millis();
        let id = now.max(self.last_id + 1);
        self.last_id = id;

        let entry = ClipboardEntry::new(id, content.to_string(), kind, now, self.preview_chars);
        self.entries.insert(0, entry);

        if self.entries.len() > self.max_size {
            let evicted = self.entries.len() - self.max_size;
            self.entries.truncate(self.max_size);
            debug!(evicted, max_size = self.max_size, "Evicted oldest entries");
        }

        info!(entry_id = id, entry_count = self.entries.len(), "Added clipboard entry");
        self.commit();
        &self.entries
    }

    /// Remove the entry with `id`. Unknown ids change nothing.
    #[instrument(name = "history_remove", skip(self))]
    pub fn remove_by_id(&mut self, id: i64) -> &[ClipboardEntry] {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                info!(entry_count = self.entries.len(), "Removed clipboard entry");
                self.commit();
            }
            None => debug!("No entry with this id"),
        }
        &self.entries
    }

    /// Drop every entry. Always persists, even when already empty.
    #[instrument(name = "history_clear", skip(self))]
    pub fn clear(&mut self) -> &[ClipboardEntry] {
        let removed = self.entries.len();
        self.entries.clear();
        info!(removed, "Cleared clipboard history");
        self.commit();
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<ClipboardEntry> {
        self.entries.clone()
    }

    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    pub fn get(&self, id: i64) -> Option<ClipboardEntry> {
        self.entries.iter().find(|e| e.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Register a listener called with the full history after every mutation
    pub fn subscribe(&mut self, listener: impl FnMut(&[ClipboardEntry]) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn commit(&mut self) {
        // In-memory state stays authoritative; the next mutation rewrites everything.
        self.persist().log_err();
        self.notify();
    }

    fn persist(&mut self) -> Result<(), ClipsyncError> {
        let value = serde_json::to_value(PersistedHistoryRef {
            schema_version: SCHEMA_VERSION,
            entries: &self.entries,
        })?;

        self.storage
            .set(HISTORY_KEY, value)
            .map_err(|e| ClipsyncError::Storage {
                key: HISTORY_KEY.to_string(),
                message: format!("{:#}", e),
            })
    }

    fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.entries);
        }
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("entries", &self.entries.len())
            .field("max_size", &self.max_size)
            .field("backend", &self.storage.name())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
