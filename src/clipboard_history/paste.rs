//! Replaying a history entry into the focused application.
//!
//! A paste writes the entry back to the system clipboard, hides the surface
//! so focus returns to the previous window, and then (after `paste_delay`)
//! presses the paste shortcut. The monitor is suppressed first so the write
//! is not captured as a new entry. The history order is left alone.

use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use super::clipboard::SystemClipboard;
use super::monitor::ClipboardMonitor;
use super::store::HistoryStore;
use super::types::ClipboardEntry;
use crate::config::Config;
use crate::keystroke::{KeystrokeError, KeystrokeInjector};
use crate::surface::PresentationSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteOutcome {
    /// No entry with that id
    NotFound,
    /// Clipboard written; the caller must call `fire_keystroke` after `delay`
    KeystrokePending { entry_id: i64, delay: Duration },
    /// Clipboard written, no keystroke will follow
    ClipboardOnly { entry_id: i64 },
    /// The clipboard write failed; nothing else was attempted
    WriteFailed { entry_id: i64 },
    /// Image entries hold only a marker and cannot be written back
    ImageSkipped { entry_id: i64 },
}

pub struct PasteDispatcher {
    injector: Box<dyn KeystrokeInjector>,
    paste_delay: Duration,
    auto_paste: bool,
}

impl PasteDispatcher {
    pub fn new(injector: Box<dyn KeystrokeInjector>, paste_delay: Duration, auto_paste: bool) -> Self {
        PasteDispatcher {
            injector,
            paste_delay,
            auto_paste,
        }
    }

    pub fn from_config(config: &Config, injector: Box<dyn KeystrokeInjector>) -> Self {
        Self::new(injector, config.get_paste_delay(), config.auto_paste)
    }

    pub fn paste_delay(&self) -> Duration {
        self.paste_delay
    }

    /// Paste entry `id`: suppress, write, hide, then hand back the pending
    /// keystroke for the caller to schedule.
    #[instrument(name = "paste", skip(self, store, monitor, clipboard, surface))]
    pub fn paste(
        &mut self,
        id: i64,
        store: &HistoryStore,
        monitor: &mut ClipboardMonitor,
        clipboard: &mut dyn SystemClipboard,
        surface: &mut dyn PresentationSurface,
    ) -> PasteOutcome {
        let Some(entry) = store.get(id) else {
            debug!("Paste requested for unknown entry");
            return PasteOutcome::NotFound;
        };

        let outcome = match write_entry(&entry, monitor, clipboard) {
            WriteResult::Written if self.auto_paste => PasteOutcome::KeystrokePending {
                entry_id: entry.id,
                delay: self.paste_delay,
            },
            WriteResult::Written => PasteOutcome::ClipboardOnly { entry_id: entry.id },
            WriteResult::Failed => PasteOutcome::WriteFailed { entry_id: entry.id },
            WriteResult::Image => PasteOutcome::ImageSkipped { entry_id: entry.id },
        };

        surface.hide();
        info!(outcome = ?outcome, "Paste dispatched");
        outcome
    }

    /// Copy entry `id` to the clipboard without pasting or hiding
    #[instrument(name = "copy", skip(self, store, monitor, clipboard))]
    pub fn copy(
        &mut self,
        id: i64,
        store: &HistoryStore,
        monitor: &mut ClipboardMonitor,
        clipboard: &mut dyn SystemClipboard,
    ) -> PasteOutcome {
        let Some(entry) = store.get(id) else {
            debug!("Copy requested for unknown entry");
            return PasteOutcome::NotFound;
        };

        match write_entry(&entry, monitor, clipboard) {
            WriteResult::Written => {
                info!(entry_id = entry.id, "Copied entry to clipboard");
                PasteOutcome::ClipboardOnly { entry_id: entry.id }
            }
            WriteResult::Failed => PasteOutcome::WriteFailed { entry_id: entry.id },
            WriteResult::Image => PasteOutcome::ImageSkipped { entry_id: entry.id },
        }
    }

    /// Press the paste shortcut for a pending paste. Failures leave the
    /// clipboard as written, so the user can still paste by hand.
    #[instrument(name = "paste_keystroke", skip(self), fields(injector = self.injector.name()))]
    pub fn fire_keystroke(&mut self, entry_id: i64) -> Result<(), KeystrokeError> {
        match self.injector.send_paste_keystroke() {
            Ok(()) => {
                debug!("Paste keystroke sent");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Paste keystroke failed, content remains on clipboard");
                Err(e)
            }
        }
    }
}

enum WriteResult {
    Written,
    Failed,
    Image,
}

fn write_entry(
    entry: &ClipboardEntry,
    monitor: &mut ClipboardMonitor,
    clipboard: &mut dyn SystemClipboard,
) -> WriteResult {
    if !entry.is_text() {
        warn!(entry_id = entry.id, "Image entries cannot be written back to the clipboard");
        return WriteResult::Image;
    }

    monitor.suppress();
    match clipboard.write_text(&entry.content) {
        Ok(()) => {
            monitor.record_own_write(&entry.content);
            WriteResult::Written
        }
        Err(e) => {
            error!(entry_id = entry.id, error = %e, "Failed to write entry to clipboard");
            WriteResult::Failed
        }
    }
}

impl std::fmt::Debug for PasteDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasteDispatcher")
            .field("injector", &self.injector.name())
            .field("paste_delay", &self.paste_delay)
            .field("auto_paste", &self.auto_paste)
            .finish()
    }
}
