//! Clipboard change detection.
//!
//! The monitor is polled on a fixed interval by the app's scheduler. Each
//! tick compares the live clipboard with the last observed value and records
//! changes in the history store, unless a paste is in flight.
//!
//! # States
//!
//! - `Idle`: changes are captured.
//! - `Suppressed { until_ms }`: changes update the last observed value but are
//!   not captured. Entered when the paste dispatcher writes to the clipboard,
//!   left lazily once the clock reaches `until_ms`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::clipboard::SystemClipboard;
use super::clock::Clock;
use super::store::HistoryStore;
use super::types::ContentKind;
use crate::config::Config;
use crate::logging::redact_preview;

/// Log the first read failure and then every Nth in a row
const READ_ERROR_LOG_EVERY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Suppressed { until_ms: i64 },
}

/// What a single poll did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clipboard matches the last observed value
    Unchanged,
    /// New content was added to the history
    Captured { entry_id: i64 },
    /// Content changed during a suppression window and was not recorded
    Suppressed,
    /// Nothing capturable on the clipboard
    Empty,
    /// The clipboard could not be read; treated as no change
    ReadFailed,
}

pub struct ClipboardMonitor {
    clock: Arc<dyn Clock>,
    suppression_window: Duration,
    capture_images: bool,
    state: MonitorState,
    last_observed: Option<String>,
    last_image_marker: Option<String>,
    consecutive_errors: u32,
}

impl ClipboardMonitor {
    pub fn new(clock: Arc<dyn Clock>, suppression_window: Duration, capture_images: bool) -> Self {
        ClipboardMonitor {
            clock,
            suppression_window,
            capture_images,
            state: MonitorState::Idle,
            last_observed: None,
            last_image_marker: None,
            consecutive_errors: 0,
        }
    }

    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self::new(clock, config.get_suppression_window(), config.capture_images)
    }

    /// Current state, expiring a finished suppression window first
    pub fn state(&mut self) -> MonitorState {
        if let MonitorState::Suppressed { until_ms } = self.state {
            if self.clock.now_millis() >= until_ms {
                debug!("Suppression window expired");
                self.state = MonitorState::Idle;
            }
        }
        self.state
    }

    pub fn is_suppressed(&mut self) -> bool {
        matches!(self.state(), MonitorState::Suppressed { .. })
    }

    /// Ignore clipboard changes for the suppression window. Calling again
    /// while suppressed pushes the expiry out.
    pub fn suppress(&mut self) {
        let mut until_ms = self
            .clock
            .now_millis()
            .saturating_add(self.suppression_window.as_millis() as i64);
        if let MonitorState::Suppressed { until_ms: current } = self.state() {
            until_ms = until_ms.max(current);
        }
        debug!(until_ms, "Clipboard monitor suppressed");
        self.state = MonitorState::Suppressed { until_ms };
    }

    /// Remember content we wrote ourselves. The next poll may land after the
    /// suppression window, so the window alone does not cover our own write.
    pub fn record_own_write(&mut self, content: &str) {
        self.last_observed = Some(content.to_string());
    }

    /// Record whatever is on the clipboard now as already seen, so content
    /// from before start-up is not imported.
    #[instrument(name = "monitor_prime", skip_all)]
    pub fn prime(&mut self, clipboard: &mut dyn SystemClipboard) {
        match clipboard.read_text() {
            Ok(text) => {
                debug!(len = text.len(), "Primed last observed clipboard text");
                self.last_observed = Some(text);
            }
            Err(e) => warn!(error = %e, "Could not read clipboard at start-up"),
        }

        if self.capture_images {
            if let Ok(marker) = clipboard.read_image_marker() {
                self.last_image_marker = marker;
            }
        }
    }

    /// Poll the clipboard once
    pub fn tick(&mut self, store: &mut HistoryStore, clipboard: &mut dyn SystemClipboard) -> TickOutcome {
        let text = match clipboard.read_text() {
            Ok(text) => text,
            Err(e) => {
                self.consecutive_errors += 1;
                if self.consecutive_errors == 1 || self.consecutive_errors % READ_ERROR_LOG_EVERY == 0 {
                    warn!(
                        error = %e,
                        consecutive_errors = self.consecutive_errors,
                        "Failed to read clipboard"
                    );
                }
                return TickOutcome::ReadFailed;
            }
        };

        if self.consecutive_errors > 0 {
            info!(
                consecutive_errors = self.consecutive_errors,
                "Clipboard readable again"
            );
            self.consecutive_errors = 0;
        }

        if text.trim().is_empty() {
            return if self.capture_images {
                self.tick_image(store, clipboard)
            } else {
                TickOutcome::Empty
            };
        }

        if self.last_observed.as_deref() == Some(text.as_str()) {
            return TickOutcome::Unchanged;
        }

        if self.is_suppressed() {
            debug!(len = text.len(), "Clipboard changed while suppressed, not recording");
            self.last_observed = Some(text);
            return TickOutcome::Suppressed;
        }

        debug!(preview = %redact_preview(&text, 20), "Clipboard text changed");
        let entry_id = store
            .add(&text, ContentKind::Text)
            .first()
            .map(|entry| entry.id)
            .unwrap_or_default();
        self.last_observed = Some(text);
        TickOutcome::Captured { entry_id }
    }

    fn tick_image(&mut self, store: &mut HistoryStore, clipboard: &mut dyn SystemClipboard) -> TickOutcome {
        let marker = match clipboard.read_image_marker() {
            Ok(Some(marker)) => marker,
            Ok(None) => return TickOutcome::Empty,
            Err(e) => {
                debug!(error = %e, "Failed to read clipboard image");
                return TickOutcome::Empty;
            }
        };

        if self.last_image_marker.as_deref() == Some(marker.as_str()) {
            return TickOutcome::Unchanged;
        }

        if self.is_suppressed() {
            self.last_image_marker = Some(marker);
            return TickOutcome::Suppressed;
        }

        debug!(marker = %marker, "Clipboard image changed");
        let entry_id = store
            .add(&marker, ContentKind::Image)
            .first()
            .map(|entry| entry.id)
            .unwrap_or_default();
        self.last_image_marker = Some(marker);
        TickOutcome::Captured { entry_id }
    }

    /// Record the current clipboard text right away, even if it was already
    /// seen. An existing entry is bumped to the front.
    #[instrument(name = "monitor_capture_now", skip_all)]
    pub fn capture_now(&mut self, store: &mut HistoryStore, clipboard: &mut dyn SystemClipboard) -> TickOutcome {
        let text = match clipboard.read_text() {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Failed to read clipboard for manual capture");
                return TickOutcome::ReadFailed;
            }
        };

        if text.trim().is_empty() {
            info!("Manual capture found no text on the clipboard");
            return TickOutcome::Empty;
        }

        let entry_id = store
            .add(&text, ContentKind::Text)
            .first()
            .map(|entry| entry.id)
            .unwrap_or_default();
        self.last_observed = Some(text);
        info!(entry_id, "Manually captured clipboard text");
        TickOutcome::Captured { entry_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard_history::clock::ManualClock;
    use crate::clipboard_history::storage::MemoryStorage;
    use crate::clipboard_history::test_support::FakeClipboard;

    fn setup(capture_images: bool) -> (Arc<ManualClock>, HistoryStore, ClipboardMonitor) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let store = HistoryStore::new(Box::new(MemoryStorage::new()), clock.clone(), 50, 100);
        let monitor = ClipboardMonitor::new(clock.clone(), Duration::from_millis(500), capture_images);
        (clock, store, monitor)
    }

    #[test]
    fn test_tick_captures_new_text_once() {
        let (_clock, mut store, mut monitor) = setup(false);
        let mut clipboard = FakeClipboard::with_text("hello");

        assert!(matches!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Captured { .. }));
        assert_eq!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Unchanged);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_prime_skips_preexisting_content() {
        let (_clock, mut store, mut monitor) = setup(false);
        let mut clipboard = FakeClipboard::with_text("from before launch");

        monitor.prime(&mut clipboard);
        assert_eq!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Unchanged);
        assert!(store.is_empty());

        clipboard.set_external("new");
        assert!(matches!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Captured { .. }));
    }

    #[test]
    fn test_whitespace_only_text_is_empty() {
        let (_clock, mut store, mut monitor) = setup(false);
        let mut clipboard = FakeClipboard::with_text("  \n\t ");
        assert_eq!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Empty);
        assert!(store.is_empty());
    }

    #[test]
    fn test_suppression_expires_lazily() {
        let (clock, _store, mut monitor) = setup(false);
        monitor.suppress();
        assert_eq!(monitor.state(), MonitorState::Suppressed { until_ms: 1_000_500 });

        clock.advance(Duration::from_millis(499));
        assert!(monitor.is_suppressed());

        clock.advance(Duration::from_millis(1));
        assert_eq!(monitor.state(), MonitorState::Idle);
    }

    #[test]
    fn test_second_suppress_extends_window() {
        let (clock, _store, mut monitor) = setup(false);
        monitor.suppress();
        clock.advance(Duration::from_millis(300));
        monitor.suppress();
        assert_eq!(monitor.state(), MonitorState::Suppressed { until_ms: 1_000_800 });

        clock.advance(Duration::from_millis(300));
        assert!(monitor.is_suppressed());
    }

    #[test]
    fn test_change_during_suppression_is_observed_not_recorded() {
        let (clock, mut store, mut monitor) = setup(false);
        let mut clipboard = FakeClipboard::with_text("pasted");

        monitor.suppress();
        assert_eq!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Suppressed);

        clock.advance(Duration::from_millis(600));
        // Already observed while suppressed
        assert_eq!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Unchanged);
        assert!(store.is_empty());
    }

    #[test]
    fn test_own_write_not_captured_after_window() {
        let (clock, mut store, mut monitor) = setup(false);
        let mut clipboard = FakeClipboard::with_text("pasted");

        monitor.suppress();
        monitor.record_own_write("pasted");
        clock.advance(Duration::from_millis(1000));
        assert_eq!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Unchanged);
        assert!(store.is_empty());
    }

    #[test]
    fn test_read_failures_do_not_update_last_observed() {
        let (_clock, mut store, mut monitor) = setup(false);
        let mut clipboard = FakeClipboard::with_text("a");
        clipboard.fail_reads(true);

        for _ in 0..25 {
            assert_eq!(monitor.tick(&mut store, &mut clipboard), TickOutcome::ReadFailed);
        }
        assert_eq!(monitor.consecutive_errors, 25);

        clipboard.fail_reads(false);
        assert!(matches!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Captured { .. }));
        assert_eq!(monitor.consecutive_errors, 0);
    }

    #[test]
    fn test_image_capture_when_enabled() {
        let (_clock, mut store, mut monitor) = setup(true);
        let mut clipboard = FakeClipboard::default();
        clipboard.set_image_marker(Some("image:2x2:00112233aabbccdd".to_string()));

        assert!(matches!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Captured { .. }));
        assert_eq!(store.entries()[0].kind, ContentKind::Image);
        assert_eq!(store.entries()[0].preview, "Image");
        assert_eq!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Unchanged);
    }

    #[test]
    fn test_image_ignored_when_disabled() {
        let (_clock, mut store, mut monitor) = setup(false);
        let mut clipboard = FakeClipboard::default();
        clipboard.set_image_marker(Some("image:2x2:00112233aabbccdd".to_string()));

        assert_eq!(monitor.tick(&mut store, &mut clipboard), TickOutcome::Empty);
        assert!(store.is_empty());
    }

    #[test]
    fn test_capture_now_bumps_seen_content() {
        let (clock, mut store, mut monitor) = setup(false);
        let mut clipboard = FakeClipboard::with_text("a");
        monitor.tick(&mut store, &mut clipboard);
        clock.advance(Duration::from_millis(10));
        store.add("b", ContentKind::Text);

        assert!(matches!(
            monitor.capture_now(&mut store, &mut clipboard),
            TickOutcome::Captured { .. }
        ));
        assert_eq!(store.entries()[0].content, "a");
        assert_eq!(store.len(), 2);
    }
}
