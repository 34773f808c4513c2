//! Presentation surface.
//!
//! The core never draws anything itself. It tells a `PresentationSurface`
//! when the history changed and when to show or hide. The shipped surface,
//! `JsonlSurface`, writes one JSON event per line to stdout for a front-end
//! process (a popup window, a launcher plugin) to render.
//!
//! # Events
//!
//! ```json
//! {"type":"history","entries":[{"id":1,"content":"hi","kind":"text","capturedAt":1,"preview":"hi","age":"Just now"}],"total":1,"filter":""}
//! {"type":"visibility","visible":true}
//! {"type":"notice","level":"warning","message":"Content copied. Press Ctrl+V to paste."}
//! ```

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::clipboard_history::{filter_entries, format_age, ClipboardEntry, Clock};
use crate::error::{ErrorSeverity, ResultExt};

pub trait PresentationSurface {
    /// Full, unfiltered history after a change
    fn history_changed(&mut self, entries: &[ClipboardEntry]);
    fn show(&mut self);
    fn hide(&mut self);
    fn is_visible(&self) -> bool;
    /// Short message for the user (e.g. a paste that fell back to copy-only)
    fn notice(&mut self, _severity: ErrorSeverity, _message: &str) {}
}

/// A history entry as sent to the front-end
#[derive(Debug, Serialize)]
pub struct EntryView<'a> {
    #[serde(flatten)]
    pub entry: &'a ClipboardEntry,
    pub age: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceEvent<'a> {
    History {
        entries: Vec<EntryView<'a>>,
        total: usize,
        filter: &'a str,
    },
    Visibility {
        visible: bool,
    },
    Notice {
        level: &'static str,
        message: &'a str,
    },
}

/// Writes `SurfaceEvent`s as JSON lines
pub struct JsonlSurface<W: Write> {
    writer: W,
    clock: Arc<dyn Clock>,
    entries: Vec<ClipboardEntry>,
    filter: String,
    visible: bool,
}

impl JsonlSurface<std::io::Stdout> {
    pub fn stdout(clock: Arc<dyn Clock>) -> Self {
        Self::new(std::io::stdout(), clock)
    }
}

impl<W: Write> JsonlSurface<W> {
    pub fn new(writer: W, clock: Arc<dyn Clock>) -> Self {
        JsonlSurface {
            writer,
            clock,
            entries: Vec::new(),
            filter: String::new(),
            visible: false,
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Change the search term and resend the filtered list
    pub fn set_filter(&mut self, text: &str) {
        if self.filter != text {
            debug!(filter_len = text.len(), "Filter changed");
            self.filter = text.to_string();
        }
        self.emit_history();
    }

    /// Send the current (filtered) history
    pub fn emit_history(&mut self) {
        let now = self.clock.now_millis();
        let visible = filter_entries(&self.entries, &self.filter);
        let views = visible
            .iter()
            .map(|entry| EntryView {
                entry,
                age: format_age(entry.captured_at, now),
            })
            .collect();
        let event = SurfaceEvent::History {
            entries: views,
            total: self.entries.len(),
            filter: &self.filter,
        };
        write_event(&mut self.writer, &event).warn_on_err();
    }

    fn emit_visibility(&mut self) {
        let event = SurfaceEvent::Visibility {
            visible: self.visible,
        };
        write_event(&mut self.writer, &event).warn_on_err();
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn write_event<W: Write>(writer: &mut W, event: &SurfaceEvent<'_>) -> anyhow::Result<()> {
    let line = serde_json::to_string(event)?;
    writeln!(writer, "{}", line)?;
    writer.flush()?;
    Ok(())
}

impl<W: Write> PresentationSurface for JsonlSurface<W> {
    fn history_changed(&mut self, entries: &[ClipboardEntry]) {
        self.entries = entries.to_vec();
        self.emit_history();
    }

    fn show(&mut self) {
        self.visible = true;
        self.emit_history();
        self.emit_visibility();
    }

    fn hide(&mut self) {
        self.visible = false;
        self.emit_visibility();
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn notice(&mut self, severity: ErrorSeverity, message: &str) {
        let level = match severity {
            ErrorSeverity::Info => "info",
            ErrorSeverity::Warning => "warning",
            ErrorSeverity::Error => "error",
        };
        write_event(&mut self.writer, &SurfaceEvent::Notice { level, message }).warn_on_err();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard_history::{ContentKind, ManualClock};
    use serde_json::Value;

    const NOW: i64 = 10_000_000;

    fn surface() -> JsonlSurface<Vec<u8>> {
        JsonlSurface::new(Vec::new(), Arc::new(ManualClock::new(NOW)))
    }

    fn lines(surface: JsonlSurface<Vec<u8>>) -> Vec<Value> {
        let bytes = surface.into_inner();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn entry(id: i64, content: &str, captured_at: i64) -> ClipboardEntry {
        ClipboardEntry::new(id, content.to_string(), ContentKind::Text, captured_at, 100)
    }

    #[test]
    fn test_history_event_shape() {
        let mut surface = surface();
        surface.history_changed(&[entry(2, "second", NOW - 120_000), entry(1, "first", NOW)]);

        let events = lines(surface);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event["type"], "history");
        assert_eq!(event["total"], 2);
        assert_eq!(event["filter"], "");
        assert_eq!(event["entries"][0]["id"], 2);
        assert_eq!(event["entries"][0]["capturedAt"], NOW - 120_000);
        assert_eq!(event["entries"][0]["age"], "2 minutes ago");
        assert_eq!(event["entries"][1]["age"], "Just now");
    }

    #[test]
    fn test_filter_applies_to_entries_not_total() {
        let mut surface = surface();
        surface.history_changed(&[entry(2, "Apple pie", NOW), entry(1, "banana", NOW)]);
        surface.set_filter("APPLE");

        let events = lines(surface);
        let last = events.last().unwrap();
        assert_eq!(last["filter"], "APPLE");
        assert_eq!(last["total"], 2);
        assert_eq!(last["entries"].as_array().unwrap().len(), 1);
        assert_eq!(last["entries"][0]["content"], "Apple pie");
    }

    #[test]
    fn test_show_and_hide_emit_visibility() {
        let mut surface = surface();
        surface.show();
        assert!(surface.is_visible());
        surface.hide();
        assert!(!surface.is_visible());

        let events = lines(surface);
        let visibility: Vec<&Value> = events
            .iter()
            .filter(|e| e["type"] == "visibility")
            .collect();
        assert_eq!(visibility.len(), 2);
        assert_eq!(visibility[0]["visible"], true);
        assert_eq!(visibility[1]["visible"], false);
    }

    #[test]
    fn test_notice_event() {
        let mut surface = surface();
        surface.notice(ErrorSeverity::Warning, "Content copied.");
        let events = lines(surface);
        assert_eq!(events[0]["type"], "notice");
        assert_eq!(events[0]["level"], "warning");
        assert_eq!(events[0]["message"], "Content copied.");
    }
}
