//! In-memory doubles for the system clipboard, keystroke injector and
//! presentation surface.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;

use super::clipboard::SystemClipboard;
use super::types::ClipboardEntry;
use crate::error::{ClipsyncError, ErrorSeverity, Result};
use crate::keystroke::{KeystrokeError, KeystrokeInjector};
use crate::surface::PresentationSurface;

#[derive(Debug, Default)]
pub struct FakeClipboard {
    text: String,
    image_marker: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: Vec<String>,
}

impl FakeClipboard {
    pub fn with_text(text: &str) -> Self {
        FakeClipboard {
            text: text.to_string(),
            ..Self::default()
        }
    }

    /// Simulate another application copying `text`
    pub fn set_external(&mut self, text: &str) {
        self.text = text.to_string();
        self.image_marker = None;
    }

    pub fn set_image_marker(&mut self, marker: Option<String>) {
        self.text.clear();
        self.image_marker = marker;
    }

    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn writes(&self) -> &[String] {
        &self.writes
    }
}

impl SystemClipboard for FakeClipboard {
    fn read_text(&mut self) -> Result<String> {
        if self.fail_reads {
            return Err(ClipsyncError::Clipboard("simulated read failure".to_string()));
        }
        Ok(self.text.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.fail_writes {
            return Err(ClipsyncError::Clipboard("simulated write failure".to_string()));
        }
        self.text = text.to_string();
        self.image_marker = None;
        self.writes.push(text.to_string());
        Ok(())
    }

    fn read_image_marker(&mut self) -> Result<Option<String>> {
        if self.fail_reads {
            return Err(ClipsyncError::Clipboard("simulated read failure".to_string()));
        }
        Ok(self.image_marker.clone())
    }
}

/// Shared handle so a test can keep changing the clipboard after boxing it
#[derive(Debug, Clone, Default)]
pub struct SharedClipboard(pub Rc<RefCell<FakeClipboard>>);

impl SharedClipboard {
    pub fn with_text(text: &str) -> Self {
        SharedClipboard(Rc::new(RefCell::new(FakeClipboard::with_text(text))))
    }
}

impl SystemClipboard for SharedClipboard {
    fn read_text(&mut self) -> Result<String> {
        self.0.borrow_mut().read_text()
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.0.borrow_mut().write_text(text)
    }

    fn read_image_marker(&mut self) -> Result<Option<String>> {
        self.0.borrow_mut().read_image_marker()
    }
}

/// Counts keystrokes. Clones share the counter so a test can keep a handle
/// after boxing one into the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct RecordingInjector {
    sent: Arc<Mutex<u32>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u32 {
        *self.sent.lock()
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

impl KeystrokeInjector for RecordingInjector {
    fn send_paste_keystroke(&mut self) -> std::result::Result<(), KeystrokeError> {
        if *self.fail.lock() {
            return Err(KeystrokeError::Unavailable("simulated failure".to_string()));
        }
        *self.sent.lock() += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    History(Vec<i64>),
    Show,
    Hide,
    Notice(String),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
    visible: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hide_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == SurfaceCall::Hide).count()
    }
}

impl PresentationSurface for RecordingSurface {
    fn history_changed(&mut self, entries: &[ClipboardEntry]) {
        self.calls
            .push(SurfaceCall::History(entries.iter().map(|e| e.id).collect()));
    }

    fn show(&mut self) {
        self.visible = true;
        self.calls.push(SurfaceCall::Show);
    }

    fn hide(&mut self) {
        self.visible = false;
        self.calls.push(SurfaceCall::Hide);
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn notice(&mut self, _severity: ErrorSeverity, message: &str) {
        self.calls.push(SurfaceCall::Notice(message.to_string()));
    }
}
