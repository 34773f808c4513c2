//! System clipboard access.
//!
//! `ArboardClipboard` holds one platform handle and drops it after any
//! failure, reopening on the next call. Some platforms (X11 in particular)
//! lose the connection when the owning window manager restarts.

use tracing::{debug, warn};

use super::image::image_marker;
use crate::error::{ClipsyncError, Result};

pub trait SystemClipboard {
    /// Current clipboard text. No text on the clipboard reads as `""`.
    fn read_text(&mut self) -> Result<String>;
    fn write_text(&mut self, text: &str) -> Result<()>;
    /// Marker for an image on the clipboard, `None` when there is none
    fn read_image_marker(&mut self) -> Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Default)]
pub struct ArboardClipboard {
    handle: Option<arboard::Clipboard>,
}

impl ArboardClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.handle.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipsyncError::Clipboard(format!("failed to open clipboard: {}", e)))?;
            debug!("Opened system clipboard");
            self.handle = Some(clipboard);
        }
        match self.handle.as_mut() {
            Some(handle) => Ok(handle),
            None => Err(ClipsyncError::Clipboard("clipboard handle unavailable".to_string())),
        }
    }

    fn reset(&mut self, error: &arboard::Error) {
        warn!(error = %error, "Clipboard operation failed, handle will be reopened");
        self.handle = None;
    }
}

impl SystemClipboard for ArboardClipboard {
    fn read_text(&mut self) -> Result<String> {
        let result = self.handle()?.get_text();
        match result {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => {
                self.reset(&e);
                Err(ClipsyncError::Clipboard(e.to_string()))
            }
        }
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let result = self.handle()?.set_text(text.to_string());
        result.map_err(|e| {
            self.reset(&e);
            ClipsyncError::Clipboard(e.to_string())
        })
    }

    fn read_image_marker(&mut self) -> Result<Option<String>> {
        let result = self.handle()?.get_image();
        match result {
            Ok(image) => Ok(Some(image_marker(image.width, image.height, &image.bytes))),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => {
                self.reset(&e);
                Err(ClipsyncError::Clipboard(e.to_string()))
            }
        }
    }
}

#[cfg(all(test, feature = "system-tests"))]
mod system_tests {
    use super::*;

    #[test]
    fn test_write_then_read_text() {
        let mut clipboard = ArboardClipboard::new();
        let marker = format!("clipsync-system-test-{}", std::process::id());
        clipboard.write_text(&marker).unwrap();
        assert_eq!(clipboard.read_text().unwrap(), marker);
    }
}
