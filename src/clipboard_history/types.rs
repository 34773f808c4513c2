//! Core clipboard history types

use serde::{Deserialize, Serialize};

/// Placeholder preview for image entries
pub const IMAGE_PREVIEW: &str = "Image";

/// Kind of captured clipboard content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image => "image",
        }
    }
}

/// One captured clipboard snapshot.
///
/// Field names on disk are camelCase. The legacy names `type` and `timestamp`
/// are accepted when reading older stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardEntry {
    /// Unique, strictly increasing handle (capture time in ms, bumped on collision)
    pub id: i64,
    /// Full captured text, or an image marker for `ContentKind::Image`
    pub content: String,
    #[serde(alias = "type")]
    pub kind: ContentKind,
    /// Capture wall-clock time in ms since epoch
    #[serde(alias = "timestamp")]
    pub captured_at: i64,
    /// Computed once at capture time; empty only in hand-edited stores
    #[serde(default)]
    pub preview: String,
}

impl ClipboardEntry {
    pub fn new(id: i64, content: String, kind: ContentKind, captured_at: i64, preview_chars: usize) -> Self {
        let preview = make_preview(&content, kind, preview_chars);
        ClipboardEntry {
            id,
            content,
            kind,
            captured_at,
            preview,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == ContentKind::Text
    }
}

/// Build the display preview: first `max_chars` characters for text, a fixed
/// placeholder for images.
pub fn make_preview(content: &str, kind: ContentKind, max_chars: usize) -> String {
    match kind {
        ContentKind::Text => content.chars().take(max_chars).collect(),
        ContentKind::Image => IMAGE_PREVIEW.to_string(),
    }
}

/// Human-readable age of an entry ("Just now", "3 minutes ago", "1 day ago").
///
/// Timestamps in the future (clock skew) read as "Just now".
pub fn format_age(captured_at_ms: i64, now_ms: i64) -> String {
    let seconds = now_ms.saturating_sub(captured_at_ms).max(0) / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let (value, unit) = if days > 0 {
        (days, "day")
    } else if hours > 0 {
        (hours, "hour")
    } else if minutes > 0 {
        (minutes, "minute")
    } else {
        return "Just now".to_string();
    };

    if value > 1 {
        format!("{} {}s ago", value, unit)
    } else {
        format!("{} {} ago", value, unit)
    }
}
