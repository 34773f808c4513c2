use thiserror::Error;
use tracing::{error, warn};

/// Error severity, used to pick the log level when an error is swallowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,    // expected, nothing to do
    Warning, // recoverable, operation degraded
    Error,   // operation failed
}

/// Paste shortcut named in user-facing messages
#[cfg(target_os = "macos")]
pub const PASTE_SHORTCUT: &str = "Cmd+V";
#[cfg(not(target_os = "macos"))]
pub const PASTE_SHORTCUT: &str = "Ctrl+V";

/// Domain-specific errors for clipsync
#[derive(Error, Debug)]
pub enum ClipsyncError {
    #[error("Storage error for key '{key}': {message}")]
    Storage { key: String, message: String },

    #[error("Failed to encode or decode stored data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Paste keystroke failed: {0}")]
    Keystroke(#[from] crate::keystroke::KeystrokeError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClipsyncError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Storage { .. } => ErrorSeverity::Error,
            Self::Serialization(_) => ErrorSeverity::Warning,
            Self::Io { .. } => ErrorSeverity::Error,
            Self::Clipboard(_) => ErrorSeverity::Warning,
            Self::Keystroke(_) => ErrorSeverity::Warning,
            Self::Config(_) => ErrorSeverity::Warning,
        }
    }

    /// Short message for the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage { key, .. } => format!("Could not save '{}'", key),
            Self::Serialization(e) => format!("Stored data is unreadable: {}", e),
            Self::Io { path, .. } => format!("Could not access {}", path),
            Self::Clipboard(msg) => format!("Clipboard unavailable: {}", msg),
            Self::Keystroke(_) => format!("Content copied. Press {} to paste.", PASTE_SHORTCUT),
            Self::Config(msg) => format!("Configuration issue: {}", msg),
        }
    }

    pub(crate) fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClipsyncError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use clipsync::error::ResultExt;
///
/// // Log and continue if the keystroke could not be sent
/// injector.send_paste_keystroke().warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_message_names_key() {
        let err = ClipsyncError::Storage {
            key: "clipboardHistory".to_string(),
            message: "disk full".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Storage error for key 'clipboardHistory': disk full"
        );
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_serde_error_converts() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("nope");
        let err: ClipsyncError = parse.unwrap_err().into();
        assert!(matches!(err, ClipsyncError::Serialization(_)));
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_keystroke_message_names_platform_shortcut() {
        let err = ClipsyncError::from(crate::keystroke::KeystrokeError::Unavailable(
            "no display".to_string(),
        ));
        let message = err.user_message();
        #[cfg(target_os = "macos")]
        assert_eq!(message, "Content copied. Press Cmd+V to paste.");
        #[cfg(not(target_os = "macos"))]
        assert_eq!(message, "Content copied. Press Ctrl+V to paste.");
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_log_err_returns_value_on_ok() {
        let ok: std::result::Result<u8, String> = Ok(7);
        assert_eq!(ok.log_err(), Some(7));

        let err: std::result::Result<u8, String> = Err("boom".to_string());
        assert_eq!(err.warn_on_err(), None);
    }
}
