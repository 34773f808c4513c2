//! External command handling via stdin.
//!
//! The front-end (popup window, launcher plugin, global hotkey helper) drives
//! clipsync by writing JSON commands to its stdin, one per line.
//!
//! # Protocol
//!
//! ```json
//! {"type": "getHistory"}
//! {"type": "paste", "id": 1735122645123}
//! {"type": "copy", "id": 1735122645123}
//! {"type": "delete", "id": 1735122645123}
//! {"type": "clear"}
//! {"type": "show"}
//! {"type": "hide"}
//! {"type": "toggle"}
//! {"type": "setFilter", "text": "search term"}
//! {"type": "captureNow"}
//! {"type": "quit"}
//! ```
//!
//! # Example Usage
//!
//! ```bash
//! # Bind a global hotkey to toggle the popup
//! echo '{"type": "toggle"}' > /run/user/1000/clipsync.fifo
//!
//! # Paste an entry (id from a "history" event)
//! echo '{"type": "paste", "id": 1735122645123}' | clipsync run
//! ```

use std::io::BufRead;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, info, warn};

/// Bounded so a runaway writer cannot grow memory without limit
pub const COMMAND_CHANNEL_CAPACITY: usize = 100;

/// Commands accepted on stdin
///
/// Entry commands take an optional `requestId`, which is logged with the
/// operation for correlating front-end actions with log lines.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExternalCommand {
    /// Re-send the current history
    GetHistory,
    /// Paste an entry into the previously focused application
    Paste {
        id: i64,
        #[serde(default, rename = "requestId")]
        request_id: Option<String>,
    },
    /// Copy an entry to the clipboard without pasting
    Copy {
        id: i64,
        #[serde(default, rename = "requestId")]
        request_id: Option<String>,
    },
    /// Delete one entry
    Delete {
        id: i64,
        #[serde(default, rename = "requestId")]
        request_id: Option<String>,
    },
    /// Delete every entry
    Clear,
    Show,
    Hide,
    Toggle,
    /// Set the search term for history events
    SetFilter { text: String },
    /// Record the current clipboard immediately
    CaptureNow,
    Quit,
}

/// Parse one line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ExternalCommand>, serde_json::Error> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Start a thread that reads JSONL commands from stdin.
///
/// The receiver disconnects when stdin reaches EOF.
pub fn start_stdin_listener() -> Receiver<ExternalCommand> {
    let (tx, rx) = bounded(COMMAND_CHANNEL_CAPACITY);

    std::thread::spawn(move || {
        info!("External command listener started");
        let stdin = std::io::stdin();
        read_commands(stdin.lock(), &tx);
        info!("External command listener exiting");
    });

    rx
}

/// Forward parsed commands from `reader` until EOF, a read error, or the
/// receiver going away. Malformed lines are logged and skipped.
pub fn read_commands<R: BufRead>(reader: R, tx: &Sender<ExternalCommand>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Error reading stdin");
                break;
            }
        };

        match parse_command(&line) {
            Ok(Some(cmd)) => {
                debug!(command = ?cmd, "Parsed command");
                if tx.send(cmd).is_err() {
                    info!("Command channel closed, exiting");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, line_len = line.len(), "Failed to parse command");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_paste_deserialization() {
        let cmd: ExternalCommand = serde_json::from_str(r#"{"type": "paste", "id": 42}"#).unwrap();
        assert_eq!(
            cmd,
            ExternalCommand::Paste {
                id: 42,
                request_id: None
            }
        );
    }

    #[test]
    fn test_request_id_deserialization() {
        let json = r#"{"type": "delete", "id": 7, "requestId": "req-1"}"#;
        match serde_json::from_str::<ExternalCommand>(json).unwrap() {
            ExternalCommand::Delete { id, request_id } => {
                assert_eq!(id, 7);
                assert_eq!(request_id.as_deref(), Some("req-1"));
            }
            other => panic!("Expected Delete command, got {:?}", other),
        }
    }

    #[test]
    fn test_unit_commands_deserialization() {
        let cases = [
            (r#"{"type": "getHistory"}"#, ExternalCommand::GetHistory),
            (r#"{"type": "clear"}"#, ExternalCommand::Clear),
            (r#"{"type": "show"}"#, ExternalCommand::Show),
            (r#"{"type": "hide"}"#, ExternalCommand::Hide),
            (r#"{"type": "toggle"}"#, ExternalCommand::Toggle),
            (r#"{"type": "captureNow"}"#, ExternalCommand::CaptureNow),
            (r#"{"type": "quit"}"#, ExternalCommand::Quit),
        ];
        for (json, expected) in cases {
            assert_eq!(serde_json::from_str::<ExternalCommand>(json).unwrap(), expected);
        }
    }

    #[test]
    fn test_set_filter_deserialization() {
        let cmd: ExternalCommand =
            serde_json::from_str(r#"{"type": "setFilter", "text": "hello"}"#).unwrap();
        assert_eq!(
            cmd,
            ExternalCommand::SetFilter {
                text: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_commands_rejected() {
        assert!(parse_command(r#"{"type": "explode"}"#).is_err());
        assert!(parse_command(r#"{"type": "paste"}"#).is_err());
        assert!(parse_command(r#"{"type": "paste", "id": "1"}"#).is_err());
        assert!(parse_command("not json").is_err());
        assert!(parse_command("   ").unwrap().is_none());
    }

    #[test]
    fn test_read_commands_skips_bad_lines() {
        let input = "{\"type\": \"show\"}\n\nbroken\n{\"type\": \"paste\", \"id\": 3}\n";
        let (tx, rx) = bounded(COMMAND_CHANNEL_CAPACITY);
        read_commands(Cursor::new(input), &tx);
        drop(tx);

        let received: Vec<ExternalCommand> = rx.iter().collect();
        assert_eq!(
            received,
            vec![
                ExternalCommand::Show,
                ExternalCommand::Paste {
                    id: 3,
                    request_id: None
                }
            ]
        );
    }
}
