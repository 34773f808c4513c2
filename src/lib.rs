//! clipsync - clipboard history manager
//!
//! Polls the system clipboard, keeps a bounded, deduplicated, newest-first
//! history persisted as JSON, and replays entries into the focused
//! application as a clipboard write plus a synthetic paste keystroke.
//!
//! The UI is an external process: it receives history and visibility events
//! as JSONL on stdout and sends commands as JSONL on stdin.

pub mod app;
pub mod clipboard_history;
pub mod config;
pub mod error;
pub mod instance_lock;
pub mod keystroke;
pub mod logging;
pub mod scheduler;
pub mod stdin_commands;
pub mod surface;
