//! clipsync command line entry point.
//!
//! `clipsync run` (the default) starts the monitor and speaks JSONL on
//! stdin/stdout. The other subcommands operate on the persisted history and
//! exit; `delete`, `clear` and `capture` refuse while a daemon owns the store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use clipsync::app::App;
use clipsync::clipboard_history::{
    filter_entries, format_age, image_dimensions, ArboardClipboard, ClipboardEntry,
    ClipboardMonitor, Clock, ContentKind, HistoryStore, JsonFileStorage, SystemClock,
    TickOutcome,
};
use clipsync::config::{load_config, Config};
use clipsync::instance_lock::{ensure_not_running, lock_path_for, InstanceLock};
use clipsync::keystroke::default_injector;
use clipsync::logging;
use clipsync::stdin_commands::start_stdin_listener;
use clipsync::surface::JsonlSurface;

#[derive(Debug, Parser)]
#[command(
    name = "clipsync",
    version,
    about = "Clipboard history manager with paste replay"
)]
struct Cli {
    /// Config file (default ~/.clipsync/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Monitor the clipboard and accept JSONL commands on stdin
    Run {
        /// Exit when stdin closes instead of monitoring on
        #[arg(long)]
        exit_on_stdin_close: bool,
    },
    /// Print the stored history, newest first
    List {
        /// Only entries containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete one entry by id
    Delete { id: i64 },
    /// Delete every entry
    Clear,
    /// Record the current clipboard text right now
    Capture,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run {
        exit_on_stdin_close: false,
    });

    let directive = match command {
        Commands::Run { .. } => "info",
        _ => "warn",
    };
    let _guard = logging::init(directive);

    let config = load_config(cli.config.as_deref());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut store = open_store(&config, Arc::clone(&clock));

    match command {
        Commands::Run {
            exit_on_stdin_close,
        } => {
            let _lock = InstanceLock::acquire(&lock_path_for(&config.get_storage_path()))?;
            info!(
                version = env!("CARGO_PKG_VERSION"),
                log_path = %logging::log_path().display(),
                "clipsync starting"
            );
            let mut app = App::new(
                &config,
                store,
                Box::new(ArboardClipboard::new()),
                default_injector(&config),
                JsonlSurface::stdout(Arc::clone(&clock)),
                clock,
            );
            app.run(start_stdin_listener(), exit_on_stdin_close);
        }
        Commands::List { filter, json } => {
            store.load();
            let entries = filter_entries(store.entries(), filter.as_deref().unwrap_or(""));
            if json {
                let out = serde_json::to_string_pretty(&entries)
                    .context("Failed to serialize history")?;
                println!("{}", out);
            } else {
                print_table(&entries, clock.now_millis());
            }
        }
        Commands::Delete { id } => {
            ensure_not_running(&config.get_storage_path())?;
            store.load();
            let before = store.len();
            store.remove_by_id(id);
            if store.len() == before {
                eprintln!("No entry with id {}", id);
            } else {
                println!("Deleted entry {}", id);
            }
        }
        Commands::Clear => {
            ensure_not_running(&config.get_storage_path())?;
            let removed = store.load().len();
            store.clear();
            println!("Cleared {} entries", removed);
        }
        Commands::Capture => {
            ensure_not_running(&config.get_storage_path())?;
            store.load();
            let mut monitor = ClipboardMonitor::from_config(&config, clock);
            match monitor.capture_now(&mut store, &mut ArboardClipboard::new()) {
                TickOutcome::Captured { entry_id } => println!("Captured entry {}", entry_id),
                TickOutcome::ReadFailed => bail!("Could not read the clipboard"),
                _ => println!("Clipboard has no text to capture"),
            }
        }
    }

    Ok(())
}

fn open_store(config: &Config, clock: Arc<dyn Clock>) -> HistoryStore {
    let storage = JsonFileStorage::new(config.get_storage_path());
    HistoryStore::from_config(config, Box::new(storage), clock)
}

fn print_table(entries: &[ClipboardEntry], now_ms: i64) {
    if entries.is_empty() {
        println!("No clipboard history");
        return;
    }

    for entry in entries {
        let captured = DateTime::<Utc>::from_timestamp_millis(entry.captured_at)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>15}  {}  {:<16}  {}",
            entry.id,
            captured,
            format_age(entry.captured_at, now_ms),
            display_preview(entry)
        );
    }
}

fn display_preview(entry: &ClipboardEntry) -> String {
    match entry.kind {
        ContentKind::Image => match image_dimensions(&entry.content) {
            Some((w, h)) => format!("{} ({}x{})", entry.preview, w, h),
            None => entry.preview.clone(),
        },
        ContentKind::Text => entry.preview.replace(['\n', '\r', '\t'], " "),
    }
}
