//! The clipsync event loop.
//!
//! Everything runs on one thread. The clipboard poll and the deferred paste
//! keystroke are timer tasks on a `Scheduler`; inbound commands come from
//! the stdin reader thread over a bounded channel. Each loop iteration runs
//! whatever is due, then waits for a command until the next deadline.

use std::cell::RefCell;
use std::io::Write;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info, instrument};

use crate::clipboard_history::{
    ClipboardMonitor, Clock, HistoryStore, PasteDispatcher, PasteOutcome, SystemClipboard,
};
use crate::config::Config;
use crate::error::{ClipsyncError, ErrorSeverity};
use crate::keystroke::KeystrokeInjector;
use crate::scheduler::Scheduler;
use crate::stdin_commands::ExternalCommand;
use crate::surface::{JsonlSurface, PresentationSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Recurring clipboard poll
    PollClipboard,
    /// One-shot paste shortcut after a clipboard write
    SendPasteKeystroke { entry_id: i64 },
}

pub struct App<W: Write + 'static> {
    store: HistoryStore,
    monitor: ClipboardMonitor,
    dispatcher: PasteDispatcher,
    clipboard: Box<dyn SystemClipboard>,
    surface: Rc<RefCell<JsonlSurface<W>>>,
    scheduler: Scheduler<Task>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
}

impl<W: Write + 'static> App<W> {
    pub fn new(
        config: &Config,
        mut store: HistoryStore,
        clipboard: Box<dyn SystemClipboard>,
        injector: Box<dyn KeystrokeInjector>,
        surface: JsonlSurface<W>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let surface = Rc::new(RefCell::new(surface));
        let listener_surface = Rc::clone(&surface);
        store.subscribe(move |entries| listener_surface.borrow_mut().history_changed(entries));

        App {
            store,
            monitor: ClipboardMonitor::from_config(config, Arc::clone(&clock)),
            dispatcher: PasteDispatcher::from_config(config, injector),
            clipboard,
            surface,
            scheduler: Scheduler::new(),
            clock,
            poll_interval: config.get_poll_interval(),
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn surface(&self) -> Rc<RefCell<JsonlSurface<W>>> {
        Rc::clone(&self.surface)
    }

    /// Load history, publish it, prime the monitor and schedule the first poll
    #[instrument(name = "app_start", skip(self))]
    pub fn start(&mut self) {
        let entries = self.store.load().to_vec();
        self.surface.borrow_mut().history_changed(&entries);
        self.monitor.prime(self.clipboard.as_mut());

        let now = self.clock.now_millis();
        self.scheduler.schedule_at(now, Task::PollClipboard);
        info!(
            entry_count = entries.len(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Clipboard monitoring started"
        );
    }

    /// Run the loop until `quit`, or until stdin closes when
    /// `exit_on_stdin_close` is set. Without it, monitoring continues after
    /// stdin closes.
    pub fn run(&mut self, commands: Receiver<ExternalCommand>, exit_on_stdin_close: bool) {
        self.start();
        let mut stdin_open = true;

        loop {
            self.run_due_tasks();

            let timeout = self
                .scheduler
                .time_until_next(self.clock.now_millis())
                .unwrap_or(self.poll_interval);

            if !stdin_open {
                std::thread::sleep(timeout);
                continue;
            }

            match commands.recv_timeout(timeout) {
                Ok(cmd) => {
                    if self.handle_command(cmd).is_break() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    if exit_on_stdin_close {
                        info!("stdin closed, exiting");
                        break;
                    }
                    info!("stdin closed, clipboard monitoring continues");
                    stdin_open = false;
                }
            }
        }

        info!(entry_count = self.store.len(), "clipsync shutting down");
    }

    /// Run every task whose deadline has passed
    pub fn run_due_tasks(&mut self) {
        while let Some(task) = self.scheduler.pop_due(self.clock.now_millis()) {
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::PollClipboard => {
                let outcome = self.monitor.tick(&mut self.store, self.clipboard.as_mut());
                debug!(outcome = ?outcome, "Clipboard poll");
                self.scheduler.schedule_after(
                    self.clock.now_millis(),
                    self.poll_interval,
                    Task::PollClipboard,
                );
            }
            Task::SendPasteKeystroke { entry_id } => {
                if let Err(e) = self.dispatcher.fire_keystroke(entry_id) {
                    let error = ClipsyncError::from(e);
                    self.surface
                        .borrow_mut()
                        .notice(error.severity(), &error.user_message());
                }
            }
        }
    }

    pub fn handle_command(&mut self, cmd: ExternalCommand) -> ControlFlow<()> {
        debug!(command = ?cmd, "Handling command");
        match cmd {
            ExternalCommand::GetHistory => self.surface.borrow_mut().emit_history(),
            ExternalCommand::Paste { id, request_id } => {
                info!(id, request_id = ?request_id, "Paste requested");
                let outcome = self.dispatcher.paste(
                    id,
                    &self.store,
                    &mut self.monitor,
                    self.clipboard.as_mut(),
                    &mut *self.surface.borrow_mut(),
                );
                self.after_write(outcome);
            }
            ExternalCommand::Copy { id, request_id } => {
                info!(id, request_id = ?request_id, "Copy requested");
                let outcome =
                    self.dispatcher
                        .copy(id, &self.store, &mut self.monitor, self.clipboard.as_mut());
                self.after_write(outcome);
            }
            ExternalCommand::Delete { id, request_id } => {
                info!(id, request_id = ?request_id, "Delete requested");
                self.store.remove_by_id(id);
            }
            ExternalCommand::Clear => {
                self.store.clear();
            }
            ExternalCommand::Show => self.surface.borrow_mut().show(),
            ExternalCommand::Hide => self.surface.borrow_mut().hide(),
            ExternalCommand::Toggle => {
                let mut surface = self.surface.borrow_mut();
                if surface.is_visible() {
                    surface.hide();
                } else {
                    surface.show();
                }
            }
            ExternalCommand::SetFilter { text } => self.surface.borrow_mut().set_filter(&text),
            ExternalCommand::CaptureNow => {
                self.monitor
                    .capture_now(&mut self.store, self.clipboard.as_mut());
            }
            ExternalCommand::Quit => {
                info!("Quit requested");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn after_write(&mut self, outcome: PasteOutcome) {
        let notice = match outcome {
            PasteOutcome::KeystrokePending { entry_id, delay } => {
                self.scheduler.schedule_after(
                    self.clock.now_millis(),
                    delay,
                    Task::SendPasteKeystroke { entry_id },
                );
                None
            }
            PasteOutcome::NotFound => None,
            PasteOutcome::ClipboardOnly { .. } => {
                Some((ErrorSeverity::Info, "Copied to clipboard"))
            }
            PasteOutcome::WriteFailed { .. } => {
                Some((ErrorSeverity::Error, "Could not write to the clipboard"))
            }
            PasteOutcome::ImageSkipped { .. } => {
                Some((ErrorSeverity::Warning, "Image entries cannot be pasted"))
            }
        };

        if let Some((severity, message)) = notice {
            self.surface.borrow_mut().notice(severity, message);
        }
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
