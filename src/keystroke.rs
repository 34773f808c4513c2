//! Synthetic paste keystroke injection.
//!
//! The paste dispatcher only needs "press the platform paste shortcut once".
//! How that happens depends on the desktop:
//!
//! - **macOS**: Cmd+V posted through Core Graphics (needs Accessibility permission)
//! - **Linux/X11**: `xdotool key ctrl+v`
//! - **Anything else**: a configured command (`pasteCommand`), e.g. `wtype` on Wayland
//!
//! With `autoPaste` off the injector is disabled and pasting degrades to
//! "content copied, press the shortcut yourself".

use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

#[derive(Error, Debug)]
pub enum KeystrokeError {
    #[error("keystroke injection unavailable: {0}")]
    Unavailable(String),

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}")]
    Failed { program: String, status: String },
}

pub trait KeystrokeInjector {
    /// Press the paste shortcut once in the focused application
    fn send_paste_keystroke(&mut self) -> Result<(), KeystrokeError>;
    fn name(&self) -> &'static str;
}

/// Runs an external program, e.g. `xdotool key ctrl+v`
#[derive(Debug, Clone)]
pub struct CommandInjector {
    program: String,
    args: Vec<String>,
}

impl CommandInjector {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandInjector {
            program: program.into(),
            args,
        }
    }

    /// Build from a full argv; `None` for an empty slice
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn xdotool() -> Self {
        Self::new("xdotool", vec!["key".to_string(), "ctrl+v".to_string()])
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl KeystrokeInjector for CommandInjector {
    fn send_paste_keystroke(&mut self) -> Result<(), KeystrokeError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| KeystrokeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(KeystrokeError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }

        debug!(program = %self.program, "Sent paste keystroke via command");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Cmd+V via Core Graphics events
#[cfg(target_os = "macos")]
#[derive(Debug, Default, Clone, Copy)]
pub struct CoreGraphicsInjector;

#[cfg(target_os = "macos")]
impl KeystrokeInjector for CoreGraphicsInjector {
    fn send_paste_keystroke(&mut self) -> Result<(), KeystrokeError> {
        use core_graphics::event::{CGEvent, CGEventFlags, CGEventTapLocation, CGKeyCode};
        use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};

        // 'v' key is keycode 9 on macOS
        const KEY_V: CGKeyCode = 9;

        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| KeystrokeError::Unavailable("failed to create CGEventSource".to_string()))?;

        let key_down = CGEvent::new_keyboard_event(source.clone(), KEY_V, true)
            .map_err(|_| KeystrokeError::Unavailable("failed to create key down event".to_string()))?;
        key_down.set_flags(CGEventFlags::CGEventFlagCommand);

        let key_up = CGEvent::new_keyboard_event(source, KEY_V, false)
            .map_err(|_| KeystrokeError::Unavailable("failed to create key up event".to_string()))?;
        key_up.set_flags(CGEventFlags::CGEventFlagCommand);

        key_down.post(CGEventTapLocation::HID);
        std::thread::sleep(std::time::Duration::from_millis(5));
        key_up.post(CGEventTapLocation::HID);

        debug!("Simulated Cmd+V via Core Graphics");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "core-graphics"
    }
}

/// Never sends anything; used when auto-paste is turned off
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledInjector;

impl KeystrokeInjector for DisabledInjector {
    fn send_paste_keystroke(&mut self) -> Result<(), KeystrokeError> {
        Err(KeystrokeError::Unavailable("auto-paste is disabled".to_string()))
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Pick the injector for this platform and config
pub fn default_injector(config: &Config) -> Box<dyn KeystrokeInjector> {
    if !config.auto_paste {
        info!("Auto-paste disabled, entries will only be copied");
        return Box::new(DisabledInjector);
    }

    if let Some(injector) = config.get_paste_command().and_then(CommandInjector::from_argv) {
        info!(program = %injector.program(), "Using configured paste command");
        return Box::new(injector);
    }

    #[cfg(target_os = "macos")]
    {
        Box::new(CoreGraphicsInjector)
    }

    #[cfg(not(target_os = "macos"))]
    {
        Box::new(CommandInjector::xdotool())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_injector_reports_unavailable() {
        let mut injector = DisabledInjector;
        assert!(matches!(
            injector.send_paste_keystroke(),
            Err(KeystrokeError::Unavailable(_))
        ));
    }

    #[test]
    fn test_default_injector_respects_auto_paste() {
        let config = Config {
            auto_paste: false,
            ..Config::default()
        };
        assert_eq!(default_injector(&config).name(), "disabled");
    }

    #[test]
    fn test_default_injector_uses_paste_command() {
        let config = Config {
            paste_command: Some(vec!["wtype".to_string(), "-M".to_string(), "ctrl".to_string()]),
            ..Config::default()
        };
        assert_eq!(default_injector(&config).name(), "command");
    }

    #[test]
    fn test_from_argv_empty_is_none() {
        assert!(CommandInjector::from_argv(&[]).is_none());
        let injector = CommandInjector::from_argv(&["xdotool".to_string()]).unwrap();
        assert_eq!(injector.program(), "xdotool");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let mut injector = CommandInjector::new("clipsync-no-such-program-xyz", vec![]);
        assert!(matches!(
            injector.send_paste_keystroke(),
            Err(KeystrokeError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exit_status_is_checked() {
        let mut ok = CommandInjector::new("true", vec![]);
        assert!(ok.send_paste_keystroke().is_ok());

        let mut failing = CommandInjector::new("false", vec![]);
        assert!(matches!(
            failing.send_paste_keystroke(),
            Err(KeystrokeError::Failed { .. })
        ));
    }
}
