//! Single-writer lock for the history file.
//!
//! `clipsync run` keeps the whole history in memory and writes it back on
//! every change, so another process editing the same store would have its
//! edits overwritten. The daemon holds `<store>.lock` (containing its PID)
//! for its lifetime; one-shot mutating commands refuse to run while a live
//! process holds it. A lock left behind by a dead process is reclaimed.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

/// Lock file path for a given history file
pub fn lock_path_for(storage_path: &Path) -> PathBuf {
    let mut name = storage_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store".into());
    name.push(".lock");
    storage_path.with_file_name(name)
}

/// Held for as long as the daemon runs; removes the lock file on drop
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    /// Take the lock, reclaiming it if the recorded holder is gone.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        // Second attempt only after removing a stale lock
        for _ in 0..2 {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(mut file) => {
                    write!(file, "{}", std::process::id())
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), pid = std::process::id(), "Instance lock acquired");
                    return Ok(Self {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if let Some(pid) = live_holder(path) {
                        bail!(
                            "clipsync is already running (pid {}); lock file {}",
                            pid,
                            path.display()
                        );
                    }
                    warn!(path = %path.display(), "Removing stale instance lock");
                    match fs::remove_file(path) {
                        Ok(()) => {}
                        Err(e) if e.kind() == ErrorKind::NotFound => {}
                        Err(e) => {
                            return Err(e).with_context(|| {
                                format!("Failed to remove stale lock {}", path.display())
                            })
                        }
                    }
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {}", path.display()))
                }
            }
        }

        bail!("Could not acquire instance lock {}", path.display())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove instance lock");
        } else {
            debug!(path = %self.path.display(), "Instance lock released");
        }
    }
}

/// PID of a live process holding the lock, if any
pub fn live_holder(path: &Path) -> Option<u32> {
    let contents = fs::read_to_string(path).ok()?;
    let pid: u32 = contents.trim().parse().ok()?;
    process_alive(pid).then_some(pid)
}

/// Fail when a running daemon owns the store at `storage_path`.
pub fn ensure_not_running(storage_path: &Path) -> Result<()> {
    let path = lock_path_for(storage_path);
    if let Some(pid) = live_holder(&path) {
        bail!(
            "clipsync run is active (pid {}) and owns {}; send the command on its stdin instead",
            pid,
            storage_path.display()
        );
    }
    Ok(())
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid <= 0 {
        return false;
    }
    // Safety: signal 0 only checks for existence
    let rc = unsafe { libc::kill(pid, 0) };
    if rc == 0 {
        true
    } else {
        // EPERM means the process exists but belongs to someone else
        std::io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
    }
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // No cheap liveness check here: treat any recorded holder as live
    true
}
