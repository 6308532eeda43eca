//! Privilege elevation.
//!
//! stackbuild has exactly one way of running things as root, chosen at
//! startup: either a `sudo`-like program found on `PATH`, or direct execution
//! when the process already runs as root. Both the dependency install and the
//! final `make install` go through it.
//!
//! While a privileged process runs, [`InterruptGuard`] defers `SIGINT`: the
//! operator is told the operation cannot be interrupted safely, and the
//! interrupt is honoured once the process has exited.

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::error::{Error, Result};

/// The configured privilege channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elevator {
    /// Prefix privileged commands with this program (e.g. `/usr/bin/sudo`).
    Command(PathBuf),
    /// Already running as root; run privileged commands directly.
    Direct,
}

impl Elevator {
    /// Set up the privilege channel.
    ///
    /// With an explicit `program`, it must resolve on `PATH` (or be an
    /// existing path). Without one, root processes use [`Elevator::Direct`]
    /// and everyone else uses `default_program`.
    pub fn configure(program: Option<&str>, default_program: &str) -> Result<Self> {
        match program {
            Some(program) => Self::resolve(program),
            None if is_root() => {
                debug!("Running as root, privileged commands run directly");
                Ok(Elevator::Direct)
            }
            None => Self::resolve(default_program),
        }
    }

    fn resolve(program: &str) -> Result<Self> {
        let path = which::which(program).map_err(|e| Error::ElevationUnavailable {
            program: program.to_string(),
            message: format!("{} (set --elevate-with to a privilege program on PATH)", e),
        })?;
        debug!("Using {} for privileged commands", path.display());
        Ok(Elevator::Command(path))
    }

    /// Build a [`Command`] that runs `program` with elevated privilege.
    pub fn command(&self, program: &str) -> Command {
        match self {
            Elevator::Command(elevator) => {
                let mut cmd = Command::new(elevator);
                cmd.arg(program);
                cmd
            }
            Elevator::Direct => Command::new(program),
        }
    }
}

fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

const CANNOT_INTERRUPT: &[u8] = b"\nstackbuild is running a privileged operation that cannot be \
safely interrupted. It will stop as soon as that operation finishes.\n";

extern "C" fn defer_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
    // SAFETY: write(2) is async-signal-safe and the buffer is a static.
    unsafe {
        libc::write(
            libc::STDERR_FILENO,
            CANNOT_INTERRUPT.as_ptr() as *const libc::c_void,
            CANNOT_INTERRUPT.len(),
        );
    }
}

/// Defers `SIGINT` for as long as it is alive.
///
/// Restores the previous disposition on drop. Only one guard should exist at
/// a time; privileged calls are never nested.
pub struct InterruptGuard {
    previous: libc::sighandler_t,
}

impl InterruptGuard {
    pub fn install() -> Self {
        INTERRUPTED.store(false, Ordering::SeqCst);
        let handler = defer_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
        // SAFETY: the handler only touches an atomic and calls write(2).
        let previous = unsafe { libc::signal(libc::SIGINT, handler) };
        Self { previous }
    }

    /// Restore the previous disposition, then report whether an interrupt
    /// arrived while the guard was installed.
    ///
    /// The flag is read after the restore, so no interrupt can slip in
    /// between the read and the drop.
    pub fn release(self) -> bool {
        drop(self);
        INTERRUPTED.load(Ordering::SeqCst)
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        // SAFETY: restores the disposition captured in `install`.
        unsafe {
            libc::signal(libc::SIGINT, self.previous);
        }
    }
}
