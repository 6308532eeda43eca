//! Native tool execution.
//!
//! Every external program stackbuild starts (package tools, `./configure`,
//! `make`) is described as an [`Invocation`] and handed to a
//! [`CommandRunner`]. The default runner, [`SystemRunner`], spawns the
//! program, blocks until it exits, and routes privileged invocations through
//! the configured [`Elevator`]. The program's stdout is forwarded line by
//! line to the log at info level and its stderr at warn level, so tool output
//! ends up in the run log.
//!
//! The trait exists so the pipeline can be exercised in tests without
//! touching the host.

use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;

use log::{debug, info, warn};

use crate::elevation::{Elevator, InterruptGuard};
use crate::error::{Error, Result};

/// A fully described program run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    /// Run through the elevation channel
    pub privileged: bool,
    /// Prefix for forwarded output lines; the program name when unset.
    pub label: Option<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            privileged: false,
            label: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn tag(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.program)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Trait for running native tools - allows mocking in tests
pub trait CommandRunner {
    /// Run the invocation to completion and return its exit code.
    ///
    /// A process killed by a signal reports `-1`. A non-zero code is not an
    /// error at this level; callers decide what it means for their stage.
    /// Privileged invocations interrupted by the operator yield
    /// [`Error::Interrupted`] once the process has exited.
    fn run(&self, invocation: &Invocation) -> Result<i32>;
}

/// The default implementation of `CommandRunner`, which spawns real
/// processes.
#[derive(Debug)]
pub struct SystemRunner {
    elevator: Elevator,
}

impl SystemRunner {
    pub fn new(elevator: Elevator) -> Self {
        Self { elevator }
    }

    fn command_for(&self, invocation: &Invocation) -> Command {
        let mut cmd = if invocation.privileged {
            self.elevator.command(&invocation.program)
        } else {
            Command::new(&invocation.program)
        };
        cmd.args(&invocation.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &invocation.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[derive(Clone, Copy)]
enum Stream {
    Out,
    Err,
}

fn pump<R: Read + Send + 'static>(
    reader: R,
    stream: Stream,
    lines: mpsc::Sender<(Stream, String)>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(reader).lines().map_while(|line| line.ok()) {
            if lines.send((stream, line)).is_err() {
                break;
            }
        }
    })
}

/// Forward the child's output to the log until both pipes close.
///
/// Reader threads only collect lines; logging happens on the calling
/// thread.
fn forward_output(child: &mut Child, tag: &str) {
    let (sender, receiver) = mpsc::channel();
    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(pump(stdout, Stream::Out, sender.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(pump(stderr, Stream::Err, sender.clone()));
    }
    drop(sender);

    for (stream, line) in receiver {
        match stream {
            Stream::Out => info!("{}: {}", tag, line),
            Stream::Err => warn!("{}: {}", tag, line),
        }
    }
    for reader in readers {
        let _ = reader.join();
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<i32> {
        debug!("Running: {}", invocation);
        let mut cmd = self.command_for(invocation);

        let spawn_error = |e: std::io::Error| Error::Spawn {
            program: invocation.program.clone(),
            message: e.to_string(),
        };

        if !invocation.privileged {
            let mut child = cmd.spawn().map_err(spawn_error)?;
            forward_output(&mut child, invocation.tag());
            let status = child.wait()?;
            return Ok(status.code().unwrap_or(-1));
        }

        // The guard must outlive the wait so SIGINT stays deferred until the
        // privileged process is gone.
        let guard = InterruptGuard::install();
        let status = cmd.spawn().map_err(spawn_error).and_then(|mut child| {
            forward_output(&mut child, invocation.tag());
            Ok(child.wait()?)
        });
        if guard.release() {
            return Err(Error::Interrupted {
                program: invocation.program.clone(),
            });
        }
        Ok(status?.code().unwrap_or(-1))
    }
}
