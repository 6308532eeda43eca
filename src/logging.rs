//! Logger setup.
//!
//! Library code only uses the `log` macros. The binary installs `env_logger`
//! here, writing `[timestamp] [LEVEL] message` lines to stderr. A build run
//! later attaches its log file through the returned [`LogSink`], from which
//! point lines are also written there.
//!
//! The terminal and the log file have separate thresholds, so a quiet
//! terminal can sit next to a detailed build log.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use env_logger::{Builder, Target};
use log::{Level, LevelFilter};

use crate::error::Result;

type SharedFile = Arc<Mutex<Option<File>>>;

thread_local! {
    /// Level of the record being formatted on this thread.
    static RECORD_LEVEL: Cell<Level> = const { Cell::new(Level::Error) };
}

/// Writes each line to the console and, once attached, to a log file, when
/// the line's level passes that destination's threshold.
struct Tee<W> {
    console: W,
    console_level: LevelFilter,
    file: SharedFile,
    file_level: LevelFilter,
}

impl<W: Write> Write for Tee<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let level = RECORD_LEVEL.with(Cell::get);
        if level <= self.console_level {
            self.console.write_all(buf)?;
        }
        if level <= self.file_level {
            if let Ok(mut guard) = self.file.lock() {
                if let Some(file) = guard.as_mut() {
                    file.write_all(buf)?;
                }
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                file.flush()?;
            }
        }
        Ok(())
    }
}

/// Handle for routing log output into a file after initialisation.
#[derive(Clone, Default)]
pub struct LogSink {
    file: SharedFile,
}

impl LogSink {
    /// Start copying log lines into a newly created `path`.
    pub fn attach(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        if let Ok(mut guard) = self.file.lock() {
            *guard = Some(file);
        }
        Ok(())
    }
}

/// Parse a `--log-level` or `--output-level` value.
///
/// Accepts the `log` level names case-insensitively, plus `warning` and
/// `critical`.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "warning" => Some(LevelFilter::Warn),
        "critical" => Some(LevelFilter::Error),
        other => other.parse().ok(),
    }
}

/// Install the logger.
///
/// `output_level` is the terminal's threshold, `file_level` the log file's.
/// Records pass the global filter when either destination wants them.
///
/// Calling this more than once is harmless: later calls leave the first
/// logger in place, and their sink never receives output.
pub fn init(output_level: LevelFilter, file_level: LevelFilter) -> LogSink {
    let sink = LogSink::default();
    let mut builder = Builder::new();
    builder
        .filter_level(output_level.max(file_level))
        .format(|buf, record| {
            RECORD_LEVEL.with(|level| level.set(record.level()));
            writeln!(
                buf,
                "[{}] [{}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee {
            console: io::stderr(),
            console_level: output_level,
            file: sink.file.clone(),
            file_level,
        })));
    // A logger may already be installed (tests, embedding applications).
    let _ = builder.try_init();
    sink
}
