//! Follow mode: keep emitting lines as the input grows.
//!
//! [`FollowDriver`] follows a named file by re-opening it every poll
//! interval and resuming at the last byte offset read. A file that shrank
//! below that offset was truncated or replaced; it is read again from the
//! start. [`follow_stream`] follows a stream that cannot be re-opened, such
//! as stdin, until it ends.

use crate::config::{FlushPolicy, TailConfig};
use crate::signal::{is_shutdown, sleep_unless_shutdown};
use crate::sink::OutputSink;
use crate::tailer::{PassOutcome, Tailer};
use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, trace};

/// What one re-open cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Byte offset to resume from on the next cycle
    pub position: u64,
    /// The file was smaller than the previous position and was re-read from 0
    pub shrunk: bool,
    /// Lines read during the cycle
    pub lines: u64,
}

/// Follows a named file across growth and truncation
pub struct FollowDriver {
    path: PathBuf,
    config: TailConfig,
    /// Byte offset after the last completed cycle (0 before the first)
    position: u64,
    shutdown: Option<Arc<AtomicBool>>,
    max_cycles: Option<usize>,
}

impl FollowDriver {
    pub fn new<P: AsRef<Path>>(path: P, config: TailConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
            position: 0,
            shutdown: None,
            max_cycles: None,
        }
    }

    /// Stop between cycles once `flag` is raised
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Stop after `cycles` re-open cycles instead of running forever
    pub fn with_max_cycles(mut self, cycles: usize) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Byte offset the next cycle resumes from
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Run cycles until shutdown, the cycle limit, or an I/O error
    ///
    /// Open, stat, and seek failures abort the loop. A shrunk file is only
    /// reported on `err`.
    pub fn run<W, E>(&mut self, out: &mut W, err: &mut E) -> Result<()>
    where
        W: OutputSink,
        E: Write,
    {
        let mut cycles = 0usize;

        loop {
            if is_shutdown(self.shutdown.as_deref()) {
                debug!(path = %self.path.display(), "follow stopped by shutdown");
                return Ok(());
            }

            self.run_cycle(out, err)?;
            cycles += 1;

            if self.max_cycles.is_some_and(|max| cycles >= max) {
                return Ok(());
            }
            if !sleep_unless_shutdown(self.config.poll_interval, self.shutdown.as_deref()) {
                return Ok(());
            }
        }
    }

    /// Re-open the file, emit what was appended since the last cycle
    pub fn run_cycle<W, E>(&mut self, out: &mut W, err: &mut E) -> Result<CycleReport>
    where
        W: OutputSink,
        E: Write,
    {
        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open file: {}", self.path.display()))?;

        let mut shrunk = false;
        if self.position > 0 {
            let size = file
                .metadata()
                .with_context(|| format!("Failed to stat file: {}", self.path.display()))?
                .len();

            if size < self.position {
                if let Err(e) = writeln!(err, "tailf: {}: file truncated", self.path.display()) {
                    trace!(error = %e, "truncation notice not written");
                }
                debug!(size, position = self.position, "file shrank, reading from start");
                shrunk = true;
            } else {
                file.seek(SeekFrom::Start(self.position))
                    .with_context(|| format!("Failed to seek in file: {}", self.path.display()))?;
            }
        }

        let mut tailer = Tailer::spawn(file, &self.config);
        loop {
            match tailer.run_pass(out)? {
                PassOutcome::EndOfStream => break,
                PassOutcome::Quiescent => {
                    // Still being written to (slow writer or FIFO)
                    if !sleep_unless_shutdown(self.config.poll_interval, self.shutdown.as_deref())
                    {
                        return Ok(CycleReport {
                            position: self.position,
                            shrunk,
                            lines: tailer.lines_seen(),
                        });
                    }
                }
            }
        }

        let lines = tailer.lines_seen();
        let mut file = tailer
            .into_source()
            .finish()
            .ok_or_else(|| anyhow!("Line reader for {} panicked", self.path.display()))?;
        self.position = file
            .stream_position()
            .with_context(|| format!("Failed to read position in: {}", self.path.display()))?;

        debug!(
            path = %self.path.display(),
            position = self.position,
            lines,
            "follow cycle done"
        );

        Ok(CycleReport {
            position: self.position,
            shrunk,
            lines,
        })
    }
}

/// Follow a stream that cannot be re-opened until it ends
///
/// One tailer runs repeated passes; each pass emits at most N lines of its
/// own. Between passes the loop sleeps for the poll interval, except under
/// [`FlushPolicy::EveryTick`] where the quiescence timer alone paces the
/// output. Returns the number of lines read.
pub fn follow_stream<R, W>(
    reader: R,
    out: &mut W,
    config: &TailConfig,
    shutdown: Option<&AtomicBool>,
) -> Result<u64>
where
    R: Read + Send + 'static,
    W: OutputSink,
{
    let mut tailer = Tailer::spawn(reader, config);

    loop {
        if tailer.run_pass(out)?.is_end_of_stream() {
            break;
        }

        let keep_going = match config.flush_policy {
            FlushPolicy::EveryTick => !is_shutdown(shutdown),
            FlushPolicy::OnQuiescence => sleep_unless_shutdown(config.poll_interval, shutdown),
        };
        if !keep_going {
            debug!("stream follow stopped by shutdown");
            break;
        }
    }

    Ok(tailer.lines_seen())
}
