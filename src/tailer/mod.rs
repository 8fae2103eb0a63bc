//! Ring-buffer tailer with quiescence-based flushing.
//!
//! A [`Tailer`] pass consumes lines from a [`LineSource`] into a
//! [`RingBuffer`] until either the stream ends or the stream has been idle
//! for one quiescence interval, then writes the last N lines of the pass to
//! the sink.

pub mod static_tail;

pub use static_tail::static_tail;

use crate::config::{FlushPolicy, TailConfig};
use crate::reader::{LineEvent, LineSource, RingBuffer};
use crate::sink::OutputSink;
use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Why a tailer pass flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The source closed; no further pass will see new lines
    EndOfStream,
    /// The quiescence timer fired; more data may still come
    Quiescent,
}

impl PassOutcome {
    /// True when the pass ended because the source closed
    pub fn is_end_of_stream(self) -> bool {
        self == PassOutcome::EndOfStream
    }
}

/// Tails one line source, flushing the window at EOF or on quiescence
///
/// The line index keeps counting across passes of the same tailer. Each
/// pass only emits lines it received itself, so repeated passes never
/// repeat a line.
pub struct Tailer<R> {
    source: LineSource<R>,
    buffer: RingBuffer,
    quiescence: Duration,
    policy: FlushPolicy,
}

impl<R: Read + Send + 'static> Tailer<R> {
    /// Start a line source over `reader` and tail it
    pub fn spawn(reader: R, config: &TailConfig) -> Self {
        Self::new(LineSource::spawn(reader), config)
    }
}

impl<R> Tailer<R> {
    /// Tail an already running line source
    pub fn new(source: LineSource<R>, config: &TailConfig) -> Self {
        Self {
            source,
            buffer: RingBuffer::new(config.lines),
            quiescence: config.quiescence,
            policy: config.flush_policy,
        }
    }

    /// Number of lines accepted so far
    pub fn lines_seen(&self) -> u64 {
        self.buffer.next_index()
    }

    /// Give back the line source, e.g. to recover the byte stream
    pub fn into_source(self) -> LineSource<R> {
        self.source
    }

    /// Run one pass: consume lines until a flush condition, then flush
    pub fn run_pass<W: OutputSink>(&mut self, out: &mut W) -> Result<PassOutcome> {
        let pass_start = self.buffer.next_index();
        let outcome = self.wait_for_flush();

        let (begin, end) = self.buffer.window_range(pass_start);
        debug!(
            ?outcome,
            received = end - pass_start,
            emitted = end - begin,
            "tailer pass flushed"
        );

        self.flush(out, pass_start)?;
        Ok(outcome)
    }

    /// The core loop: wait on "line arrived" or "quiescence deadline passed"
    fn wait_for_flush(&mut self) -> PassOutcome {
        let mut deadline = Instant::now() + self.quiescence;
        // Index when the timer was last (re)armed
        let mut armed_at = self.buffer.next_index();
        let mut last_line_at: Option<Instant> = None;

        loop {
            // Queued lines and disconnection are reported before a timeout
            match self
                .source
                .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            {
                LineEvent::Line(line) => {
                    self.buffer.push(line);
                    last_line_at = Some(Instant::now());
                }
                LineEvent::Closed => return PassOutcome::EndOfStream,
                LineEvent::Idle => {
                    let progressed = self.buffer.next_index() != armed_at;
                    if !progressed || self.policy == FlushPolicy::EveryTick {
                        return PassOutcome::Quiescent;
                    }

                    // Lines arrived since the timer was armed: quiescence is
                    // measured from the most recent one
                    trace!(lines = self.buffer.next_index() - armed_at, "timer refreshed");
                    armed_at = self.buffer.next_index();
                    deadline = last_line_at.unwrap_or_else(Instant::now) + self.quiescence;
                }
            }
        }
    }

    /// Emit `[max(pass_start, end - N), end)` in index order
    fn flush<W: OutputSink>(&self, out: &mut W, pass_start: u64) -> Result<()> {
        for line in self.buffer.window(pass_start) {
            writeln!(out, "{}", line).context("Failed to write output")?;
        }
        out.flush().context("Failed to flush output")?;

        if let Err(e) = out.sync_durable() {
            trace!(error = %e, "output sync skipped");
        }
        Ok(())
    }
}
