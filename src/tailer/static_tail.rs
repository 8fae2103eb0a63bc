use crate::reader::{LineSource, RingBuffer};
use crate::sink::OutputSink;
use anyhow::{Context, Result};
use std::io::{Read, Write};

/// Print the last `lines` lines of `reader` once, after draining it to EOF
///
/// No timer and no follow: the call blocks until the stream ends. Returns
/// the number of lines read.
pub fn static_tail<R, W>(reader: R, out: &mut W, lines: usize) -> Result<u64>
where
    R: Read + Send + 'static,
    W: OutputSink,
{
    let source = LineSource::spawn(reader);
    let mut buffer = RingBuffer::new(lines);

    while let Some(line) = source.recv() {
        buffer.push(line);
    }

    for line in buffer.window(0) {
        writeln!(out, "{}", line).context("Failed to write output")?;
    }
    out.flush().context("Failed to flush output")?;

    Ok(buffer.next_index())
}
