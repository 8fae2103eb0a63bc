//! Output sink contract for flushed tail windows.
//!
//! A sink is any [`Write`]; file-backed sinks can additionally make the
//! written lines durable after every flush. Durability is best-effort:
//! callers ignore errors from [`OutputSink::sync_durable`].

use std::fs::File;
use std::io::{self, Stdout, StdoutLock, Write};

/// A writable byte sink for tailed lines.
pub trait OutputSink: Write {
    /// Persist written data to stable storage, if the sink is file-backed.
    fn sync_durable(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl OutputSink for File {
    fn sync_durable(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

impl OutputSink for Stdout {}

impl OutputSink for StdoutLock<'_> {}

impl OutputSink for Vec<u8> {}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn sync_durable(&mut self) -> io::Result<()> {
        (**self).sync_durable()
    }
}
