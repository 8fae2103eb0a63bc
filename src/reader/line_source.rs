use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace};

/// Number of decoded lines the reader thread may run ahead of the consumer
pub const LINE_QUEUE_DEPTH: usize = 10;

/// Result of waiting for the next line with a timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A complete line, without its terminator
    Line(String),
    /// Nothing arrived before the timeout
    Idle,
    /// The stream ended; no more lines will ever arrive
    Closed,
}

/// Lines decoded from a byte stream by a background reader thread
///
/// The thread reads eagerly and pushes lines into a bounded queue, blocking
/// when the queue is full. Dropping the sending side is the only
/// end-of-stream signal: read errors end the stream the same way EOF does.
pub struct LineSource<R> {
    receiver: Receiver<String>,
    reader: JoinHandle<R>,
}

impl<R: Read + Send + 'static> LineSource<R> {
    /// Start reading lines from `reader` on a new thread
    pub fn spawn(reader: R) -> Self {
        let (tx, rx) = sync_channel(LINE_QUEUE_DEPTH);
        let handle = thread::spawn(move || read_lines(reader, tx));

        Self {
            receiver: rx,
            reader: handle,
        }
    }
}

impl<R> LineSource<R> {
    /// Block until the next line arrives, `None` once the stream has ended
    pub fn recv(&self) -> Option<String> {
        self.receiver.recv().ok()
    }

    /// Wait at most `timeout` for the next line
    ///
    /// A line already queued is returned even with a zero timeout, and a
    /// closed stream is reported as `Closed` rather than `Idle`.
    pub fn recv_timeout(&self, timeout: Duration) -> LineEvent {
        match self.receiver.recv_timeout(timeout) {
            Ok(line) => LineEvent::Line(line),
            Err(RecvTimeoutError::Timeout) => LineEvent::Idle,
            Err(RecvTimeoutError::Disconnected) => LineEvent::Closed,
        }
    }

    /// Stop consuming and hand the byte stream back
    ///
    /// Blocks until the reader thread exits. After `Closed` was observed the
    /// thread exits promptly and its read buffer is empty, so the returned
    /// stream is positioned right after the last consumed byte.
    /// Returns `None` if the reader thread panicked.
    pub fn finish(self) -> Option<R> {
        drop(self.receiver);
        self.reader.join().ok()
    }
}

/// Reader thread body: split into lines until EOF, error, or a dropped receiver
fn read_lines<R: Read>(reader: R, tx: SyncSender<String>) -> R {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(decode_line(&buf)).is_err() {
                    // Receiver dropped, stop reading
                    trace!("line consumer went away");
                    break;
                }
            }
            Err(e) => {
                debug!(error = %e, "line source read failed, closing stream");
                break;
            }
        }
    }

    reader.into_inner()
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily
fn decode_line(raw: &[u8]) -> String {
    let content = raw.strip_suffix(b"\n").unwrap_or(raw);
    let content = content.strip_suffix(b"\r").unwrap_or(content);
    String::from_utf8_lossy(content).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::channel_reader;
    use std::io::{Cursor, Seek};

    fn collect<R>(source: &LineSource<R>) -> Vec<String> {
        std::iter::from_fn(|| source.recv()).collect()
    }

    #[test]
    fn test_line_source_basic() {
        let source = LineSource::spawn(Cursor::new("Line 1\nLine 2\nLine 3\n"));
        assert_eq!(collect(&source), vec!["Line 1", "Line 2", "Line 3"]);
    }

    #[test]
    fn test_no_trailing_newline() {
        let source = LineSource::spawn(Cursor::new("Line 1\nLine 2"));
        assert_eq!(collect(&source), vec!["Line 1", "Line 2"]);
    }

    #[test]
    fn test_empty_input() {
        let source = LineSource::spawn(Cursor::new(""));
        assert!(source.recv().is_none());
        assert_eq!(source.recv_timeout(Duration::from_millis(10)), LineEvent::Closed);
    }

    #[test]
    fn test_crlf_and_empty_lines() {
        let source = LineSource::spawn(Cursor::new("a\r\n\r\nb\n\n"));
        assert_eq!(collect(&source), vec!["a", "", "b", ""]);
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let source = LineSource::spawn(Cursor::new(b"ok\n\xff\xfe bad\nafter\n".to_vec()));
        let lines = collect(&source);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ok");
        assert!(lines[1].ends_with(" bad"));
        assert!(lines[1].contains('\u{FFFD}'));
        assert_eq!(lines[2], "after");
    }

    #[test]
    fn test_more_lines_than_queue_depth() {
        let input: String = (0..LINE_QUEUE_DEPTH * 5)
            .map(|i| format!("line {}\n", i))
            .collect();
        let source = LineSource::spawn(Cursor::new(input));

        let lines = collect(&source);
        assert_eq!(lines.len(), LINE_QUEUE_DEPTH * 5);
        assert_eq!(lines[0], "line 0");
        assert_eq!(lines[49], "line 49");
    }

    #[test]
    fn test_finish_returns_reader_at_end() {
        let data = "first\nsecond\nthird";
        let source = LineSource::spawn(Cursor::new(data));
        assert_eq!(collect(&source).len(), 3);

        let mut reader = source.finish().unwrap();
        assert_eq!(reader.stream_position().unwrap(), data.len() as u64);
    }

    #[test]
    fn test_recv_timeout_idle_then_line_then_closed() {
        let (tx, reader) = channel_reader();
        let source = LineSource::spawn(reader);

        assert_eq!(source.recv_timeout(Duration::from_millis(20)), LineEvent::Idle);

        tx.send(b"hello\n".to_vec()).unwrap();
        assert_eq!(
            source.recv_timeout(Duration::from_secs(5)),
            LineEvent::Line("hello".to_string())
        );

        drop(tx);
        assert_eq!(source.recv_timeout(Duration::from_secs(5)), LineEvent::Closed);
    }

    #[test]
    fn test_line_split_across_reads() {
        let (tx, reader) = channel_reader();
        let source = LineSource::spawn(reader);

        tx.send(b"hel".to_vec()).unwrap();
        tx.send(b"lo\nwor".to_vec()).unwrap();
        tx.send(b"ld\n".to_vec()).unwrap();
        drop(tx);

        assert_eq!(collect(&source), vec!["hello", "world"]);
    }
}
