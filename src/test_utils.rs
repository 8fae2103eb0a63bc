use std::io::{self, Read};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Byte stream fed from a channel, for holding a source open in tests.
///
/// Each `read` blocks until the next chunk arrives; dropping the sender is
/// read as EOF.
pub struct ChannelReader {
    receiver: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    offset: usize,
}

pub fn channel_reader() -> (Sender<Vec<u8>>, ChannelReader) {
    let (tx, rx) = channel();
    (
        tx,
        ChannelReader {
            receiver: rx,
            pending: Vec::new(),
            offset: 0,
        },
    )
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.offset >= self.pending.len() {
            match self.receiver.recv() {
                Ok(chunk) => {
                    self.pending = chunk;
                    self.offset = 0;
                }
                Err(_) => return Ok(0),
            }
        }

        let available = &self.pending[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}

/// Decode captured sink output into lines
pub fn output_lines(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out)
        .lines()
        .map(|s| s.to_string())
        .collect()
}
