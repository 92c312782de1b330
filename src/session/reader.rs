//! Background line reader for interpreter output.
//!
//! The interpreter's merged output pipe is a blocking handle, so it is
//! drained on a dedicated thread that forwards each decoded line through
//! an unbounded channel. The channel is the only thing the reader shares
//! with the rest of the session.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// Reads lines from a blocking source and pushes them onto the output queue.
pub struct LineReader<R: Read + Send + 'static> {
    reader: R,
    tx: mpsc::UnboundedSender<String>,
}

impl<R: Read + Send + 'static> LineReader<R> {
    /// Create a new LineReader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The interpreter's output pipe (blocking).
    /// * `tx` - Output queue sender.
    pub fn new(reader: R, tx: mpsc::UnboundedSender<String>) -> Self {
        Self { reader, tx }
    }

    /// Start the read loop on its own thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("repl-bridge-reader".to_string())
            .spawn(move || self.run_blocking())
    }

    /// Run the read loop on the current thread.
    ///
    /// Returns when:
    /// - The pipe reaches EOF (the process exited)
    /// - The queue receiver was dropped
    /// - A read fails
    ///
    /// None of these are reported to the caller: the queue simply stops
    /// receiving lines.
    pub fn run_blocking(self) {
        let mut reader = BufReader::new(self.reader);
        let mut buf = Vec::with_capacity(256);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    debug!("output reader: EOF");
                    break;
                }
                Ok(n) => {
                    trace!("output reader: read {} bytes", n);
                    if self.tx.send(decode_line(&buf)).is_err() {
                        debug!("output reader: queue closed");
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("output reader error: {}", e);
                    break;
                }
            }
        }
    }
}

/// Decode one raw line as UTF-8 with replacement, dropping the line ending.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_reads_lines_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        LineReader::new(Cursor::new(b"first\r\nsecond\nthird".to_vec()), tx).run_blocking();

        assert_eq!(collect(&mut rx), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_blank_lines_kept() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        LineReader::new(Cursor::new(b"a\n\nb\n".to_vec()), tx).run_blocking();

        assert_eq!(collect(&mut rx), vec!["a", "", "b"]);
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        LineReader::new(Cursor::new(b"M\xfcller\n".to_vec()), tx).run_blocking();

        assert_eq!(collect(&mut rx), vec!["M\u{fffd}ller"]);
    }

    #[test]
    fn test_empty_source_closes_queue() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        LineReader::new(Cursor::new(Vec::new()), tx).run_blocking();

        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        // Must return rather than loop forever
        LineReader::new(Cursor::new(b"x\ny\n".to_vec()), tx).run_blocking();
    }

    #[tokio::test]
    async fn test_spawned_reader() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = LineReader::new(Cursor::new(b"hello\n".to_vec()), tx)
            .spawn()
            .unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
        assert_eq!(rx.recv().await, None);
        handle.join().unwrap();
    }
}
