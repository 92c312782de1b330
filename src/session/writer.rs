//! Background line writer for interpreter input.
//!
//! Writing to the interpreter's stdin blocks once the pipe buffer is full,
//! which happens whenever the interpreter is busy and not reading. Input is
//! therefore handed to a dedicated thread; callers get a [`Delivery`] they
//! can await under their own deadline.

use std::io::{ErrorKind, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

struct PendingLine {
    text: String,
    ack: oneshot::Sender<std::io::Result<()>>,
}

/// Completion of one queued line.
#[derive(Debug)]
pub struct Delivery {
    rx: oneshot::Receiver<std::io::Result<()>>,
}

impl Delivery {
    /// Wait until the line has been flushed into the input pipe.
    pub async fn delivered(self) -> std::io::Result<()> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(std::io::Error::new(
                ErrorKind::BrokenPipe,
                "interpreter input closed",
            )),
        }
    }
}

/// Sending side of the input queue, held by the session.
#[derive(Debug, Clone)]
pub(crate) struct InputHandle {
    tx: mpsc::UnboundedSender<PendingLine>,
    failed: Arc<AtomicBool>,
}

impl InputHandle {
    /// Queue `text` plus a newline. `None` once the writer has exited.
    pub(crate) fn send(&self, text: &str) -> Option<Delivery> {
        let (ack, rx) = oneshot::channel();
        self.tx
            .send(PendingLine {
                text: text.to_string(),
                ack,
            })
            .ok()?;
        Some(Delivery { rx })
    }

    /// A write to the pipe has failed; the interpreter is unreachable.
    pub(crate) fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}

/// Drains the input queue into a blocking writer.
pub(crate) struct LineWriter<W: Write + Send + 'static> {
    writer: W,
    rx: mpsc::UnboundedReceiver<PendingLine>,
    failed: Arc<AtomicBool>,
}

impl<W: Write + Send + 'static> LineWriter<W> {
    pub(crate) fn new(writer: W) -> (Self, InputHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let failed = Arc::new(AtomicBool::new(false));
        let handle = InputHandle {
            tx,
            failed: Arc::clone(&failed),
        };
        (Self { writer, rx, failed }, handle)
    }

    /// Start the write loop on its own thread.
    pub(crate) fn spawn(self) -> std::io::Result<JoinHandle<W>> {
        std::thread::Builder::new()
            .name("repl-bridge-writer".to_string())
            .spawn(move || self.run_blocking())
    }

    /// Run the write loop until every [`InputHandle`] is dropped or a
    /// write fails. Returns the writer so it is closed by the caller.
    pub(crate) fn run_blocking(mut self) -> W {
        while let Some(PendingLine { text, ack }) = self.rx.blocking_recv() {
            let result = write_line(&mut self.writer, &text);
            let failed = result.is_err();
            match &result {
                Ok(()) => trace!(bytes = text.len(), "input writer: line delivered"),
                Err(e) => {
                    warn!("interpreter input failed: {}", e);
                    self.failed.store(true, Ordering::Release);
                }
            }
            let _ = ack.send(result);
            if failed {
                break;
            }
        }
        debug!("input writer: closed");
        self.writer
    }
}

fn write_line<W: Write>(writer: &mut W, text: &str) -> std::io::Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}
