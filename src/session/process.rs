//! Interpreter process ownership.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::{debug, info, warn};

use super::queue::{OutputLease, QueueState};
use super::reader::LineReader;
use super::writer::{Delivery, InputHandle, LineWriter};
use super::SessionState;
use crate::error::ReplBridgeError;
use crate::interpreter::{Dialect, DialectKind};
use crate::Result;

/// Configuration for creating a new session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Interpreter family.
    pub dialect: DialectKind,
    /// Program override; the dialect's default when `None`.
    pub program: Option<String>,
    /// Argument override; the dialect's default when `None`.
    pub args: Option<Vec<String>>,
    /// Extra environment variables for the interpreter.
    pub env: HashMap<String, String>,
    /// Working directory of the interpreter.
    pub working_dir: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }

    /// Set the program to launch.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Set the program arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// A running child process and the queue feeding its input pipe.
struct Process {
    child: Child,
    input: InputHandle,
    exit_command: &'static str,
}

impl Process {
    /// Queue the exit instruction, then kill. Never waits on the input pipe.
    fn terminate(mut self) {
        if self.input.send(self.exit_command).is_none() {
            debug!("exit instruction not delivered: input closed");
        }
        drop(self.input);
        if let Err(e) = self.child.kill() {
            debug!("kill failed: {}", e);
        }
        let _ = self.child.wait();
    }
}

struct Inner {
    state: SessionState,
    process: Option<Process>,
    /// Handed to the reader thread on start.
    tx: Option<mpsc::UnboundedSender<String>>,
}

impl Inner {
    /// Observe a process that exited on its own or whose input broke.
    fn refresh(&mut self) {
        let input_broken = self
            .process
            .as_ref()
            .is_some_and(|process| process.input.has_failed());
        if input_broken {
            warn!("interpreter input broken, stopping session");
            if let Some(process) = self.process.take() {
                process.terminate();
            }
            let _ = self.state.transition_to(SessionState::Stopped);
            return;
        }

        let exited = match self.process.as_mut() {
            Some(process) => match process.child.try_wait() {
                Ok(Some(status)) => {
                    info!(%status, "interpreter exited");
                    true
                }
                Ok(None) => false,
                Err(e) => {
                    warn!("failed to poll interpreter: {}", e);
                    true
                }
            },
            None => false,
        };

        if exited {
            self.process = None;
            let _ = self.state.transition_to(SessionState::Stopped);
        }
    }
}

/// Owner of one long-lived interpreter process.
///
/// Standard output and standard error share a single pipe, so diagnostics
/// appear in the output queue in the order the interpreter emitted them.
/// After start, failures never surface as errors: a dead or wedged
/// interpreter shows up as a queue that stops receiving lines.
pub struct Session {
    config: SessionConfig,
    dialect: Arc<dyn Dialect>,
    inner: Mutex<Inner>,
    queue: AsyncMutex<QueueState>,
}

impl Session {
    /// Create an unstarted session.
    pub fn new(config: SessionConfig) -> Self {
        let dialect = config.dialect.build();
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            config,
            dialect,
            inner: Mutex::new(Inner {
                state: SessionState::Unstarted,
                process: None,
                tx: Some(tx),
            }),
            queue: AsyncMutex::new(QueueState::new(rx)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| ReplBridgeError::LockPoisoned)
    }

    /// The dialect this session speaks.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Spawn the interpreter and its output reader.
    ///
    /// A no-op when already running. Fails with
    /// [`ReplBridgeError::SessionTerminated`] once stopped.
    pub fn start(&self) -> Result<()> {
        let mut inner = self.lock()?;
        inner.refresh();

        match inner.state {
            SessionState::Running => return Ok(()),
            SessionState::Stopped => return Err(ReplBridgeError::SessionTerminated),
            SessionState::Unstarted => {}
        }

        let program = self
            .config
            .program
            .clone()
            .unwrap_or_else(|| self.dialect.default_program());
        let args = self
            .config
            .args
            .clone()
            .unwrap_or_else(|| self.dialect.default_args());

        let (output_reader, output_writer) = std::io::pipe()?;
        let error_writer = output_writer.try_clone()?;

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .envs(&self.config.env)
            .stdin(Stdio::piped())
            .stdout(output_writer)
            .stderr(error_writer);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| ReplBridgeError::Spawn {
            program: program.clone(),
            source,
        })?;
        // Release the parent's copies of the write end so EOF reaches the reader.
        drop(cmd);

        let Some(stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(std::io::Error::other("interpreter stdin was not captured").into());
        };
        let (writer, input) = LineWriter::new(stdin);
        if let Err(e) = writer.spawn() {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e.into());
        }

        let tx = match inner.tx.take() {
            Some(tx) => tx,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ReplBridgeError::SessionTerminated);
            }
        };
        if let Err(e) = LineReader::new(output_reader, tx).spawn() {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e.into());
        }

        info!(
            pid = child.id(),
            program = %program,
            dialect = self.dialect.name(),
            "interpreter started"
        );

        inner.process = Some(Process {
            child,
            input,
            exit_command: self.dialect.exit_command(),
        });
        inner.state.transition_to(SessionState::Running)?;

        if let Some(init) = self.dialect.init_command() {
            Self::write_locked(&mut inner, &init);
        }

        Ok(())
    }

    /// Queue one line of input. Silently dropped unless running.
    ///
    /// Never blocks: the line is written by the session's input thread.
    /// Await the returned [`Delivery`] to learn when it reached the pipe.
    /// A failed write stops the session.
    pub fn write(&self, text: &str) -> Option<Delivery> {
        match self.lock() {
            Ok(mut inner) => Self::write_locked(&mut inner, text),
            Err(e) => {
                warn!("write dropped: {}", e);
                None
            }
        }
    }

    fn write_locked(inner: &mut Inner, text: &str) -> Option<Delivery> {
        inner.refresh();

        let Some(process) = inner.process.as_ref() else {
            debug!("write dropped: interpreter not running");
            return None;
        };
        process.input.send(text)
    }

    /// Current lifecycle state, noticing a process that exited on its own.
    pub fn state(&self) -> SessionState {
        match self.lock() {
            Ok(mut inner) => {
                inner.refresh();
                inner.state
            }
            Err(_) => SessionState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Process ID of the interpreter, while running.
    pub fn pid(&self) -> Option<u32> {
        let inner = self.lock().ok()?;
        inner.process.as_ref().map(|p| p.child.id())
    }

    /// Take exclusive ownership of the output queue, waiting for any
    /// command in flight to finish.
    pub async fn lease(&self) -> OutputLease<'_> {
        OutputLease::new(self.queue.lock().await)
    }

    /// Discard all queued output without blocking.
    ///
    /// Does nothing while a command is in flight, since its output belongs
    /// to the lease holder. Returns the number of discarded lines.
    pub fn drain(&self) -> usize {
        match self.queue.try_lock() {
            Ok(mut queue) => queue.drain(),
            Err(_) => 0,
        }
    }

    /// Ask the interpreter to quit, then kill it.
    ///
    /// Safe to call repeatedly and on a session that never started.
    pub fn stop(&self) {
        let Ok(mut inner) = self.lock() else {
            return;
        };

        if let Some(process) = inner.process.take() {
            info!(pid = process.child.id(), "stopping interpreter");
            process.terminate();
        }
        inner.tx = None;
        if !inner.state.is_terminal() {
            let _ = inner.state.transition_to(SessionState::Stopped);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("dialect", &self.dialect.name())
            .field("state", &self.state())
            .field("pid", &self.pid())
            .finish()
    }
}
