//! Log Streaming - remote `log_listener` over ssh as a cancellable line stream
//!
//! Each `stream_logs` call owns one ssh child process and one tokio task:
//! - stdout is split into lines and pushed, in order, through a bounded channel
//! - the stream ends once the child exits and its stdout is drained
//! - dropping or cancelling the `LogStream` kills the child exactly once
//!
//! Failures never reach the consumer; they degrade to an empty stream plus a
//! diagnostic.

use crate::application::constants::*;
use crate::domain::{DeviceId, LogLine};
use crate::port::{
    CommandSpec, Diagnostics, FileSystem, ProcessError, ProcessHandle, ProcessSpawner, ProcessStdout,
};
use futures::stream::{FusedStream, Stream};
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Spawns `ssh ... log_listener` sessions
pub struct LogStreamer {
    spawner: Arc<dyn ProcessSpawner>,
    fs: Arc<dyn FileSystem>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl LogStreamer {
    pub fn new(
        spawner: Arc<dyn ProcessSpawner>,
        fs: Arc<dyn FileSystem>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            spawner,
            fs,
            diagnostics,
        }
    }

    /// Stream the device's system log
    ///
    /// Returns an already-finished stream (after reporting why) when the ssh
    /// config is missing or the session cannot be set up. Must be called
    /// within a tokio runtime for lines to flow.
    pub fn stream_logs(&self, device: &DeviceId, ssh_config: Option<&Path>) -> LogStream {
        let Some(ssh_config) = ssh_config.filter(|path| self.fs.is_file(path)) else {
            self.diagnostics
                .error("Failed to get syslogs: no ssh config file was found.");
            self.diagnostics.error(&format!(
                "Set {ENV_BUILD_DIR} to a Fuchsia build directory, or {ENV_SSH_CONFIG} to an ssh config file."
            ));
            return LogStream::finished();
        };

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                self.diagnostics
                    .trace(&format!("Failed to start syslog stream: {e}"));
                return LogStream::finished();
            }
        };

        let command = ssh_log_command(ssh_config, device);
        let (tx, rx) = mpsc::channel(LOG_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let session = LogSession {
            spawner: Arc::clone(&self.spawner),
            diagnostics: Arc::clone(&self.diagnostics),
            command,
            tx,
            cancel: cancel.clone(),
        };

        info!(device = %device, "Starting syslog stream");
        let task = runtime.spawn(session.run());

        LogStream {
            rx: Some(rx),
            cancel,
            task: Some(task),
        }
    }
}

/// `ssh -F <config> <device> "log_listener --clock Local"`
fn ssh_log_command(ssh_config: &Path, device: &DeviceId) -> CommandSpec {
    CommandSpec::new(SSH_PROGRAM)
        .arg("-F")
        .arg(ssh_config.to_string_lossy())
        .arg(device.as_str())
        .arg(LOG_LISTENER_COMMAND)
}

/// Stream of remote log lines
///
/// Infinite until the remote side exits; not restartable. Dropping it kills
/// the ssh session.
pub struct LogStream {
    rx: Option<mpsc::Receiver<LogLine>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LogStream {
    /// Empty stream that has already ended
    pub fn finished() -> Self {
        Self {
            rx: None,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Stop the stream; the ssh session is killed in the background
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.rx = None;
    }

    /// Cancel and wait until the session task (and its kill) has finished
    pub async fn close(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Stream for LogStream {
    type Item = LogLine;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<LogLine>> {
        let this = self.get_mut();
        let Some(rx) = this.rx.as_mut() else {
            return Poll::Ready(None);
        };

        match rx.poll_recv(cx) {
            Poll::Ready(None) => {
                this.rx = None;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl FusedStream for LogStream {
    fn is_terminated(&self) -> bool {
        self.rx.is_none()
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// How the pump loop ended
#[derive(Debug, PartialEq, Eq)]
enum StreamEnd {
    Exited(Option<i32>),
    Cancelled,
}

/// Everything one background session owns
struct LogSession {
    spawner: Arc<dyn ProcessSpawner>,
    diagnostics: Arc<dyn Diagnostics>,
    command: CommandSpec,
    tx: mpsc::Sender<LogLine>,
    cancel: CancellationToken,
}

impl LogSession {
    async fn run(self) {
        debug!(command = %self.command, "Spawning remote log listener");

        let mut process = match self.spawner.spawn(&self.command).await {
            Ok(process) => process,
            Err(e) => {
                self.diagnostics
                    .trace(&format!("Failed to start syslog stream: {e}"));
                return;
            }
        };

        // Cancelled while spawning: nobody wants this session.
        if self.is_cancelled() {
            debug!("Syslog stream cancelled before ssh started");
            self.kill(process.as_mut()).await;
            return;
        }

        let Some(stdout) = process.take_stdout() else {
            self.diagnostics.trace(&format!(
                "Failed to start syslog stream: {}",
                ProcessError::StdoutUnavailable
            ));
            self.kill(process.as_mut()).await;
            return;
        };

        match self.pump(process.as_mut(), stdout).await {
            StreamEnd::Exited(exit_code) => {
                debug!(exit_code = ?exit_code, "Remote log listener exited");
            }
            StreamEnd::Cancelled => {
                debug!("Syslog stream cancelled, killing ssh");
                self.kill(process.as_mut()).await;
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }

    /// Forward stdout lines until exit (with stdout drained) or cancellation
    async fn pump(&self, process: &mut dyn ProcessHandle, stdout: ProcessStdout) -> StreamEnd {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        let mut stdout_open = true;
        let mut exit: Option<Option<i32>> = None;

        loop {
            if let (false, Some(exit_code)) = (stdout_open, exit) {
                return StreamEnd::Exited(exit_code);
            }

            // Overlong lines are cut at the cap and emitted in pieces.
            let limit = (MAX_LOG_LINE_BYTES - buf.len()) as u64;
            let mut line_reader = (&mut reader).take(limit);

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => return StreamEnd::Cancelled,

                read = line_reader.read_until(b'\n', &mut buf), if stdout_open => match read {
                    Ok(0) => stdout_open = false,
                    Ok(_) => {
                        let line = LogLine::from_raw(&buf);
                        buf.clear();
                        if !self.send(line).await {
                            return StreamEnd::Cancelled;
                        }
                    }
                    Err(e) => {
                        self.diagnostics
                            .trace(&format!("Failed to read syslog stream: {e}"));
                        stdout_open = false;
                    }
                },

                status = process.wait(), if exit.is_none() => {
                    exit = Some(status.unwrap_or_else(|e| {
                        self.diagnostics
                            .trace(&format!("Failed to wait for ssh: {e}"));
                        None
                    }));
                }
            }
        }
    }

    /// Deliver one line; false once the consumer is gone
    async fn send(&self, line: LogLine) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(line) => sent.is_ok(),
        }
    }

    async fn kill(&self, process: &mut dyn ProcessHandle) {
        if let Err(e) = process.kill().await {
            self.diagnostics
                .trace(&format!("Failed to kill ssh session: {e}"));
        }
    }
}
