// Process Port
// Abstraction for running host tools (dev_finder, pm, ssh, kernel_compiler)

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncRead;

/// Program plus arguments, passed to the OS without a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a process run to completion
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Process errors
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process stdout was not captured")]
    StdoutUnavailable,

    #[error("Kill failed: {0}")]
    KillFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Readable stdout pipe of a spawned process
pub type ProcessStdout = Box<dyn AsyncRead + Send + Unpin>;

/// A running child process owned by exactly one caller
#[async_trait]
pub trait ProcessHandle: Send {
    /// OS process id, if the platform exposes one and the process is alive
    fn id(&self) -> Option<u32>;

    /// Take the stdout pipe (only the first call returns it)
    fn take_stdout(&mut self) -> Option<ProcessStdout>;

    /// Wait for exit and return the exit code (`None` when killed by a signal)
    ///
    /// Must be cancel safe: it is polled inside `tokio::select!`.
    async fn wait(&mut self) -> Result<Option<i32>, ProcessError>;

    /// Terminate the process
    ///
    /// A no-op returning `Ok(())` once the process has exited.
    async fn kill(&mut self) -> Result<(), ProcessError>;
}

/// Process spawner trait
///
/// Implementations:
/// - TokioProcessSpawner (infra-system): real child processes
/// - mocks::MockProcessSpawner: scripted outputs and controllable processes
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    /// Run to completion and capture stdout/stderr
    ///
    /// # Errors
    /// - ProcessError::SpawnFailed if the process cannot be started
    /// - ProcessError::IoError if output cannot be collected
    async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, ProcessError>;

    /// Start a process with stdout piped and return its handle
    ///
    /// # Errors
    /// - ProcessError::SpawnFailed if the process cannot be started
    async fn spawn(&self, command: &CommandSpec) -> Result<Box<dyn ProcessHandle>, ProcessError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, MutexGuard};
    use tokio::io::{AsyncWriteExt, DuplexStream};
    use tokio::sync::{watch, Notify};

    /// Exit code reported for a killed mock process
    pub const KILLED_EXIT_CODE: i32 = -9;

    const PIPE_CAPACITY: usize = 64 * 1024;

    fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(|e| e.into_inner())
    }

    struct SharedState {
        exit_tx: watch::Sender<Option<i32>>,
        kills: AtomicUsize,
    }

    /// Fake child process
    pub struct MockProcess {
        stdout: Option<ProcessStdout>,
        exit_rx: watch::Receiver<Option<i32>>,
        state: Arc<SharedState>,
    }

    /// Test-side remote control for a `MockProcess`
    pub struct MockProcessControl {
        writer: Option<DuplexStream>,
        state: Arc<SharedState>,
    }

    impl MockProcess {
        /// Running process whose stdout and exit are driven by the control
        pub fn new() -> (Self, MockProcessControl) {
            let (reader, writer) = tokio::io::duplex(PIPE_CAPACITY);
            let (process, state) = Self::with_stdout(Box::new(reader), None);
            let control = MockProcessControl {
                writer: Some(writer),
                state,
            };
            (process, control)
        }

        /// Process that already printed `stdout` and exited with `code`
        pub fn finished(stdout: &str, code: i32) -> (Self, MockProcessControl) {
            let reader = Cursor::new(stdout.as_bytes().to_vec());
            let (process, state) = Self::with_stdout(Box::new(reader), Some(code));
            let control = MockProcessControl {
                writer: None,
                state,
            };
            (process, control)
        }

        /// Same process with its stdout pipe already gone
        pub fn without_stdout(mut self) -> Self {
            self.stdout = None;
            self
        }

        fn with_stdout(stdout: ProcessStdout, exit: Option<i32>) -> (Self, Arc<SharedState>) {
            let (exit_tx, exit_rx) = watch::channel(exit);
            let state = Arc::new(SharedState {
                exit_tx,
                kills: AtomicUsize::new(0),
            });
            let process = Self {
                stdout: Some(stdout),
                exit_rx,
                state: Arc::clone(&state),
            };
            (process, state)
        }
    }

    #[async_trait]
    impl ProcessHandle for MockProcess {
        fn id(&self) -> Option<u32> {
            None
        }

        fn take_stdout(&mut self) -> Option<ProcessStdout> {
            self.stdout.take()
        }

        async fn wait(&mut self) -> Result<Option<i32>, ProcessError> {
            let code = self
                .exit_rx
                .wait_for(|code| code.is_some())
                .await
                .map_err(|e| ProcessError::IoError(e.to_string()))?;
            Ok(*code)
        }

        async fn kill(&mut self) -> Result<(), ProcessError> {
            self.state.kills.fetch_add(1, Ordering::SeqCst);
            self.state.exit_tx.send_if_modified(|code| {
                if code.is_none() {
                    *code = Some(KILLED_EXIT_CODE);
                    true
                } else {
                    false
                }
            });
            Ok(())
        }
    }

    impl MockProcessControl {
        /// Write raw bytes to the process stdout
        pub async fn write(&mut self, bytes: &[u8]) {
            if let Some(writer) = self.writer.as_mut() {
                let _ = writer.write_all(bytes).await;
            }
        }

        /// Write `line` followed by `\n`
        pub async fn write_line(&mut self, line: &str) {
            self.write(format!("{line}\n").as_bytes()).await;
        }

        /// Close stdout and report exit with `code`
        pub fn exit(&mut self, code: i32) {
            self.writer = None;
            self.state.exit_tx.send_replace(Some(code));
        }

        /// Number of times `kill` was called on the process
        pub fn kill_count(&self) -> usize {
            self.state.kills.load(Ordering::SeqCst)
        }

        pub fn exit_code(&self) -> Option<i32> {
            *self.state.exit_tx.borrow()
        }
    }

    /// Scripted spawner
    ///
    /// `run` pops queued outputs, `spawn` pops queued processes, both in order.
    #[derive(Default)]
    pub struct MockProcessSpawner {
        outputs: Mutex<VecDeque<Result<ProcessOutput, ProcessError>>>,
        processes: Mutex<VecDeque<Result<MockProcess, ProcessError>>>,
        calls: Mutex<Vec<CommandSpec>>,
        spawn_gate: Option<Arc<Notify>>,
    }

    impl MockProcessSpawner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a completed run with the given stdout and exit code
        pub fn with_output(self, stdout: &str, exit_code: i32) -> Self {
            self.with_run_result(Ok(ProcessOutput {
                exit_code: Some(exit_code),
                stdout: stdout.to_string(),
                stderr: String::new(),
            }))
        }

        pub fn with_run_result(self, result: Result<ProcessOutput, ProcessError>) -> Self {
            locked(&self.outputs).push_back(result);
            self
        }

        pub fn with_process(self, process: MockProcess) -> Self {
            locked(&self.processes).push_back(Ok(process));
            self
        }

        pub fn with_spawn_error(self, message: &str) -> Self {
            locked(&self.processes).push_back(Err(ProcessError::SpawnFailed(message.to_string())));
            self
        }

        /// Make `spawn` block until `gate` is notified
        pub fn with_spawn_gate(mut self, gate: Arc<Notify>) -> Self {
            self.spawn_gate = Some(gate);
            self
        }

        /// Every command passed to `run` or `spawn`, in call order
        pub fn calls(&self) -> Vec<CommandSpec> {
            locked(&self.calls).clone()
        }

        pub fn call_count(&self) -> usize {
            locked(&self.calls).len()
        }
    }

    #[async_trait]
    impl ProcessSpawner for MockProcessSpawner {
        async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, ProcessError> {
            locked(&self.calls).push(command.clone());
            locked(&self.outputs).pop_front().unwrap_or_else(|| {
                Err(ProcessError::SpawnFailed(format!(
                    "no scripted output for {command}"
                )))
            })
        }

        async fn spawn(
            &self,
            command: &CommandSpec,
        ) -> Result<Box<dyn ProcessHandle>, ProcessError> {
            locked(&self.calls).push(command.clone());
            if let Some(gate) = &self.spawn_gate {
                gate.notified().await;
            }
            let next = locked(&self.processes).pop_front();
            match next {
                Some(Ok(process)) => Ok(Box::new(process)),
                Some(Err(e)) => Err(e),
                None => Err(ProcessError::SpawnFailed(format!(
                    "no scripted process for {command}"
                ))),
            }
        }
    }
}
