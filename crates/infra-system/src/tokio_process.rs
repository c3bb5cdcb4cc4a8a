// Process spawner implementation
// reason: tokio::process for async spawn/wait, nix for graceful SIGTERM on unix
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use fxdev_core::port::process::{
    CommandSpec, ProcessError, ProcessHandle, ProcessOutput, ProcessSpawner, ProcessStdout,
};

/// Time a process gets to exit after SIGTERM before SIGKILL
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(2);

/// Spawns real child processes (no shell involved)
pub struct TokioProcessSpawner {
    kill_grace: Duration,
}

impl TokioProcessSpawner {
    pub fn new() -> Self {
        Self {
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }

    /// Override the SIGTERM grace period
    pub fn with_kill_grace(mut self, kill_grace: Duration) -> Self {
        self.kill_grace = kill_grace;
        self
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut command = Command::new(spec.program());
        command
            .args(spec.get_args())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

impl Default for TokioProcessSpawner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessSpawner for TokioProcessSpawner {
    async fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput, ProcessError> {
        debug!(command = %spec, "Running process to completion");

        let output = Self::command(spec)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ProcessError::SpawnFailed(format!("{}: {e}", spec.program().display())))?;

        let result = ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(command = %spec, exit_code = ?result.exit_code, "Process completed");
        Ok(result)
    }

    async fn spawn(&self, spec: &CommandSpec) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        // stderr is inherited: ssh connection errors reach the user directly
        let child = Self::command(spec)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ProcessError::SpawnFailed(format!("{}: {e}", spec.program().display())))?;

        info!(command = %spec, pid = ?child.id(), "Spawned process");
        Ok(Box::new(TokioProcess::new(child, self.kill_grace)))
    }
}

/// Handle over a `tokio::process::Child`
pub struct TokioProcess {
    child: Child,
    exit: Option<Option<i32>>,
    kill_grace: Duration,
}

impl TokioProcess {
    fn new(child: Child, kill_grace: Duration) -> Self {
        Self {
            child,
            exit: None,
            kill_grace,
        }
    }

    /// Reaped already, or exited without us noticing yet
    fn has_exited(&mut self) -> bool {
        if self.exit.is_some() {
            return true;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.exit = Some(status.code());
                true
            }
            _ => false,
        }
    }

    /// SIGTERM first so ssh can tear the remote session down
    #[cfg(unix)]
    async fn terminate_gracefully(&mut self) -> Result<bool, ProcessError> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.child.id() else {
            return Ok(false);
        };

        debug!(pid = %pid, "Sending SIGTERM");
        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => return Err(ProcessError::KillFailed(format!("SIGTERM failed: {e}"))),
        }

        match timeout(self.kill_grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                self.exit = Some(status.code());
                debug!(pid = %pid, "Process exited after SIGTERM");
                Ok(true)
            }
            Ok(Err(e)) => Err(ProcessError::IoError(e.to_string())),
            Err(_) => {
                warn!(pid = %pid, "Process did not exit after SIGTERM, sending SIGKILL");
                Ok(false)
            }
        }
    }

    #[cfg(not(unix))]
    async fn terminate_gracefully(&mut self) -> Result<bool, ProcessError> {
        Ok(false)
    }
}

#[async_trait]
impl ProcessHandle for TokioProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn take_stdout(&mut self) -> Option<ProcessStdout> {
        self.child
            .stdout
            .take()
            .map(|stdout| Box::new(stdout) as ProcessStdout)
    }

    async fn wait(&mut self) -> Result<Option<i32>, ProcessError> {
        if let Some(code) = self.exit {
            return Ok(code);
        }
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| ProcessError::IoError(e.to_string()))?;
        self.exit = Some(status.code());
        Ok(status.code())
    }

    async fn kill(&mut self) -> Result<(), ProcessError> {
        if self.has_exited() {
            debug!("Kill skipped: process already exited");
            return Ok(());
        }

        if self.terminate_gracefully().await? {
            return Ok(());
        }

        self.child
            .kill()
            .await
            .map_err(|e| ProcessError::KillFailed(e.to_string()))?;
        self.exit = Some(None);
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").args(["-c", script])
    }

    #[tokio::test]
    async fn test_run_captures_output() {
        let spawner = TokioProcessSpawner::new();

        let output = spawner
            .run(&sh("echo hello; echo oops >&2; exit 3"))
            .await
            .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "oops\n");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_run_missing_binary() {
        let spawner = TokioProcessSpawner::new();

        let result = spawner
            .run(&CommandSpec::new("/definitely/not/a/tool"))
            .await;

        assert!(matches!(result, Err(ProcessError::SpawnFailed(_))));
    }

    #[tokio::test]
    async fn test_spawn_streams_stdout_and_exits() {
        let spawner = TokioProcessSpawner::new();
        let mut process = spawner.spawn(&sh("printf 'a\\nb\\n'")).await.unwrap();

        let mut stdout = process.take_stdout().unwrap();
        assert!(process.take_stdout().is_none());
        let mut text = String::new();
        stdout.read_to_string(&mut text).await.unwrap();

        assert_eq!(text, "a\nb\n");
        assert_eq!(process.wait().await.unwrap(), Some(0));
        // Already exited: kill is a no-op
        process.kill().await.unwrap();
        assert_eq!(process.wait().await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_kill_running_process() {
        let spawner = TokioProcessSpawner::new().with_kill_grace(Duration::from_millis(500));
        let mut process = spawner.spawn(&sh("exec sleep 30")).await.unwrap();
        assert!(process.id().is_some());

        timeout(Duration::from_secs(5), process.kill())
            .await
            .expect("kill hung")
            .unwrap();

        // Terminated by a signal: no exit code
        assert_eq!(process.wait().await.unwrap(), None);
        process.kill().await.unwrap();
    }

    #[tokio::test]
    async fn test_kill_escalates_when_sigterm_ignored() {
        let spawner = TokioProcessSpawner::new().with_kill_grace(Duration::from_millis(100));
        let mut process = spawner
            .spawn(&sh("trap '' TERM; echo ready; while :; do sleep 1; done"))
            .await
            .unwrap();

        // Wait until the trap is installed
        let mut stdout = process.take_stdout().unwrap();
        let mut ready = [0u8; 6];
        stdout.read_exact(&mut ready).await.unwrap();

        timeout(Duration::from_secs(5), process.kill())
            .await
            .expect("kill hung")
            .unwrap();

        assert_eq!(process.wait().await.unwrap(), None);
    }
}
