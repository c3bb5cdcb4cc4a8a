// Fake Fuchsia workspace: build dir with ssh config, artifact cache with tools

use async_trait::async_trait;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use fxdev_core::application::constants::{DEV_FINDER_TOOL, ENV_BUILD_DIR, SSH_PROGRAM};
use fxdev_core::application::{HostPorts, Toolbox};
use fxdev_core::domain::HostPlatform;
use fxdev_core::port::diagnostics::mocks::RecordingDiagnostics;
use fxdev_core::port::environment::mocks::MapEnvironment;
use fxdev_core::port::{CommandSpec, ProcessError, ProcessHandle, ProcessOutput, ProcessSpawner};
use fxdev_infra_system::{OsFileSystem, TokioProcessSpawner};

/// Real spawner that runs a fake script whenever `ssh` is requested
pub struct SshRedirect {
    inner: TokioProcessSpawner,
    ssh: PathBuf,
}

impl SshRedirect {
    fn redirect(&self, command: &CommandSpec) -> CommandSpec {
        if command.program() == Path::new(SSH_PROGRAM) {
            CommandSpec::new(&self.ssh).args(command.get_args().iter().cloned())
        } else {
            command.clone()
        }
    }
}

#[async_trait]
impl ProcessSpawner for SshRedirect {
    async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, ProcessError> {
        self.inner.run(&self.redirect(command)).await
    }

    async fn spawn(&self, command: &CommandSpec) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        self.inner.spawn(&self.redirect(command)).await
    }
}

pub struct FakeFuchsia {
    root: TempDir,
}

impl FakeFuchsia {
    /// Build dir with `ssh-keys/ssh_config` and an empty tools dir
    pub fn new() -> io::Result<Self> {
        let fake = Self {
            root: tempfile::tempdir()?,
        };
        fs::create_dir_all(fake.ssh_config().parent().unwrap_or(fake.root.path()))?;
        fs::write(fake.ssh_config(), "Host *\n  StrictHostKeyChecking no\n")?;
        fs::create_dir_all(fake.tools_dir())?;
        Ok(fake)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.path().join("out").join("default")
    }

    pub fn ssh_config(&self) -> PathBuf {
        self.build_dir().join("ssh-keys").join("ssh_config")
    }

    pub fn cache_root(&self) -> PathBuf {
        self.root.path().join("cache")
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.cache_root().join("fuchsia").join("tools")
    }

    /// Where the fake ssh records its arguments, one per line
    pub fn ssh_args_file(&self) -> PathBuf {
        self.root.path().join("ssh_args")
    }

    /// Where a fake script may write its pid
    pub fn pid_file(&self) -> PathBuf {
        self.root.path().join("ssh.pid")
    }

    fn ssh_script(&self) -> PathBuf {
        self.root.path().join("fake_ssh")
    }

    /// `dev_finder` that prints `list_output` for `list` and exits with `code`
    pub fn install_dev_finder(&self, list_output: &str, code: i32) -> io::Result<()> {
        let body = format!(
            "if [ \"$1\" = list ]; then printf '%s' '{list_output}'; fi\nexit {code}\n"
        );
        write_script(&self.tools_dir().join(DEV_FINDER_TOOL), &body)
    }

    /// Fake `ssh`: records its arguments, then runs `body`
    pub fn install_ssh(&self, body: &str) -> io::Result<()> {
        let script = format!(
            "printf '%s\\n' \"$@\" > '{}'\n{body}\n",
            self.ssh_args_file().display()
        );
        write_script(&self.ssh_script(), &script)
    }

    pub fn recorded_ssh_args(&self) -> io::Result<Vec<String>> {
        Ok(fs::read_to_string(self.ssh_args_file())?
            .lines()
            .map(str::to_string)
            .collect())
    }

    pub fn recorded_pid(&self) -> io::Result<u32> {
        fs::read_to_string(self.pid_file())?
            .trim()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Toolbox over real processes, with `FUCHSIA_BUILD_DIR` pointing here
    pub fn toolbox(&self) -> (Toolbox, Arc<RecordingDiagnostics>) {
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let env = MapEnvironment::new().with_var(ENV_BUILD_DIR, self.build_dir().to_string_lossy());

        let ports = HostPorts {
            spawner: Arc::new(SshRedirect {
                inner: TokioProcessSpawner::new(),
                ssh: self.ssh_script(),
            }),
            fs: Arc::new(OsFileSystem),
            env: Arc::new(env),
            diagnostics: diagnostics.clone(),
        };

        let toolbox = Toolbox::new(ports, HostPlatform::Linux, Some(self.cache_root()));
        (toolbox, diagnostics)
    }
}

/// True while `pid` refers to a live process
pub fn is_alive(pid: u32) -> bool {
    std::process::Command::new("sh")
        .args(["-c", &format!("kill -0 {pid} 2>/dev/null")])
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn write_script(path: &Path, body: &str) -> io::Result<()> {
    fs::write(path, format!("#!/bin/sh\n{body}"))?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}
