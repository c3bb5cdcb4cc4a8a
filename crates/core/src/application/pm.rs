// PM - wraps the Fuchsia package manager host tool

use crate::application::constants::PM_TOOL;
use crate::error::{AppError, Result};
use crate::port::{CommandSpec, ProcessHandle, ProcessSpawner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Typed front end for `pm` (package build, archive, repository publish/serve)
pub struct Pm {
    tool: Option<PathBuf>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl Pm {
    /// `tool` is the `pm` path from the artifact bundle, if any
    pub fn new(tool: Option<PathBuf>, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self { tool, spawner }
    }

    /// `pm -o <build_dir> -n <app_name> init`
    pub async fn init(&self, build_dir: &Path, app_name: &str) -> Result<()> {
        self.run(vec![
            "-o".into(),
            path_arg(build_dir),
            "-n".into(),
            app_name.into(),
            "init".into(),
        ])
        .await
    }

    /// `pm -o <build_dir> -k <key> genkey`
    pub async fn genkey(&self, build_dir: &Path, key: &Path) -> Result<()> {
        self.run(vec![
            "-o".into(),
            path_arg(build_dir),
            "-k".into(),
            path_arg(key),
            "genkey".into(),
        ])
        .await
    }

    /// `pm -o <build_dir> -k <key> -m <manifest> build`
    pub async fn build(&self, build_dir: &Path, key: &Path, manifest: &Path) -> Result<()> {
        self.run(package_args(build_dir, key, manifest, "build"))
            .await
    }

    /// `pm -o <build_dir> -k <key> -m <manifest> archive`
    pub async fn archive(&self, build_dir: &Path, key: &Path, manifest: &Path) -> Result<()> {
        self.run(package_args(build_dir, key, manifest, "archive"))
            .await
    }

    /// `pm newrepo -repo <repo>`
    pub async fn newrepo(&self, repo: &Path) -> Result<()> {
        self.run(vec!["newrepo".into(), "-repo".into(), path_arg(repo)])
            .await
    }

    /// `pm publish -a -r <repo> -f <package>`
    pub async fn publish(&self, repo: &Path, package: &Path) -> Result<()> {
        self.run(vec![
            "publish".into(),
            "-a".into(),
            "-r".into(),
            path_arg(repo),
            "-f".into(),
            path_arg(package),
        ])
        .await
    }

    /// Start `pm serve -repo <repo> -l <host>:<port>`
    ///
    /// The server keeps running until the caller kills the returned handle.
    pub async fn serve(&self, repo: &Path, host: &str, port: u16) -> Result<Box<dyn ProcessHandle>> {
        let command = self.command(vec![
            "serve".into(),
            "-repo".into(),
            path_arg(repo),
            "-l".into(),
            format!("{host}:{port}"),
        ])?;

        info!(command = %command, "Starting package server");
        Ok(self.spawner.spawn(&command).await?)
    }

    fn command(&self, args: Vec<String>) -> Result<CommandSpec> {
        let tool = self
            .tool
            .as_ref()
            .ok_or(AppError::ToolUnavailable(PM_TOOL))?;
        Ok(CommandSpec::new(tool).args(args))
    }

    async fn run(&self, args: Vec<String>) -> Result<()> {
        let command = self.command(args)?;

        debug!(command = %command, "Running pm");
        let output = self.spawner.run(&command).await?;

        if !output.success() {
            return Err(AppError::ToolFailed {
                tool: PM_TOOL,
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn package_args(build_dir: &Path, key: &Path, manifest: &Path, verb: &str) -> Vec<String> {
    vec![
        "-o".into(),
        path_arg(build_dir),
        "-k".into(),
        path_arg(key),
        "-m".into(),
        path_arg(manifest),
        verb.into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::process::mocks::{MockProcess, MockProcessSpawner};
    use crate::port::ProcessOutput;

    const TOOL: &str = "/cache/fuchsia/tools/pm";

    fn pm(spawner: &Arc<MockProcessSpawner>) -> Pm {
        Pm::new(Some(PathBuf::from(TOOL)), spawner.clone())
    }

    #[tokio::test]
    async fn test_build_and_archive_args() {
        let spawner = Arc::new(MockProcessSpawner::new().with_output("", 0).with_output("", 0));
        let pm = pm(&spawner);
        let (out, key, manifest) = (
            Path::new("/out/pkg"),
            Path::new("/out/pkg/key"),
            Path::new("/out/pkg/package_manifest"),
        );

        pm.build(out, key, manifest).await.unwrap();
        pm.archive(out, key, manifest).await.unwrap();

        let calls = spawner.calls();
        assert_eq!(calls[0].program(), Path::new(TOOL));
        assert_eq!(
            calls[0].get_args(),
            ["-o", "/out/pkg", "-k", "/out/pkg/key", "-m", "/out/pkg/package_manifest", "build"]
        );
        assert_eq!(calls[1].get_args().last().map(String::as_str), Some("archive"));
    }

    #[tokio::test]
    async fn test_repo_commands() {
        let spawner = Arc::new(
            MockProcessSpawner::new()
                .with_output("", 0)
                .with_output("", 0)
                .with_output("", 0)
                .with_output("", 0),
        );
        let pm = pm(&spawner);

        pm.init(Path::new("/out/pkg"), "hello").await.unwrap();
        pm.genkey(Path::new("/out/pkg"), Path::new("/out/pkg/key"))
            .await
            .unwrap();
        pm.newrepo(Path::new("/out/repo")).await.unwrap();
        pm.publish(Path::new("/out/repo"), Path::new("/out/pkg/hello-0.far"))
            .await
            .unwrap();

        let calls = spawner.calls();
        assert_eq!(calls[0].get_args(), ["-o", "/out/pkg", "-n", "hello", "init"]);
        assert_eq!(
            calls[1].get_args(),
            ["-o", "/out/pkg", "-k", "/out/pkg/key", "genkey"]
        );
        assert_eq!(calls[2].get_args(), ["newrepo", "-repo", "/out/repo"]);
        assert_eq!(
            calls[3].get_args(),
            ["publish", "-a", "-r", "/out/repo", "-f", "/out/pkg/hello-0.far"]
        );
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_tool_failed() {
        let spawner = Arc::new(MockProcessSpawner::new().with_run_result(Ok(ProcessOutput {
            exit_code: Some(2),
            stdout: String::new(),
            stderr: "manifest not found\n".to_string(),
        })));

        let result = pm(&spawner).newrepo(Path::new("/out/repo")).await;

        assert!(matches!(
            result,
            Err(AppError::ToolFailed { tool: "pm", code: Some(2), .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let spawner = Arc::new(MockProcessSpawner::new());
        let pm = Pm::new(None, spawner.clone());

        assert!(matches!(
            pm.newrepo(Path::new("/out/repo")).await,
            Err(AppError::ToolUnavailable("pm"))
        ));
        assert!(pm.serve(Path::new("/out/repo"), "0.0.0.0", 8083).await.is_err());
        assert_eq!(spawner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_serve_returns_owned_handle() {
        let (process, control) = MockProcess::new();
        let spawner = Arc::new(MockProcessSpawner::new().with_process(process));

        let mut server = pm(&spawner)
            .serve(Path::new("/out/repo"), "0.0.0.0", 8083)
            .await
            .unwrap();
        assert_eq!(
            spawner.calls()[0].get_args(),
            ["serve", "-repo", "/out/repo", "-l", "0.0.0.0:8083"]
        );

        server.kill().await.unwrap();
        assert_eq!(control.kill_count(), 1);
    }
}
