// Kernel Compiler - builds split kernel (.dil) files for a Fuchsia component

use crate::application::constants::{DEFAULT_KERNEL_TARGET, KERNEL_COMPILER_TOOL};
use crate::error::{AppError, Result};
use crate::port::{CommandSpec, ProcessSpawner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Inputs for one kernel compilation
#[derive(Debug, Clone)]
pub struct KernelCompileRequest {
    pub app_name: String,
    pub main_source: PathBuf,
    pub output_dir: PathBuf,
    pub platform_dill: PathBuf,
    pub packages: Option<PathBuf>,
    pub target: String,
}

impl KernelCompileRequest {
    pub fn new(
        app_name: impl Into<String>,
        main_source: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        platform_dill: impl Into<PathBuf>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            main_source: main_source.into(),
            output_dir: output_dir.into(),
            platform_dill: platform_dill.into(),
            packages: None,
            target: DEFAULT_KERNEL_TARGET.to_string(),
        }
    }

    pub fn with_packages(mut self, packages: impl Into<PathBuf>) -> Self {
        self.packages = Some(packages.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    fn dill_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.dil", self.app_name))
    }

    fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.dilpmanifest", self.app_name))
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--target".to_string(),
            self.target.clone(),
            "--platform".to_string(),
            path_arg(&self.platform_dill),
        ];
        if let Some(packages) = &self.packages {
            args.push("--packages".to_string());
            args.push(path_arg(packages));
        }
        args.extend([
            "--component-name".to_string(),
            self.app_name.clone(),
            "--manifest".to_string(),
            path_arg(&self.manifest_path()),
            "--output".to_string(),
            path_arg(&self.dill_path()),
            "--no-link-platform".to_string(),
            "--split-output-by-packages".to_string(),
            path_arg(&self.main_source),
        ]);
        args
    }
}

/// Files produced by a successful compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelArtifacts {
    pub dill: PathBuf,
    pub manifest: PathBuf,
}

pub struct KernelCompiler {
    tool: Option<PathBuf>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl KernelCompiler {
    pub fn new(tool: Option<PathBuf>, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self { tool, spawner }
    }

    /// Compile `request.main_source` into `<output_dir>/<app>.dil`
    ///
    /// # Errors
    /// - AppError::ToolUnavailable if `kernel_compiler` was not located
    /// - AppError::Process if it cannot be started
    /// - AppError::ToolFailed on non-zero exit
    pub async fn compile(&self, request: &KernelCompileRequest) -> Result<KernelArtifacts> {
        let tool = self
            .tool
            .as_ref()
            .ok_or(AppError::ToolUnavailable(KERNEL_COMPILER_TOOL))?;
        let command = CommandSpec::new(tool).args(request.args());

        debug!(command = %command, "Running kernel compiler");
        let output = self.spawner.run(&command).await?;

        if !output.success() {
            return Err(AppError::ToolFailed {
                tool: KERNEL_COMPILER_TOOL,
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let artifacts = KernelArtifacts {
            dill: request.dill_path(),
            manifest: request.manifest_path(),
        };
        info!(app = %request.app_name, dill = %artifacts.dill.display(), "Kernel compiled");
        Ok(artifacts)
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::process::mocks::MockProcessSpawner;

    fn request() -> KernelCompileRequest {
        KernelCompileRequest::new(
            "hello",
            "/src/hello/lib/main.dart",
            "/out/hello",
            "/sdk/platform_strong.dill",
        )
    }

    #[tokio::test]
    async fn test_compile_args_and_outputs() {
        let spawner = Arc::new(MockProcessSpawner::new().with_output("", 0));
        let compiler = KernelCompiler::new(
            Some(PathBuf::from("/cache/fuchsia/tools/kernel_compiler")),
            spawner.clone(),
        );

        let artifacts = compiler
            .compile(&request().with_packages("/src/hello/.packages"))
            .await
            .unwrap();

        assert_eq!(artifacts.dill, PathBuf::from("/out/hello/hello.dil"));
        assert_eq!(artifacts.manifest, PathBuf::from("/out/hello/hello.dilpmanifest"));
        assert_eq!(
            spawner.calls()[0].get_args(),
            [
                "--target",
                "flutter_runner",
                "--platform",
                "/sdk/platform_strong.dill",
                "--packages",
                "/src/hello/.packages",
                "--component-name",
                "hello",
                "--manifest",
                "/out/hello/hello.dilpmanifest",
                "--output",
                "/out/hello/hello.dil",
                "--no-link-platform",
                "--split-output-by-packages",
                "/src/hello/lib/main.dart",
            ]
        );
    }

    #[test]
    fn test_custom_target_without_packages() {
        let args = request().with_target("dart_runner").args();
        assert_eq!(args[1], "dart_runner");
        assert!(!args.iter().any(|a| a == "--packages"));
    }

    #[tokio::test]
    async fn test_failure_and_missing_tool() {
        let spawner = Arc::new(MockProcessSpawner::new().with_output("", 254));
        let compiler = KernelCompiler::new(Some(PathBuf::from("/kc")), spawner);
        assert!(matches!(
            compiler.compile(&request()).await,
            Err(AppError::ToolFailed { code: Some(254), .. })
        ));

        let compiler = KernelCompiler::new(None, Arc::new(MockProcessSpawner::new()));
        assert!(matches!(
            compiler.compile(&request()).await,
            Err(AppError::ToolUnavailable("kernel_compiler"))
        ));
    }
}
