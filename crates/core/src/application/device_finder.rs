// Device Finder - wraps the `dev_finder` host tool

use crate::application::constants::*;
use crate::domain::DeviceId;
use crate::error::{AppError, Result};
use crate::port::{CommandSpec, ProcessSpawner};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Discovers Fuchsia devices on the local network
pub struct DevFinder {
    tool: Option<PathBuf>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl DevFinder {
    /// `tool` is the `dev_finder` path from the artifact bundle, if any
    pub fn new(tool: Option<PathBuf>, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self { tool, spawner }
    }

    /// First device in `dev_finder list -full` output order
    ///
    /// Missing tool, failed tool and empty listing all yield `None`; use
    /// [`DevFinder::list_all`] to tell them apart.
    pub async fn list_devices(&self) -> Option<DeviceId> {
        match self.list_all().await {
            Ok(devices) => {
                if devices.is_empty() {
                    debug!("dev_finder found no devices");
                }
                devices.into_iter().next()
            }
            Err(AppError::ToolUnavailable(tool)) => {
                debug!(tool, "Device discovery skipped: tool not available");
                None
            }
            Err(e) => {
                warn!(error = %e, "Device discovery failed");
                None
            }
        }
    }

    /// Every device reported by `dev_finder list -full`
    ///
    /// # Errors
    /// - AppError::ToolUnavailable if `dev_finder` was not located (nothing is spawned)
    /// - AppError::Process if the tool cannot be started
    /// - AppError::ToolFailed on non-zero exit
    pub async fn list_all(&self) -> Result<Vec<DeviceId>> {
        let stdout = self.run(DEV_FINDER_LIST_ARGS).await?;
        Ok(stdout.lines().filter_map(DeviceId::parse_line).collect())
    }

    /// Resolve a device node name to its address
    ///
    /// Runs `dev_finder resolve -local -device-limit 1 <name>`. Returns
    /// `Ok(None)` when the tool succeeds but prints nothing.
    pub async fn resolve(&self, name: &str) -> Result<Option<String>> {
        let stdout = self
            .run(DEV_FINDER_RESOLVE_ARGS.into_iter().chain([name]))
            .await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string))
    }

    async fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tool = self
            .tool
            .as_ref()
            .ok_or(AppError::ToolUnavailable(DEV_FINDER_TOOL))?;
        let command = CommandSpec::new(tool).args(args);

        debug!(command = %command, "Running dev_finder");
        let output = self.spawner.run(&command).await?;

        if !output.success() {
            return Err(AppError::ToolFailed {
                tool: DEV_FINDER_TOOL,
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
