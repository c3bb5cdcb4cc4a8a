// Artifact Locator - resolves tool binaries and the ssh config on disk

use crate::application::constants::*;
use crate::domain::{ArtifactBundle, HostPlatform};
use crate::port::{Environment, FileSystem};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Finds `dev_finder`, `pm`, `kernel_compiler` and the ssh config
///
/// Missing pieces are reported as absent fields, never as errors.
pub struct ArtifactLocator {
    platform: HostPlatform,
    env: Arc<dyn Environment>,
    fs: Arc<dyn FileSystem>,
    cache_root: Option<PathBuf>,
}

impl ArtifactLocator {
    /// Create a new locator
    ///
    /// # Arguments
    /// * `platform` - Host OS family; unsupported hosts resolve nothing
    /// * `env` - Environment variable lookup
    /// * `fs` - File existence checks
    /// * `cache_root` - Artifact cache root (`<root>/fuchsia/tools/...`), if known
    pub fn new(
        platform: HostPlatform,
        env: Arc<dyn Environment>,
        fs: Arc<dyn FileSystem>,
        cache_root: Option<PathBuf>,
    ) -> Self {
        Self {
            platform,
            env,
            fs,
            cache_root,
        }
    }

    /// Resolve the artifact bundle
    pub fn locate(&self) -> ArtifactBundle {
        if !self.platform.is_supported() {
            debug!(platform = ?self.platform, "Host platform has no Fuchsia tools");
            return ArtifactBundle::empty();
        }

        let ssh_config = self.ssh_config();
        let tools_dir = self.tools_dir();
        let tool = |name: &str| {
            tools_dir
                .as_ref()
                .and_then(|dir| self.existing(dir.join(name)))
        };

        let bundle = ArtifactBundle::new(
            ssh_config,
            tool(DEV_FINDER_TOOL),
            tool(PM_TOOL),
            tool(KERNEL_COMPILER_TOOL),
        );

        debug!(
            ssh_config = ?bundle.ssh_config(),
            dev_finder = ?bundle.dev_finder(),
            pm = ?bundle.pm(),
            kernel_compiler = ?bundle.kernel_compiler(),
            "Resolved Fuchsia artifacts"
        );

        bundle
    }

    /// `FUCHSIA_BUILD_DIR` wins over `FUCHSIA_SSH_CONFIG` whenever it is set,
    /// even to an empty value; no fall-through. Values are used verbatim.
    fn ssh_config(&self) -> Option<PathBuf> {
        let candidate = if let Some(build_dir) = self.env.var(ENV_BUILD_DIR) {
            BUILD_DIR_SSH_CONFIG
                .iter()
                .fold(PathBuf::from(build_dir), |path, part| path.join(part))
        } else {
            PathBuf::from(self.env.var(ENV_SSH_CONFIG)?)
        };

        self.existing(candidate)
    }

    fn tools_dir(&self) -> Option<PathBuf> {
        let root = self.cache_root.as_deref()?;
        Some(CACHE_TOOLS_DIR.iter().fold(root.to_path_buf(), |path, part| path.join(part)))
    }

    fn existing(&self, path: PathBuf) -> Option<PathBuf> {
        if self.fs.is_file(&path) {
            Some(path)
        } else {
            debug!(path = %path.display(), "Artifact not found");
            None
        }
    }
}
