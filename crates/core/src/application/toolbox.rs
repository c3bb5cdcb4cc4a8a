// Toolbox - explicit registry of the Fuchsia tool wrappers
//
// Built once by the composition root and passed by reference. Every handle is
// constructed on first access and reused afterwards.

use crate::application::artifact_locator::ArtifactLocator;
use crate::application::device_finder::DevFinder;
use crate::application::kernel_compiler::KernelCompiler;
use crate::application::log_stream::{LogStream, LogStreamer};
use crate::application::pm::Pm;
use crate::domain::{ArtifactBundle, DeviceId, HostPlatform};
use crate::port::{Diagnostics, Environment, FileSystem, ProcessSpawner};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Host capabilities injected into the toolbox
#[derive(Clone)]
pub struct HostPorts {
    pub spawner: Arc<dyn ProcessSpawner>,
    pub fs: Arc<dyn FileSystem>,
    pub env: Arc<dyn Environment>,
    pub diagnostics: Arc<dyn Diagnostics>,
}

pub struct Toolbox {
    ports: HostPorts,
    platform: HostPlatform,
    cache_root: Option<PathBuf>,
    artifacts: OnceLock<ArtifactBundle>,
    dev_finder: OnceLock<DevFinder>,
    pm: OnceLock<Pm>,
    kernel_compiler: OnceLock<KernelCompiler>,
    log_streamer: OnceLock<LogStreamer>,
}

impl Toolbox {
    /// Create a toolbox
    ///
    /// # Arguments
    /// * `ports` - Process, filesystem, environment and diagnostics capabilities
    /// * `platform` - Host OS family
    /// * `cache_root` - Artifact cache root holding `fuchsia/tools/`
    pub fn new(ports: HostPorts, platform: HostPlatform, cache_root: Option<PathBuf>) -> Self {
        Self {
            ports,
            platform,
            cache_root,
            artifacts: OnceLock::new(),
            dev_finder: OnceLock::new(),
            pm: OnceLock::new(),
            kernel_compiler: OnceLock::new(),
            log_streamer: OnceLock::new(),
        }
    }

    /// Artifact bundle, located on first access
    pub fn artifacts(&self) -> &ArtifactBundle {
        self.artifacts.get_or_init(|| {
            ArtifactLocator::new(
                self.platform,
                Arc::clone(&self.ports.env),
                Arc::clone(&self.ports.fs),
                self.cache_root.clone(),
            )
            .locate()
        })
    }

    pub fn dev_finder(&self) -> &DevFinder {
        self.dev_finder.get_or_init(|| {
            DevFinder::new(
                owned(self.artifacts().dev_finder()),
                Arc::clone(&self.ports.spawner),
            )
        })
    }

    pub fn pm(&self) -> &Pm {
        self.pm.get_or_init(|| {
            Pm::new(
                owned(self.artifacts().pm()),
                Arc::clone(&self.ports.spawner),
            )
        })
    }

    pub fn kernel_compiler(&self) -> &KernelCompiler {
        self.kernel_compiler.get_or_init(|| {
            KernelCompiler::new(
                owned(self.artifacts().kernel_compiler()),
                Arc::clone(&self.ports.spawner),
            )
        })
    }

    pub fn log_streamer(&self) -> &LogStreamer {
        self.log_streamer.get_or_init(|| {
            LogStreamer::new(
                Arc::clone(&self.ports.spawner),
                Arc::clone(&self.ports.fs),
                Arc::clone(&self.ports.diagnostics),
            )
        })
    }

    /// First attached device, if any
    pub async fn list_devices(&self) -> Option<DeviceId> {
        self.dev_finder().list_devices().await
    }

    /// System log of `device`, streamed over ssh
    pub fn syslogs(&self, device: &DeviceId) -> LogStream {
        self.log_streamer()
            .stream_logs(device, self.artifacts().ssh_config())
    }
}

fn owned(path: Option<&Path>) -> Option<PathBuf> {
    path.map(Path::to_path_buf)
}
