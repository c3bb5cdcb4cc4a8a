// Artifact Bundle - resolved tool paths for one process run

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Resolved set of tool and config paths needed to talk to a device
///
/// Built once by `ArtifactLocator::locate`. Every present field pointed at an
/// existing file when the bundle was constructed; `None` means unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactBundle {
    ssh_config: Option<PathBuf>,
    dev_finder: Option<PathBuf>,
    pm: Option<PathBuf>,
    kernel_compiler: Option<PathBuf>,
}

impl ArtifactBundle {
    pub fn new(
        ssh_config: Option<PathBuf>,
        dev_finder: Option<PathBuf>,
        pm: Option<PathBuf>,
        kernel_compiler: Option<PathBuf>,
    ) -> Self {
        Self {
            ssh_config,
            dev_finder,
            pm,
            kernel_compiler,
        }
    }

    /// Bundle with every field absent (unsupported host)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ssh_config(&self) -> Option<&Path> {
        self.ssh_config.as_deref()
    }

    pub fn dev_finder(&self) -> Option<&Path> {
        self.dev_finder.as_deref()
    }

    pub fn pm(&self) -> Option<&Path> {
        self.pm.as_deref()
    }

    pub fn kernel_compiler(&self) -> Option<&Path> {
        self.kernel_compiler.as_deref()
    }

    /// True when nothing was resolved
    pub fn is_empty(&self) -> bool {
        self == &Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bundle() {
        let bundle = ArtifactBundle::empty();
        assert!(bundle.is_empty());
        assert!(bundle.ssh_config().is_none());
        assert!(bundle.dev_finder().is_none());
        assert!(bundle.pm().is_none());
        assert!(bundle.kernel_compiler().is_none());
    }

    #[test]
    fn test_serializes_absent_fields_as_null() {
        let bundle = ArtifactBundle::new(None, Some(PathBuf::from("/cache/dev_finder")), None, None);
        let value = serde_json::to_value(&bundle).unwrap();

        assert_eq!(value["dev_finder"], "/cache/dev_finder");
        assert!(value["ssh_config"].is_null());
        assert!(!bundle.is_empty());
    }
}
