// Environment and filesystem adapters backed by std

use fxdev_core::port::{Environment, FileSystem};
use std::path::Path;

/// Reads the real process environment
pub struct OsEnvironment;

impl Environment for OsEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Checks the real filesystem
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_file_distinguishes_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ssh_config");
        std::fs::write(&file, "Host *\n").unwrap();

        assert!(OsFileSystem.is_file(&file));
        assert!(!OsFileSystem.is_file(dir.path()));
        assert!(!OsFileSystem.is_file(&dir.path().join("missing")));
    }

    #[test]
    fn test_unset_var_is_none() {
        assert!(OsEnvironment.var("FXDEV_TEST_SURELY_UNSET_VARIABLE").is_none());
    }
}
