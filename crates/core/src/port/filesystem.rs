// Filesystem Port (existence checks only)

use std::path::Path;

/// Filesystem probing used while resolving artifacts
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem: Send + Sync {
    /// True if `path` exists and is a regular file
    fn is_file(&self, path: &Path) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    /// In-memory set of files that "exist"
    #[derive(Debug, Clone, Default)]
    pub struct StaticFileSystem {
        files: HashSet<PathBuf>,
    }

    impl StaticFileSystem {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
            self.files.insert(path.into());
            self
        }
    }

    impl FileSystem for StaticFileSystem {
        fn is_file(&self, path: &Path) -> bool {
            self.files.contains(path)
        }
    }
}
