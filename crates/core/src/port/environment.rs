// Environment Port (for testability)

/// Environment variable lookup
#[cfg_attr(test, mockall::automock)]
pub trait Environment: Send + Sync {
    /// Value of `key`, or `None` when unset or not valid unicode
    fn var(&self, key: &str) -> Option<String>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;

    /// Fixed set of variables
    #[derive(Debug, Clone, Default)]
    pub struct MapEnvironment {
        vars: HashMap<String, String>,
    }

    impl MapEnvironment {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
            self.vars.insert(key.into(), value.into());
            self
        }
    }

    impl Environment for MapEnvironment {
        fn var(&self, key: &str) -> Option<String> {
            self.vars.get(key).cloned()
        }
    }
}
