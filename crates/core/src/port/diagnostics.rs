// Diagnostics Port - user-facing error reports and trace notes

/// Sink for diagnostics the orchestration layer reports instead of failing
pub trait Diagnostics: Send + Sync {
    fn error(&self, message: &str);
    fn trace(&self, message: &str);
}

/// Production sink: forwards to `tracing`
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn error(&self, message: &str) {
        tracing::error!(target: "fxdev::diagnostics", "{message}");
    }

    fn trace(&self, message: &str) {
        tracing::trace!(target: "fxdev::diagnostics", "{message}");
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Severity {
        Error,
        Trace,
    }

    /// Records every diagnostic in order
    #[derive(Debug, Default)]
    pub struct RecordingDiagnostics {
        records: Mutex<Vec<(Severity, String)>>,
    }

    impl RecordingDiagnostics {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn records(&self) -> Vec<(Severity, String)> {
            self.records
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        pub fn errors(&self) -> Vec<String> {
            self.by_severity(Severity::Error)
        }

        pub fn traces(&self) -> Vec<String> {
            self.by_severity(Severity::Trace)
        }

        fn by_severity(&self, severity: Severity) -> Vec<String> {
            self.records()
                .into_iter()
                .filter(|(s, _)| *s == severity)
                .map(|(_, message)| message)
                .collect()
        }

        fn push(&self, severity: Severity, message: &str) {
            self.records
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((severity, message.to_string()));
        }
    }

    impl Diagnostics for RecordingDiagnostics {
        fn error(&self, message: &str) {
            self.push(Severity::Error, message);
        }

        fn trace(&self, message: &str) {
            self.push(Severity::Trace, message);
        }
    }
}
