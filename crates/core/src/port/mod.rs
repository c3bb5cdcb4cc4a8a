// Port Layer - Interfaces for host capabilities

pub mod diagnostics;
pub mod environment;
pub mod filesystem;
pub mod process;

// Re-exports
pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use environment::Environment;
pub use filesystem::FileSystem;
pub use process::{
    CommandSpec, ProcessError, ProcessHandle, ProcessOutput, ProcessSpawner, ProcessStdout,
};
