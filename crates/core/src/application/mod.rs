// Application Layer - Tool orchestration services

pub mod artifact_locator;
pub mod constants;
pub mod device_finder;
pub mod kernel_compiler;
pub mod log_stream;
pub mod pm;
pub mod toolbox;

// Re-exports
pub use artifact_locator::ArtifactLocator;
pub use device_finder::DevFinder;
pub use kernel_compiler::{KernelArtifacts, KernelCompileRequest, KernelCompiler};
pub use log_stream::{LogStream, LogStreamer};
pub use pm::Pm;
pub use toolbox::{HostPorts, Toolbox};
