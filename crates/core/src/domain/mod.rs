// Domain Layer - Plain values shared by every service

pub mod artifact;
pub mod device;
pub mod log_line;
pub mod platform;

// Re-exports
pub use artifact::ArtifactBundle;
pub use device::DeviceId;
pub use log_line::LogLine;
pub use platform::HostPlatform;
