// Host platform detection

/// Operating system family of the developer host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl HostPlatform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(os: &str) -> Self {
        match os {
            "linux" => HostPlatform::Linux,
            "macos" => HostPlatform::MacOs,
            "windows" => HostPlatform::Windows,
            _ => HostPlatform::Other,
        }
    }

    /// Fuchsia host tools ship for Linux and macOS only
    pub fn is_supported(self) -> bool {
        matches!(self, HostPlatform::Linux | HostPlatform::MacOs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_families() {
        assert!(HostPlatform::from_os_name("linux").is_supported());
        assert!(HostPlatform::from_os_name("macos").is_supported());
        assert!(!HostPlatform::from_os_name("windows").is_supported());
        assert!(!HostPlatform::from_os_name("freebsd").is_supported());
    }
}
