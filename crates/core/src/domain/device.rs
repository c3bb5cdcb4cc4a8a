// Device Identifier

use serde::Serialize;
use std::fmt;

/// Opaque device name as printed by `dev_finder list -full`
///
/// Holds the whole line (`"<ip> <name>"`); it is never split.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Build an identifier from one line of tool output
    ///
    /// Returns `None` for blank lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_keeps_whole_line() {
        let id = DeviceId::parse_line("192.168.42.56 paper-pulp-bush-angel\n").unwrap();
        assert_eq!(id.as_str(), "192.168.42.56 paper-pulp-bush-angel");
        assert_eq!(id.to_string(), "192.168.42.56 paper-pulp-bush-angel");
    }

    #[test]
    fn test_parse_line_rejects_blank() {
        assert!(DeviceId::parse_line("").is_none());
        assert!(DeviceId::parse_line("   \r\n").is_none());
    }
}
