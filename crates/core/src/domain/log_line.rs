// Log Line - one line of remote stdout, passed through verbatim

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine(String);

impl LogLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Decode one raw line read from a process pipe
    ///
    /// Strips a trailing `\n` or `\r\n`. Invalid UTF-8 is replaced, not rejected.
    pub fn from_raw(raw: &[u8]) -> Self {
        let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        Self(String::from_utf8_lossy(raw).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_strips_terminators() {
        assert_eq!(LogLine::from_raw(b"[klog] boot\n").as_str(), "[klog] boot");
        assert_eq!(LogLine::from_raw(b"[klog] boot\r\n").as_str(), "[klog] boot");
        assert_eq!(LogLine::from_raw(b"no newline").as_str(), "no newline");
    }

    #[test]
    fn test_from_raw_keeps_inner_whitespace() {
        assert_eq!(LogLine::from_raw(b"  indented \t\n").as_str(), "  indented \t");
    }

    #[test]
    fn test_from_raw_lossy_utf8() {
        let line = LogLine::from_raw(b"bad \xff byte\n");
        assert_eq!(line.as_str(), "bad \u{fffd} byte");
    }
}
