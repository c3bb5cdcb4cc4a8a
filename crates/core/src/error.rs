// Central Error Type for the tool wrappers

use thiserror::Error;

/// Application-level error type
///
/// The log streaming path never surfaces these; they are for the
/// request/response tool wrappers (dev_finder, pm, kernel_compiler).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Tool unavailable: {0}")]
    ToolUnavailable(&'static str),

    #[error("{tool} failed with exit code {code:?}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Process error: {0}")]
    Process(#[from] crate::port::ProcessError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
