//! Logging setup
//!
//! Logs go to stderr so stdout carries only command output (device names,
//! syslog lines, JSON).

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Selects `pretty` (default) or `json` log output
pub const ENV_LOG_FORMAT: &str = "FXDEV_LOG_FORMAT";

const DEFAULT_FILTER: &str = "fxdev=info";

/// Initialize the global tracing subscriber
///
/// # Environment Variables
///
/// - `RUST_LOG`: filter directives (default: `fxdev=info`)
/// - `FXDEV_LOG_FORMAT`: `json` for structured logs, anything else for pretty
///
/// # Example
///
/// ```text
/// RUST_LOG=fxdev=debug FXDEV_LOG_FORMAT=json fxdev devices
/// ```
pub fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let log_format = std::env::var(ENV_LOG_FORMAT).unwrap_or_else(|_| "pretty".to_string());

    match log_format.as_str() {
        "json" => {
            // Structured logging for tooling that scrapes stderr
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            // Human-readable, compact enough for an interactive terminal
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}
