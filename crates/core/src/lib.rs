// fxdev Core - Domain, Ports & Tool Orchestration
// NO host access here: processes, files and env vars all go through ports

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
