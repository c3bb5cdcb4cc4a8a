//! Shared fixtures for end-to-end tests: fake Fuchsia host tools on disk

#[cfg(unix)]
pub mod fixture;
