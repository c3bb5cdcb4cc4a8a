// fxdev Infrastructure - Host Adapters
// Implements: ProcessSpawner, Environment, FileSystem

pub mod cache_dir;
pub mod host;
pub mod tokio_process;

pub use cache_dir::{resolve_cache_root, ENV_CACHE_DIR};
pub use host::{OsEnvironment, OsFileSystem};
pub use tokio_process::{TokioProcess, TokioProcessSpawner};
