// Artifact cache root resolution

use directories::ProjectDirs;
use fxdev_core::port::Environment;
use std::path::PathBuf;
use tracing::debug;

/// Overrides the artifact cache root (`<root>/fuchsia/tools/...`)
pub const ENV_CACHE_DIR: &str = "FXDEV_CACHE_DIR";

/// `FXDEV_CACHE_DIR` (tilde-expanded), else the platform cache directory
pub fn resolve_cache_root(env: &dyn Environment) -> Option<PathBuf> {
    if let Some(dir) = env.var(ENV_CACHE_DIR).filter(|v| !v.is_empty()) {
        let root = PathBuf::from(shellexpand::tilde(&dir).into_owned());
        debug!(cache_root = %root.display(), "Using artifact cache from {}", ENV_CACHE_DIR);
        return Some(root);
    }

    let root = ProjectDirs::from("dev", "fxdev", "fxdev").map(|dirs| dirs.cache_dir().to_path_buf());
    debug!(cache_root = ?root, "Using default artifact cache");
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxdev_core::port::environment::mocks::MapEnvironment;

    #[test]
    fn test_env_override() {
        let env = MapEnvironment::new().with_var(ENV_CACHE_DIR, "/var/cache/fx");
        assert_eq!(resolve_cache_root(&env), Some(PathBuf::from("/var/cache/fx")));
    }

    #[test]
    fn test_env_override_expands_tilde() {
        let env = MapEnvironment::new().with_var(ENV_CACHE_DIR, "~/fx-cache");
        let root = resolve_cache_root(&env).unwrap();
        assert!(root.ends_with("fx-cache"));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let env = MapEnvironment::new().with_var(ENV_CACHE_DIR, "");
        assert_ne!(resolve_cache_root(&env), Some(PathBuf::from("")));
    }
}
