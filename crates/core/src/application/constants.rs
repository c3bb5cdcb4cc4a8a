// Tool names, flags and paths (no magic values in services)

/// Build output directory; ssh config lives at `<dir>/ssh-keys/ssh_config`
pub const ENV_BUILD_DIR: &str = "FUCHSIA_BUILD_DIR";

/// Direct ssh config path, consulted only when `FUCHSIA_BUILD_DIR` is unset
pub const ENV_SSH_CONFIG: &str = "FUCHSIA_SSH_CONFIG";

/// Path components under the build directory
pub const BUILD_DIR_SSH_CONFIG: [&str; 2] = ["ssh-keys", "ssh_config"];

/// Tool directory under the artifact cache root
pub const CACHE_TOOLS_DIR: [&str; 2] = ["fuchsia", "tools"];

pub const DEV_FINDER_TOOL: &str = "dev_finder";
pub const PM_TOOL: &str = "pm";
pub const KERNEL_COMPILER_TOOL: &str = "kernel_compiler";

pub const SSH_PROGRAM: &str = "ssh";

/// Remote command run on the device; sent as a single ssh argument
pub const LOG_LISTENER_COMMAND: &str = "log_listener --clock Local";

pub const DEV_FINDER_LIST_ARGS: [&str; 2] = ["list", "-full"];
pub const DEV_FINDER_RESOLVE_ARGS: [&str; 4] = ["resolve", "-local", "-device-limit", "1"];

/// Lines buffered between the ssh reader task and the consumer
pub const LOG_CHANNEL_CAPACITY: usize = 256;

/// Longest line kept in memory before it is emitted as-is
pub const MAX_LOG_LINE_BYTES: usize = 64 * 1024;

/// Default kernel compiler target
pub const DEFAULT_KERNEL_TARGET: &str = "flutter_runner";
