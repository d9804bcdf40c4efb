// Engine constants (No magic values)
use std::time::Duration;

/// Default wall-clock budget for one invocation (120s)
/// Model CLIs routinely take over a minute for a full letter
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Time between SIGTERM and SIGKILL once the deadline has fired (5s)
pub const TERMINATION_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// How long to keep reading stdout/stderr after the process is gone (2s)
/// Bounds the wait when a detached grandchild still holds the pipes
pub const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Directories searched for provider binaries, in order
pub const DEFAULT_SEARCH_ROOTS: &[&str] = &["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"];

/// Directories appended to the child's PATH
pub const DEFAULT_EXTRA_PATH_DIRS: &[&str] = &["/opt/homebrew/bin", "/usr/local/bin"];
