// Engine configuration
// Loaded by the composition root; core only defines shape and defaults

use crate::application::constants::{
    DEFAULT_EXTRA_PATH_DIRS, DEFAULT_INVOCATION_TIMEOUT, DEFAULT_SEARCH_ROOTS,
    OUTPUT_DRAIN_TIMEOUT, TERMINATION_GRACE_PERIOD,
};
use crate::error::{AppError, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings for the runner and the binary locator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-invocation deadline
    pub timeout_secs: u64,
    /// SIGTERM to SIGKILL escalation delay
    pub termination_grace_ms: u64,
    /// Post-exit pipe drain bound
    pub drain_timeout_ms: u64,
    /// Ordered binary search roots
    pub search_roots: Vec<PathBuf>,
    /// Appended to the child's PATH
    pub extra_path_dirs: Vec<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_INVOCATION_TIMEOUT.as_secs(),
            termination_grace_ms: TERMINATION_GRACE_PERIOD.as_millis() as u64,
            drain_timeout_ms: OUTPUT_DRAIN_TIMEOUT.as_millis() as u64,
            search_roots: DEFAULT_SEARCH_ROOTS.iter().map(PathBuf::from).collect(),
            extra_path_dirs: DEFAULT_EXTRA_PATH_DIRS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn termination_grace(&self) -> Duration {
        Duration::from_millis(self.termination_grace_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    /// Reject settings that would make every invocation fail
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(AppError::Config("timeout_secs must be > 0".to_string()));
        }
        if self.search_roots.is_empty() {
            return Err(AppError::Config(
                "search_roots must list at least one directory".to_string(),
            ));
        }
        Ok(())
    }
}
