// Shared helpers for end-to-end tests

use penman_core::domain::InvocationRequest;
use penman_core::EngineConfig;
use penman_infra_system::{StdFileProbe, SubprocessRunner};
use std::sync::Arc;
use std::time::Duration;

/// Shell used to host test scripts
pub const SHELL: &str = "/bin/sh";

/// Runner with short grace/drain bounds so failure paths stay fast
pub fn test_runner() -> SubprocessRunner {
    let config = EngineConfig {
        termination_grace_ms: 300,
        drain_timeout_ms: 500,
        ..Default::default()
    };
    SubprocessRunner::from_config(&config, Arc::new(StdFileProbe))
}

/// `sh -c <script>` with a generous timeout
pub fn sh(script: &str) -> InvocationRequest {
    InvocationRequest::new(SHELL, ["-c", script]).with_timeout(Duration::from_secs(10))
}
