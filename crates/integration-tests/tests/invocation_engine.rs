//! Invocation engine end-to-end tests
//!
//! Real child processes, one behaviour per test.
#![cfg(unix)]

use penman_core::domain::{FailureKind, InvocationError, InvocationRequest};
use penman_core::port::ProcessRunner;
use penman_core::EngineConfig;
use penman_infra_system::{StdFileProbe, SubprocessRunner};
use penman_integration_tests::{sh, test_runner};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_missing_binary_is_reported_without_spawning() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gemini");

    let outcome = test_runner()
        .execute(InvocationRequest::new(&missing, ["-m", "gemini-3-pro"]))
        .await;

    assert_eq!(outcome, Err(InvocationError::BinaryNotFound { path: missing }));
}

#[tokio::test]
async fn test_directory_is_not_a_binary() {
    let dir = tempfile::tempdir().unwrap();

    let outcome = test_runner()
        .execute(InvocationRequest::new(dir.path(), Vec::<String>::new()))
        .await;

    assert_eq!(outcome.unwrap_err().kind(), FailureKind::BinaryNotFound);
}

#[tokio::test]
async fn test_non_executable_file_fails_to_spawn() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("opencode");
    std::fs::write(&path, "#!/bin/sh\necho never\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let outcome = test_runner()
        .execute(InvocationRequest::new(&path, ["run"]))
        .await;

    match outcome {
        Err(InvocationError::ExecutionFailed { details }) => {
            assert!(details.to_lowercase().contains("permission"), "{details}")
        }
        other => panic!("expected execution failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_success_ignores_stderr_chatter() {
    let script = "echo 'Loaded cached credentials' >&2; echo 'real warning' >&2; printf '  Dear hiring manager,\\n\\n'";

    let outcome = test_runner().execute(sh(script)).await;

    assert_eq!(outcome, Ok("Dear hiring manager,".to_string()));
}

#[tokio::test]
async fn test_empty_stdout_with_zero_exit() {
    let script = "echo '[WARN] cache miss' >&2; echo 'Loaded cached credentials' >&2; echo 'real error: disk full' >&2";

    let outcome = test_runner().execute(sh(script)).await;

    assert_eq!(
        outcome,
        Err(InvocationError::EmptyOutput {
            details: "real error: disk full".to_string()
        })
    );
}

#[tokio::test]
async fn test_empty_stdout_without_stderr() {
    let outcome = test_runner().execute(sh("printf '   \\n'")).await;

    assert_eq!(
        outcome,
        Err(InvocationError::EmptyOutput {
            details: String::new()
        })
    );
}

#[tokio::test]
async fn test_nonzero_exit_details_fall_back_to_code() {
    let outcome = test_runner()
        .execute(sh("echo 'Loading extension: x' >&2; echo partial; exit 7"))
        .await;

    assert_eq!(
        outcome,
        Err(InvocationError::ExecutionFailed {
            details: "Exit code 7".to_string()
        })
    );
}

#[tokio::test]
async fn test_nonzero_exit_with_stderr_details() {
    let outcome = test_runner()
        .execute(sh("echo 'model not found' >&2; exit 1"))
        .await;

    assert_eq!(
        outcome,
        Err(InvocationError::ExecutionFailed {
            details: "model not found".to_string()
        })
    );
}

#[tokio::test]
async fn test_foreign_sigterm_is_execution_failure() {
    // The process is killed by SIGTERM, but not by us
    let outcome = test_runner().execute(sh("echo almost; kill -TERM $$; sleep 5")).await;

    assert_eq!(
        outcome,
        Err(InvocationError::ExecutionFailed {
            details: "Terminated by signal 15".to_string()
        })
    );
}

#[tokio::test]
async fn test_timeout_with_complete_output_is_still_timeout() {
    let request = sh("echo 'Full letter text'; sleep 30").with_timeout(Duration::from_millis(200));
    let started = Instant::now();

    let outcome = test_runner().execute(request).await;

    assert_eq!(outcome, Err(InvocationError::TimedOut));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_sigterm_ignoring_process_is_killed_after_grace() {
    // trap is inherited by sleep, so only SIGKILL ends the group
    let request = sh("trap '' TERM; echo 'Full letter text'; sleep 30; echo late")
        .with_timeout(Duration::from_millis(200));
    let started = Instant::now();

    let outcome = test_runner().execute(request).await;

    assert_eq!(outcome, Err(InvocationError::TimedOut));
    // timeout + grace (300ms) + drain, with slack
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_large_input_does_not_deadlock() {
    // cat echoes while still reading, overflowing both pipe buffers
    let input = "line of prompt text\n".repeat(50_000);
    let request = sh("cat").with_input(input.clone());

    let outcome = test_runner().execute(request).await;

    assert_eq!(outcome, Ok(input.trim().to_string()));
}

#[tokio::test]
async fn test_child_that_ignores_input_still_completes() {
    let request = sh("echo ignored input").with_input("x".repeat(1_000_000));

    let outcome = test_runner().execute(request).await;

    assert_eq!(outcome, Ok("ignored input".to_string()));
}

#[tokio::test]
async fn test_nul_bytes_are_stripped() {
    let request = InvocationRequest::new("/bin/\0sh", ["-c", "printf '%s' \"$1\"", "sh", "a\0b"])
        .with_input("unused\0");

    let outcome = test_runner().execute(request).await;

    assert_eq!(outcome, Ok("ab".to_string()));
}

#[tokio::test]
async fn test_detached_grandchild_does_not_hang_the_call() {
    // The background sleep inherits stdout and outlives the shell
    let request = sh("sleep 3 & echo done");
    let started = Instant::now();

    let outcome = test_runner().execute(request).await;

    assert_eq!(outcome, Ok("done".to_string()));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_group_members_holding_pipes_are_killed() {
    // The subshell keeps stdout open, then would leave a marker behind
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("survived");
    let script = format!("(sleep 1; touch '{}') & echo done", marker.display());

    let outcome = test_runner().execute(sh(&script)).await;
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(outcome, Ok("done".to_string()));
    assert!(!marker.exists(), "background member outlived the call");
}

#[tokio::test]
async fn test_child_environment_is_augmented() {
    let extra = PathBuf::from("/penman/extra/bin");
    let config = EngineConfig {
        extra_path_dirs: vec![extra.clone()],
        ..Default::default()
    };
    let runner = SubprocessRunner::from_config(&config, Arc::new(StdFileProbe));

    let outcome = runner.execute(sh("echo \"$PATH\"; test -n \"$HOME\" && echo home-set")).await;

    let output = outcome.unwrap();
    let mut lines = output.lines();
    let path = lines.next().unwrap();
    assert!(path.split(':').any(|dir| dir == "/penman/extra/bin"), "{path}");
    assert_eq!(lines.next(), Some("home-set"));
}
