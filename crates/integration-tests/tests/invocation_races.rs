//! Concurrency and Race Condition Tests
//!
//! Deadline vs. completion, and independent concurrent invocations.
#![cfg(unix)]

use penman_core::domain::{InvocationError, Outcome};
use penman_core::port::ProcessRunner;
use penman_integration_tests::{sh, test_runner};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_invocations_do_not_cross_talk() {
    let runner = Arc::new(test_runner());

    let mut tasks = JoinSet::new();
    for i in 0..10 {
        let runner = runner.clone();
        tasks.spawn(async move {
            // Stagger exits so completions interleave
            let script = format!(
                "sleep 0.0{}; echo out-{i}; echo err-{i} >&2; cat",
                9 - i
            );
            let request = sh(&script).with_input(format!("in-{i}"));
            (i, runner.execute(request).await)
        });
    }

    let mut seen = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (i, outcome) = joined.unwrap();
        assert_eq!(outcome, Ok(format!("out-{i}\nin-{i}")));
        seen.push(i);
    }

    seen.sort();
    assert_eq!(seen, (0..10).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_outcomes() {
    let runner = Arc::new(test_runner());

    let mut tasks = JoinSet::new();
    for i in 0..10 {
        let runner = runner.clone();
        tasks.spawn(async move {
            let request = match i % 3 {
                0 => sh(&format!("echo ok-{i}")),
                1 => sh(&format!("echo fail-{i} >&2; exit 3")),
                _ => sh("sleep 30").with_timeout(Duration::from_millis(100)),
            };
            (i, runner.execute(request).await)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (i, outcome) = joined.unwrap();
        let expected: Outcome = match i % 3 {
            0 => Ok(format!("ok-{i}")),
            1 => Err(InvocationError::ExecutionFailed {
                details: format!("fail-{i}"),
            }),
            _ => Err(InvocationError::TimedOut),
        };
        assert_eq!(outcome, expected, "invocation {i}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_deadline_and_exit_in_close_succession() {
    // Timeout equals the process runtime, so either event may win. Each call
    // must resolve once, promptly, and only as one of the two outcomes.
    let runner = test_runner();

    for _ in 0..25 {
        let request = sh("sleep 0.05; echo finished").with_timeout(Duration::from_millis(50));
        let started = Instant::now();

        let outcome = tokio::time::timeout(Duration::from_secs(5), runner.execute(request))
            .await
            .expect("invocation must not hang");

        assert!(
            outcome == Ok("finished".to_string()) || outcome == Err(InvocationError::TimedOut),
            "unexpected outcome {outcome:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}

#[tokio::test]
async fn test_fast_exit_never_sees_a_late_deadline() {
    // Deadline is cancelled on completion; waiting past it changes nothing
    let runner = test_runner();
    let request = sh("echo quick").with_timeout(Duration::from_millis(100));

    let outcome = runner.execute(request).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(outcome, Ok("quick".to_string()));
}
