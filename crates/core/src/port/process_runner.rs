// Process Runner Port
// Abstraction over running one external binary to completion

use crate::domain::{InvocationRequest, Outcome};
use async_trait::async_trait;

/// Process runner trait
///
/// Implementations:
/// - SubprocessRunner: spawns an OS process (infra-system)
/// - MockProcessRunner: scripted outcomes for tests
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the request and classify what happened
    ///
    /// Always resolves exactly once. Failures come back as
    /// `Err(InvocationError)`, never as a panic or a hang past the timeout.
    async fn execute(&self, request: InvocationRequest) -> Outcome;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock runner returning a fixed outcome and recording every request
    pub struct MockProcessRunner {
        outcome: Outcome,
        requests: Arc<Mutex<Vec<InvocationRequest>>>,
    }

    impl MockProcessRunner {
        pub fn new(outcome: Outcome) -> Self {
            Self {
                outcome,
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success(output: impl Into<String>) -> Self {
            Self::new(Ok(output.into()))
        }

        pub fn requests(&self) -> Vec<InvocationRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockProcessRunner {
        async fn execute(&self, request: InvocationRequest) -> Outcome {
            self.requests.lock().unwrap().push(request);
            self.outcome.clone()
        }
    }
}
