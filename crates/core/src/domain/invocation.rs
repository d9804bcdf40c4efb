// Invocation request and outcome

use super::error::InvocationError;
use crate::application::constants::DEFAULT_INVOCATION_TIMEOUT;
use std::path::PathBuf;
use std::time::Duration;

/// Result of one invocation: trimmed, non-empty stdout or a classified failure
pub type Outcome = std::result::Result<String, InvocationError>;

/// Immutable description of one execution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub executable_path: PathBuf,
    pub arguments: Vec<String>,
    /// Text written to stdin and then closed. `None` connects stdin to an empty source.
    pub input: Option<String>,
    pub timeout: Duration,
}

impl InvocationRequest {
    /// Create a request with no input and the default timeout
    ///
    /// # Example
    /// ```text
    /// let request = InvocationRequest::new("/usr/local/bin/opencode", ["run", "--model", "opencode/big-pickle"])
    ///     .with_input(prompt)
    ///     .with_timeout(Duration::from_secs(120));
    /// ```
    pub fn new<P, I, S>(executable_path: P, arguments: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            executable_path: executable_path.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
            input: None,
            timeout: DEFAULT_INVOCATION_TIMEOUT,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
