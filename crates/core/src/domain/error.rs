// Invocation failure taxonomy

use std::path::PathBuf;
use thiserror::Error;

/// Why an invocation produced no usable output
///
/// Exactly one kind per invocation. None of them carry OS-internal state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("AI CLI binary not found at {}", .path.display())]
    BinaryNotFound { path: PathBuf },

    #[error("AI execution failed: {details}")]
    ExecutionFailed { details: String },

    #[error("The AI operation timed out")]
    TimedOut,

    #[error("The AI returned no output{}", details_suffix(.details))]
    EmptyOutput { details: String },
}

fn details_suffix(details: &str) -> String {
    if details.is_empty() {
        String::new()
    } else {
        format!("\nDetails: {details}")
    }
}

/// Fieldless discriminant of [`InvocationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    BinaryNotFound,
    ExecutionFailed,
    TimedOut,
    EmptyOutput,
}

impl InvocationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::BinaryNotFound { .. } => FailureKind::BinaryNotFound,
            Self::ExecutionFailed { .. } => FailureKind::ExecutionFailed,
            Self::TimedOut => FailureKind::TimedOut,
            Self::EmptyOutput { .. } => FailureKind::EmptyOutput,
        }
    }

    /// Filtered stderr (or exit description) attached to the failure, if any
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::ExecutionFailed { details } | Self::EmptyOutput { details } => Some(details),
            Self::BinaryNotFound { .. } | Self::TimedOut => None,
        }
    }

    /// What the user can do about it
    pub fn hint(&self) -> &'static str {
        match self {
            Self::BinaryNotFound { .. } => {
                "Install the CLI (e.g. via Homebrew) or add its directory to the search roots."
            }
            Self::TimedOut => "Try again, or raise the timeout for slower models.",
            Self::ExecutionFailed { .. } | Self::EmptyOutput { .. } => {
                "See the details above reported by the CLI."
            }
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BinaryNotFound => "binary-not-found",
            Self::ExecutionFailed => "execution-failed",
            Self::TimedOut => "timed-out",
            Self::EmptyOutput => "empty-output",
        };
        f.write_str(name)
    }
}
