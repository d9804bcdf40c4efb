// Domain Layer - Pure invocation model and policies

pub mod error;
pub mod invocation;
pub mod noise;
pub mod provider;
pub mod sanitize;

// Re-exports
pub use error::{FailureKind, InvocationError};
pub use invocation::{InvocationRequest, Outcome};
pub use noise::filter_stderr;
pub use provider::{Model, ProviderSpec, ProviderTag};
