// Application Layer - Use Cases

pub mod binary_locator;
pub mod constants;
pub mod draft;

// Re-exports
pub use binary_locator::BinaryLocator;
pub use draft::{DraftRequest, DraftService};
