// Port Layer - Interfaces for external dependencies

pub mod file_probe;
pub mod process_runner;

// Re-exports
pub use file_probe::FileProbe;
pub use process_runner::ProcessRunner;
