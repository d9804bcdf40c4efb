// Penman Infrastructure - System Adapters
// Implements: ProcessRunner, FileProbe

pub mod deadline;
pub mod fs_probe;
pub mod subprocess_runner;

pub use deadline::{DeadlineTask, Termination, TerminationLatch};
pub use fs_probe::StdFileProbe;
pub use subprocess_runner::SubprocessRunner;
