// Executor module - process launch and batch fan-out

pub mod batch;
pub mod process;

pub use batch::{BatchExecutor, BatchReport, HostOutcome, DEFAULT_TIMEOUT};
pub use process::ProcessRunner;
