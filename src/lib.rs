// Drover - fan-out remote command execution
//
// Resolves a per-host command template, tokenizes it into an argument
// vector, runs one external process per host concurrently, streams output
// line-by-line to listeners, and aggregates every failure into one report.

pub mod command;
pub mod executor;
pub mod inventory;
pub mod output;

pub use command::{tokenize, CommandCatalog, VariableSet};
pub use executor::{BatchExecutor, BatchReport, HostOutcome, ProcessRunner};
pub use output::{
    CapturingListener, DroverError, ListenerChain, LoggingListener, OutputEvent, OutputListener,
    PrintingListener, StreamKind,
};

/// Version of the drover tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::command::{tokenize, CommandCatalog, VariableSet};
    pub use crate::executor::{BatchExecutor, BatchReport, HostOutcome, ProcessRunner};
    pub use crate::output::{
        DroverError, ListenerChain, LoggingListener, OutputListener, StreamKind,
    };
}
