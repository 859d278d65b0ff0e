// Output module - errors, listeners, and batch reporting

pub mod errors;
pub mod json_output;
pub mod listener;
pub mod terminal;

pub use errors::DroverError;
pub use listener::{
    CapturingListener, ListenerChain, LoggingListener, OutputEvent, OutputListener,
    PrintingListener, StreamKind,
};
pub use terminal::TerminalReport;
