// Output listeners for streamed process output

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

/// Which process stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// A single line of process output, tagged with its stream and host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub kind: StreamKind,
    pub host: String,
    pub line: String,
}

/// Receives streamed output lines from running processes.
///
/// A listener is invoked concurrently from up to two reader contexts per
/// process, and from as many processes as there are hosts in a batch, so
/// implementations must serialize their own state.
pub trait OutputListener: Send + Sync {
    fn on_output(&self, kind: StreamKind, host: &str, line: &str);
}

/// Dispatch one event, isolating listener panics from the reader.
/// A misbehaving listener loses this line but never the rest of the stream.
pub(crate) fn dispatch(listener: &dyn OutputListener, kind: StreamKind, host: &str, line: &str) {
    if catch_unwind(AssertUnwindSafe(|| listener.on_output(kind, host, line))).is_err() {
        warn!("output listener panicked on {} line from {}", kind, host);
    }
}

/// Logs stderr lines at warn level and stdout lines at info level,
/// prefixed with the originating host.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl OutputListener for LoggingListener {
    fn on_output(&self, kind: StreamKind, host: &str, line: &str) {
        match kind {
            StreamKind::Stderr => warn!("error from {}: {}", host, line),
            StreamKind::Stdout => info!("from {}: {}", host, line),
        }
    }
}

/// Writes host-prefixed lines straight to the terminal, stdout lines to
/// stdout and stderr lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintingListener;

impl OutputListener for PrintingListener {
    fn on_output(&self, kind: StreamKind, host: &str, line: &str) {
        match kind {
            StreamKind::Stdout => println!("{host}: {line}"),
            StreamKind::Stderr => eprintln!("{host}: {line}"),
        }
    }
}

/// Dispatches every event to an ordered sequence of listeners.
#[derive(Default)]
pub struct ListenerChain {
    listeners: Vec<Arc<dyn OutputListener>>,
}

impl ListenerChain {
    pub fn new() -> Self {
        ListenerChain::default()
    }

    pub fn push(mut self, listener: Arc<dyn OutputListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl OutputListener for ListenerChain {
    fn on_output(&self, kind: StreamKind, host: &str, line: &str) {
        for listener in &self.listeners {
            listener.on_output(kind, host, line);
        }
    }
}

/// Records every event it receives. Safe to share across reader tasks.
#[derive(Default)]
pub struct CapturingListener {
    events: Mutex<Vec<OutputEvent>>,
}

impl CapturingListener {
    pub fn new() -> Self {
        CapturingListener::default()
    }

    /// Snapshot of all events received so far.
    pub fn events(&self) -> Vec<OutputEvent> {
        self.events.lock().clone()
    }

    /// Lines received from one host on one stream, in arrival order.
    pub fn lines(&self, kind: StreamKind, host: &str) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind == kind && e.host == host)
            .map(|e| e.line.clone())
            .collect()
    }
}

impl OutputListener for CapturingListener {
    fn on_output(&self, kind: StreamKind, host: &str, line: &str) {
        self.events.lock().push(OutputEvent {
            kind,
            host: host.to_string(),
            line: line.to_string(),
        });
    }
}
