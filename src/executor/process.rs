// Single external process execution with streamed output

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::output::errors::DroverError;
use crate::output::listener::{dispatch, OutputListener, StreamKind};

/// Runs one external process for one host.
///
/// The argument vector is the full invocation: `args[0]` is the executable,
/// with no shell interpretation on top. Output is forwarded line-by-line to
/// the listener while the process runs.
#[derive(Debug)]
pub struct ProcessRunner {
    host: String,
    args: Vec<String>,
}

impl ProcessRunner {
    pub fn new(host: impl Into<String>, args: Vec<String>) -> Self {
        ProcessRunner {
            host: host.into(),
            args,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Launch the process and wait for it to exit, streaming stdout and
    /// stderr to the listener as lines arrive. Returns the exit code; an
    /// exit without a code (killed by signal) maps to -1.
    ///
    /// The child is spawned with kill-on-drop, so a caller that abandons
    /// this future (e.g. on timeout) also terminates the process.
    pub async fn run(&self, listener: Arc<dyn OutputListener>) -> Result<i32, DroverError> {
        let (program, rest) = self
            .args
            .split_first()
            .ok_or_else(|| DroverError::EmptyCommand {
                host: self.host.clone(),
            })?;

        debug!("launching on {}: {:?}", self.host, self.args);

        let mut child = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DroverError::Launch {
                host: self.host.clone(),
                source: e,
            })?;

        let stdout_reader = spawn_reader(
            child.stdout.take(),
            StreamKind::Stdout,
            self.host.clone(),
            Arc::clone(&listener),
        );
        let stderr_reader = spawn_reader(
            child.stderr.take(),
            StreamKind::Stderr,
            self.host.clone(),
            listener,
        );

        let status = child.wait().await?;

        // Drain both readers so every line reaches the listener before the
        // exit code is reported.
        let _ = stdout_reader.await;
        let _ = stderr_reader.await;

        Ok(status.code().unwrap_or(-1))
    }
}

/// Forward one stream to the listener, line by line. A read error ends this
/// reader only; the process and its sibling reader are unaffected.
fn spawn_reader<R>(
    stream: Option<R>,
    kind: StreamKind,
    host: String,
    listener: Arc<dyn OutputListener>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(stream) = stream else {
            return;
        };

        let mut reader = BufReader::new(stream);
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = line.trim_end_matches(['\r', '\n']);
                    dispatch(listener.as_ref(), kind, &host, line);
                }
                Err(e) => {
                    warn!("failed to read {} from {}: {}", kind, host, e);
                    break;
                }
            }
        }
    })
}
