// Batch dispatcher - fan one command template out across many hosts

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};
use tracing::warn;

use super::process::ProcessRunner;
use crate::command::template::{VariableSet, HOST_NAME};
use crate::command::tokenize::tokenize;
use crate::output::errors::DroverError;
use crate::output::listener::OutputListener;

/// Default per-host command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Outcome of one host's task. Exactly one terminal state per host.
#[derive(Debug)]
pub struct HostOutcome {
    pub host: String,
    pub result: Result<(), DroverError>,
}

impl HostOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregated result of a batch. Outcomes are in host order even though
/// tasks complete in any order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<HostOutcome>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(HostOutcome::is_success)
    }

    pub fn ok_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.ok_count()
    }

    /// All failure messages joined with `"; "`; empty means total success.
    pub fn error_summary(&self) -> String {
        let mut errors = String::new();
        self.append_errors(&mut errors);
        errors
    }

    /// Append failure messages to a caller-supplied accumulator.
    pub fn append_errors(&self, errors: &mut String) {
        for outcome in &self.outcomes {
            if let Err(e) = &outcome.result {
                if !errors.is_empty() {
                    errors.push_str("; ");
                }
                errors.push_str(&e.to_string());
            }
        }
    }
}

/// Fan-out executor: resolves the template per host, then runs one process
/// per host concurrently and collects every failure into one report.
pub struct BatchExecutor {
    listener: Arc<dyn OutputListener>,
    timeout: Duration,
    forks: Option<usize>,
}

impl BatchExecutor {
    pub fn new(listener: Arc<dyn OutputListener>) -> Self {
        BatchExecutor {
            listener,
            timeout: DEFAULT_TIMEOUT,
            forks: None,
        }
    }

    /// Set the per-host timeout, measured from batch submission.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bound the number of concurrently running hosts.
    /// `None` runs one worker per host.
    pub fn with_forks(mut self, forks: Option<usize>) -> Self {
        self.forks = forks;
        self
    }

    /// Execute the template on every host.
    ///
    /// Each host gets its own variable set (with [`HOST_NAME`] injected),
    /// its own argument vector, and its own task. The timeout applies per
    /// task; a timed-out task is abandoned and reported for that host while
    /// the rest of the batch keeps running. The batch never fails fast.
    pub async fn execute(
        &self,
        template: &str,
        hosts: &[String],
        base_vars: &VariableSet,
    ) -> BatchReport {
        if hosts.is_empty() {
            return BatchReport::default();
        }

        let deadline = Instant::now() + self.timeout;
        let workers = self.forks.unwrap_or(hosts.len()).max(1);
        let semaphore = Arc::new(Semaphore::new(workers));

        let tasks: Vec<_> = hosts
            .iter()
            .map(|host| {
                let host = host.clone();
                let args = tokenize(&base_vars.clone().with(HOST_NAME, host.clone()).resolve(template));
                let listener = Arc::clone(&self.listener);
                let timeout = self.timeout;
                let semaphore = Arc::clone(&semaphore);

                tokio::spawn(async move {
                    let _permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            return HostOutcome {
                                result: Err(DroverError::TaskAborted { host: host.clone() }),
                                host,
                            };
                        }
                    };

                    let runner = ProcessRunner::new(host.clone(), args);
                    let result = match timeout_at(deadline, runner.run(listener)).await {
                        Ok(Ok(0)) => Ok(()),
                        Ok(Ok(code)) => Err(DroverError::NonZeroExit {
                            host: host.clone(),
                            code,
                        }),
                        Ok(Err(e)) => Err(e),
                        Err(_) => {
                            // Abandoning the run future kills the child via
                            // kill-on-drop; the host is reported as timed out.
                            warn!("abandoning task for {} after {:?}", host, timeout);
                            Err(DroverError::Timeout {
                                host: host.clone(),
                                timeout,
                            })
                        }
                    };

                    HostOutcome { host, result }
                })
            })
            .collect();

        let joined = join_all(tasks).await;

        // Sequential join loop: the accumulator is only touched here, so no
        // lock is needed around it.
        let mut outcomes = Vec::with_capacity(hosts.len());
        for (host, task) in hosts.iter().zip(joined) {
            match task {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!("task for {} did not complete: {}", host, e);
                    outcomes.push(HostOutcome {
                        host: host.clone(),
                        result: Err(DroverError::TaskAborted { host: host.clone() }),
                    });
                }
            }
        }

        BatchReport { outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::template::HOST_USER_ID;
    use crate::output::listener::{CapturingListener, StreamKind};
    use std::time::Instant as StdInstant;

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(|h| h.to_string()).collect()
    }

    fn executor(capture: &Arc<CapturingListener>) -> BatchExecutor {
        let listener: Arc<dyn OutputListener> = capture.clone();
        BatchExecutor::new(listener)
    }

    #[tokio::test]
    async fn test_all_hosts_succeed() {
        let capture = Arc::new(CapturingListener::new());
        let report = executor(&capture)
            .execute(
                "sh -c \"echo ready on ${hostName}\"",
                &hosts(&["h1", "h2", "h3"]),
                &VariableSet::new(),
            )
            .await;

        assert!(report.is_success());
        assert_eq!(report.error_summary(), "");
        assert_eq!(report.ok_count(), 3);
        assert_eq!(
            capture.lines(StreamKind::Stdout, "h2"),
            vec!["ready on h2"]
        );
    }

    #[tokio::test]
    async fn test_partial_failure_names_only_failing_host() {
        let capture = Arc::new(CapturingListener::new());
        let report = executor(&capture)
            .execute(
                "sh -c \"case ${hostName} in h2) exit 2;; esac\"",
                &hosts(&["h1", "h2", "h3"]),
                &VariableSet::new(),
            )
            .await;

        let summary = report.error_summary();
        assert!(summary.contains("h2"));
        assert!(summary.contains('2'));
        assert!(!summary.contains("h1"));
        assert!(!summary.contains("h3"));
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_each_failing_host_contributes_one_fragment() {
        let capture = Arc::new(CapturingListener::new());
        let report = executor(&capture)
            .execute(
                "sh -c \"exit 7\"",
                &hosts(&["h1", "h2"]),
                &VariableSet::new(),
            )
            .await;

        let summary = report.error_summary();
        assert_eq!(summary.matches("; ").count(), 1);
        assert!(summary.contains("h1"));
        assert!(summary.contains("h2"));
    }

    #[tokio::test]
    async fn test_timeout_reported_per_host() {
        let capture = Arc::new(CapturingListener::new());
        let report = executor(&capture)
            .with_timeout(Duration::from_millis(400))
            .execute(
                "sh -c \"case ${hostName} in slow) sleep 5;; esac\"",
                &hosts(&["fast", "slow"]),
                &VariableSet::new(),
            )
            .await;

        let summary = report.error_summary();
        assert!(summary.contains("slow"));
        assert!(summary.contains("timed out"));
        assert!(!summary.contains("fast"));

        let fast = &report.outcomes[0];
        assert_eq!(fast.host, "fast");
        assert!(fast.is_success());
    }

    #[tokio::test]
    async fn test_launch_error_is_aggregated_not_propagated() {
        let capture = Arc::new(CapturingListener::new());
        let report = executor(&capture)
            .execute(
                "/no/such/executable ${hostName}",
                &hosts(&["h1"]),
                &VariableSet::new(),
            )
            .await;

        assert!(matches!(
            report.outcomes[0].result,
            Err(DroverError::Launch { .. })
        ));
        assert!(report.error_summary().contains("h1"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_hosts_run_concurrently() {
        let capture = Arc::new(CapturingListener::new());
        let started = StdInstant::now();

        let report = executor(&capture)
            .execute(
                "sh -c \"sleep 0.4\"",
                &hosts(&["h1", "h2", "h3"]),
                &VariableSet::new(),
            )
            .await;

        let elapsed = started.elapsed();
        assert!(report.is_success());
        // Three 0.4s sleeps in parallel should take far less than 1.2s even
        // with process-spawn overhead.
        assert!(elapsed < Duration::from_millis(1100), "batch took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_bounded_forks_still_completes_every_host() {
        let capture = Arc::new(CapturingListener::new());
        let report = executor(&capture)
            .with_forks(Some(1))
            .execute(
                "sh -c \"echo ${hostName}\"",
                &hosts(&["h1", "h2", "h3"]),
                &VariableSet::new(),
            )
            .await;

        assert!(report.is_success());
        assert_eq!(report.outcomes.len(), 3);
    }

    #[tokio::test]
    async fn test_base_variables_reach_every_host() {
        let capture = Arc::new(CapturingListener::new());
        let vars = VariableSet::new().with(HOST_USER_ID, "deploy");

        let report = executor(&capture)
            .execute(
                "sh -c \"echo ${hostUserId}@${hostName}\"",
                &hosts(&["h1", "h2"]),
                &vars,
            )
            .await;

        assert!(report.is_success());
        assert_eq!(
            capture.lines(StreamKind::Stdout, "h1"),
            vec!["deploy@h1"]
        );
        assert_eq!(
            capture.lines(StreamKind::Stdout, "h2"),
            vec!["deploy@h2"]
        );
    }

    #[tokio::test]
    async fn test_empty_host_set_is_a_successful_noop() {
        let capture = Arc::new(CapturingListener::new());
        let report = executor(&capture)
            .execute("sh -c \"exit 1\"", &[], &VariableSet::new())
            .await;

        assert!(report.is_success());
        assert!(report.outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_append_errors_extends_existing_accumulator() {
        let capture = Arc::new(CapturingListener::new());
        let report = executor(&capture)
            .execute("sh -c \"exit 1\"", &hosts(&["h1"]), &VariableSet::new())
            .await;

        let mut errors = String::from("earlier failure");
        report.append_errors(&mut errors);

        assert!(errors.starts_with("earlier failure; "));
        assert!(errors.contains("h1"));
    }
}
