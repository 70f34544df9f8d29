//! Timed, retrying execution of engine calls
//!
//! Every engine call goes through [`QueryExecutor::execute`]: each attempt
//! is timed, a successful attempt logs its duration and publishes a query
//! event, and failures are retried immediately up to the policy budget
//! with no backoff and no eligibility filtering. The final failure
//! surfaces unchanged.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use change_notifier::{ChangeEvent, ChangeNotifier};

use crate::errors::EngineError;

/// Retry budget for engine calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

impl From<&config::RetryConfig> for RetryPolicy {
    fn from(config: &config::RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
        }
    }
}

/// Executes engine calls with timing instrumentation and bounded retry
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    policy: RetryPolicy,
    notifier: Option<Arc<ChangeNotifier>>,
}

impl QueryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            notifier: None,
        }
    }

    /// Attach a notifier; successful attempts publish a query event
    pub fn with_notifier(mut self, notifier: Arc<ChangeNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `operation` until it succeeds or the retry budget is spent.
    ///
    /// `operation` is a factory: each attempt invokes it for a fresh
    /// future, so a retry re-issues the underlying request instead of
    /// re-polling a settled result.
    pub async fn execute<T, F, Fut>(&self, model: &str, mut operation: F) -> Result<T, EngineError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let mut retry_count = 0;
        loop {
            let start = Instant::now();
            match operation().await {
                Ok(result) => {
                    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
                    tracing::info!(model = %model, duration_ms, "query completed");
                    if let Some(notifier) = &self.notifier {
                        notifier.emit(ChangeEvent::query_measured(model, duration_ms));
                    }
                    return Ok(result);
                }
                Err(error) if retry_count < self.policy.max_retries => {
                    retry_count += 1;
                    tracing::warn!(
                        model = %model,
                        retry_count,
                        error = %error,
                        "query failed, retrying"
                    );
                }
                Err(error) => return Err(error),
            }
        }
    }
}
