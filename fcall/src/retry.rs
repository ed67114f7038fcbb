//! Retry policy with exponential backoff and the executors built on it.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use fcall::RetryPolicy;
//!
//! let policy = RetryPolicy::new(3)
//!     .with_delay(Duration::from_millis(100))
//!     .with_backoff_factor(2.0);
//!
//! assert_eq!(policy.max_attempts(), 4);
//! assert_eq!(policy.delay_after_attempt(1), Duration::from_millis(100));
//! assert_eq!(policy.delay_after_attempt(3), Duration::from_millis(400));
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::{CallError, CallFn, CallHooks, NoopCallHooks, TimedOptions, tcall};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub retries: u32,
    pub initial_delay: Duration,
    pub delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Option<Duration>,
    /// Deadline for each individual attempt.
    pub timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            initial_delay: Duration::ZERO,
            delay: Duration::ZERO,
            backoff_factor: 1.0,
            max_delay: None,
            timeout: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32) -> Self {
        Self {
            retries,
            ..Self::default()
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor.max(0.0);
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    pub fn should_retry(&self, attempt: u32, error: &CallError) -> bool {
        error.is_retryable() && attempt <= self.retries
    }

    /// Sleep scheduled after failed attempt `attempt` (1-based).
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let nanos = (self.delay.as_nanos() as f64 * self.backoff_factor.powi(exponent)).round();
        let delay = if nanos >= u64::MAX as f64 {
            Duration::MAX
        } else {
            Duration::from_nanos(nanos as u64)
        };

        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}

/// Drives `execute` under `policy`, sleeping through `sleep` between attempts.
///
/// Retryable failures that outlast the policy end in
/// [`CallErrorKind::RetriesExhausted`](crate::CallErrorKind::RetriesExhausted);
/// anything else is returned as produced.
pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    operation: &str,
    policy: &RetryPolicy,
    hooks: &dyn CallHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, CallError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, CallError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    if !policy.initial_delay.is_zero() {
        sleep(policy.initial_delay).await;
    }

    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(operation, attempt);

        match execute(attempt).await {
            Ok(value) => {
                hooks.on_success(operation, attempt);
                return Ok(value);
            }
            Err(error) => {
                if policy.should_retry(attempt, &error) {
                    let delay = policy.delay_after_attempt(attempt);
                    hooks.on_retry_scheduled(operation, attempt, delay, &error);
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                let error = if error.is_retryable() {
                    CallError::exhausted(attempt, error)
                } else {
                    error
                };
                hooks.on_failure(operation, attempt, &error);
                return Err(error);
            }
        }
    }
}

pub async fn rcall<A, T>(
    func: &CallFn<A, T>,
    args: A,
    policy: &RetryPolicy,
    default: Option<T>,
) -> Result<T, CallError>
where
    A: Clone + Send + 'static,
    T: Send + 'static,
{
    rcall_observed("rcall", func, args, policy, default, &NoopCallHooks).await
}

/// [`rcall`] reporting its lifecycle to `hooks` under `operation`.
pub async fn rcall_observed<A, T>(
    operation: &str,
    func: &CallFn<A, T>,
    args: A,
    policy: &RetryPolicy,
    default: Option<T>,
    hooks: &dyn CallHooks,
) -> Result<T, CallError>
where
    A: Clone + Send + 'static,
    T: Send + 'static,
{
    let max_attempts = policy.max_attempts();
    let result = execute_with_retry(
        operation,
        policy,
        hooks,
        move |attempt| {
            let options = TimedOptions::default()
                .with_optional_timeout(policy.timeout)
                .with_context(format!("attempt {attempt}/{max_attempts}"));
            tcall(func, args.clone(), options)
        },
        tokio::time::sleep,
    )
    .await;

    match (result, default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default),
        (Err(error), None) => Err(error),
    }
}

/// Like [`rcall`], also returning the time spent since entry, delays included.
pub async fn rcall_timed<A, T>(
    func: &CallFn<A, T>,
    args: A,
    policy: &RetryPolicy,
    default: Option<T>,
) -> Result<(T, Duration), CallError>
where
    A: Clone + Send + 'static,
    T: Send + 'static,
{
    let started = Instant::now();
    let value = rcall(func, args, policy, default).await?;
    Ok((value, started.elapsed()))
}
