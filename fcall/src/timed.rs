//! Single-shot execution with initial delay, deadline, and error suppression.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use fcall::{CallError, CallErrorKind, CallFn, TimedOptions, tcall};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let slow = CallFn::from_async(|_: ()| async {
//!     tokio::time::sleep(Duration::from_secs(5)).await;
//!     Ok::<_, CallError>(1_u32)
//! });
//!
//! let options = TimedOptions::default().with_timeout(Duration::from_millis(10));
//! let error = tcall(&slow, (), options).await.expect_err("deadline should expire");
//! assert_eq!(error.kind, CallErrorKind::Timeout);
//! # });
//! ```

use std::time::Duration;

use tokio::time::Instant;

use crate::{CallError, CallFn};

#[derive(Debug, Clone)]
pub struct TimedOptions<T> {
    pub initial_delay: Duration,
    pub timeout: Option<Duration>,
    /// Returned in place of a suppressed failure. `None` means no default
    /// was requested, so the failure is raised even when suppressing.
    pub default: Option<T>,
    pub suppress_errors: bool,
    pub context: Option<String>,
}

impl<T> Default for TimedOptions<T> {
    fn default() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            timeout: None,
            default: None,
            suppress_errors: false,
            context: None,
        }
    }
}

impl<T> TimedOptions<T> {
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_optional_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default(mut self, default: T) -> Self {
        self.default = Some(default);
        self
    }

    pub fn suppressing_errors(mut self) -> Self {
        self.suppress_errors = true;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

pub async fn tcall<A, T>(func: &CallFn<A, T>, args: A, options: TimedOptions<T>) -> Result<T, CallError>
where
    A: Send + 'static,
    T: Send + 'static,
{
    tcall_timed(func, args, options).await.map(|(value, _)| value)
}

/// Like [`tcall`], also returning how long the invocation itself took.
///
/// The initial delay is not part of the measured duration.
pub async fn tcall_timed<A, T>(
    func: &CallFn<A, T>,
    args: A,
    options: TimedOptions<T>,
) -> Result<(T, Duration), CallError>
where
    A: Send + 'static,
    T: Send + 'static,
{
    let TimedOptions {
        initial_delay,
        timeout,
        default,
        suppress_errors,
        context,
    } = options;

    if !initial_delay.is_zero() {
        tokio::time::sleep(initial_delay).await;
    }

    let started = Instant::now();
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, func.call(args)).await {
            Ok(result) => result,
            Err(_) => Err(CallError::timeout(format!(
                "timeout of {} ms exceeded",
                limit.as_millis()
            ))),
        },
        None => func.call(args).await,
    };
    let elapsed = started.elapsed();

    match outcome {
        Ok(value) => Ok((value, elapsed)),
        Err(error) => match default {
            Some(value) if suppress_errors => Ok((value, elapsed)),
            _ => Err(match context {
                Some(context) => error.with_context(context),
                None => error,
            }),
        },
    }
}
