//! Token-bucket rate limiter with periodic full replenishment.
//!
//! Each limiter owns a request budget and a token budget. A background task
//! resets both to their maxima once per interval; unused quota never carries
//! over. Permission checks never block on quota.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use fservice::{RateLimitConfig, RateLimiter};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let limiter = RateLimiter::create(RateLimitConfig::new(2, 100, Duration::from_secs(1)))
//!     .expect("runtime is available");
//!
//! assert!(limiter.request_permission(10).await);
//! assert!(limiter.request_permission(10).await);
//! assert!(!limiter.request_permission(10).await);
//!
//! limiter.stop().await;
//! assert!(!limiter.is_running());
//! # });
//! ```

use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u64,
    pub max_tokens: u64,
    pub interval: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: u64, max_tokens: u64, interval: Duration) -> Self {
        Self {
            max_requests,
            max_tokens,
            interval,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterSnapshot {
    pub available_requests: u64,
    pub available_tokens: u64,
    pub max_requests: u64,
    pub max_tokens: u64,
    pub interval: Duration,
}

#[derive(Debug)]
struct Quota {
    available_requests: u64,
    available_tokens: u64,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    quota: Mutex<Quota>,
    replenisher: Mutex<Option<JoinHandle<()>>>,
    running: AtomicBool,
}

impl RateLimiter {
    /// Builds a limiter with full quota and starts its replenishment task.
    ///
    /// The first reset happens one interval after creation. Must be called
    /// from within a tokio runtime.
    pub fn create(config: RateLimitConfig) -> Result<Arc<Self>, ServiceError> {
        if config.interval.is_zero() {
            return Err(ServiceError::configuration(
                "rate limiter interval must be greater than zero",
            ));
        }

        let runtime = Handle::try_current().map_err(|_| {
            ServiceError::configuration("rate limiter must be created inside a tokio runtime")
        })?;

        let limiter = Arc::new_cyclic(|weak: &Weak<Self>| {
            let replenisher = runtime.spawn(replenish_loop(weak.clone(), config.interval));
            Self {
                config,
                quota: Mutex::new(Quota {
                    available_requests: config.max_requests,
                    available_tokens: config.max_tokens,
                }),
                replenisher: Mutex::new(Some(replenisher)),
                running: AtomicBool::new(true),
            }
        });

        debug!(
            max_requests = config.max_requests,
            max_tokens = config.max_tokens,
            interval_ms = config.interval.as_millis() as u64,
            "rate limiter started"
        );
        Ok(limiter)
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Consumes one request and `cost` tokens when both budgets are non-empty.
    ///
    /// The token budget saturates at zero, so a single expensive request may
    /// drain it entirely.
    pub async fn request_permission(&self, cost: u64) -> bool {
        let mut quota = self.quota.lock().await;
        if quota.available_requests > 0 && quota.available_tokens > 0 {
            quota.available_requests -= 1;
            quota.available_tokens = quota.available_tokens.saturating_sub(cost);
            trace!(
                cost,
                available_requests = quota.available_requests,
                available_tokens = quota.available_tokens,
                "rate limiter permission granted"
            );
            return true;
        }

        trace!(
            cost,
            available_requests = quota.available_requests,
            available_tokens = quota.available_tokens,
            "rate limiter permission denied"
        );
        false
    }

    /// Resets both budgets to their maxima.
    pub async fn replenish(&self) {
        let mut quota = self.quota.lock().await;
        quota.available_requests = self.config.max_requests;
        quota.available_tokens = self.config.max_tokens;
        trace!("rate limiter replenished");
    }

    pub async fn snapshot(&self) -> LimiterSnapshot {
        let quota = self.quota.lock().await;
        LimiterSnapshot {
            available_requests: quota.available_requests,
            available_tokens: quota.available_tokens,
            max_requests: self.config.max_requests,
            max_tokens: self.config.max_tokens,
            interval: self.config.interval,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Cancels the replenishment task and waits for it to finish.
    pub async fn stop(&self) {
        let handle = self.replenisher.lock().await.take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
            debug!("rate limiter stopped");
        }
        self.running.store(false, Ordering::Release);
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        if let Some(handle) = self.replenisher.get_mut().take() {
            handle.abort();
        }
    }
}

async fn replenish_loop(limiter: Weak<RateLimiter>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(limiter) = limiter.upgrade() else {
            break;
        };
        limiter.replenish().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn budgets_never_increase_between_replenishments() {
        let limiter = RateLimiter::create(RateLimitConfig::new(5, 30, Duration::from_secs(60)))
            .expect("limiter");

        let mut previous = limiter.snapshot().await;
        for _ in 0..8 {
            limiter.request_permission(7).await;
            let current = limiter.snapshot().await;
            assert!(current.available_requests <= previous.available_requests);
            assert!(current.available_tokens <= previous.available_tokens);
            previous = current;
        }

        assert_eq!(previous.available_tokens, 0);
        assert_eq!(previous.available_requests, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn replenishment_restores_full_quota() {
        let limiter = RateLimiter::create(RateLimitConfig::new(3, 50, Duration::from_secs(1)))
            .expect("limiter");
        for _ in 0..3 {
            assert!(limiter.request_permission(20).await);
        }

        tokio::time::sleep(Duration::from_millis(1_050)).await;

        let snapshot = limiter.snapshot().await;
        assert_eq!(snapshot.available_requests, 3);
        assert_eq!(snapshot.available_tokens, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_halts_replenishment() {
        let limiter = RateLimiter::create(RateLimitConfig::new(1, 10, Duration::from_secs(1)))
            .expect("limiter");
        assert!(limiter.request_permission(1).await);

        limiter.stop().await;
        limiter.stop().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(!limiter.is_running());
        assert!(!limiter.request_permission(1).await);
    }

    #[test]
    fn creation_outside_runtime_is_rejected() {
        let error = RateLimiter::create(RateLimitConfig::new(1, 1, Duration::from_secs(1)))
            .expect_err("no runtime available");
        assert_eq!(error.kind, crate::ServiceErrorKind::Configuration);
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let error = RateLimiter::create(RateLimitConfig::new(1, 1, Duration::ZERO))
            .expect_err("zero interval");
        assert_eq!(error.kind, crate::ServiceErrorKind::Configuration);
    }
}
