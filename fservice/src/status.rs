//! Per-service call accounting.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{ServiceError, ServiceErrorKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub started: u64,
    pub in_progress: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub rate_limit_errors: u64,
    pub api_errors: u64,
    pub other_errors: u64,
}

#[derive(Debug, Default)]
pub struct StatusTracker {
    started: AtomicU64,
    in_progress: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    rate_limit_errors: AtomicU64,
    api_errors: AtomicU64,
    other_errors: AtomicU64,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a call as started. The call stays in progress until the returned
    /// guard is resolved or dropped; a dropped guard counts as a failure.
    pub fn begin(&self) -> CallGuard<'_> {
        self.started.fetch_add(1, Ordering::Relaxed);
        self.in_progress.fetch_add(1, Ordering::Relaxed);
        CallGuard {
            tracker: self,
            succeeded: false,
        }
    }

    pub fn record_error(&self, error: &ServiceError) {
        let counter = match error.kind {
            ServiceErrorKind::RateLimited => &self.rate_limit_errors,
            ServiceErrorKind::Api => &self.api_errors,
            _ => &self.other_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            started: self.started.load(Ordering::Relaxed),
            in_progress: self.in_progress.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rate_limit_errors: self.rate_limit_errors.load(Ordering::Relaxed),
            api_errors: self.api_errors.load(Ordering::Relaxed),
            other_errors: self.other_errors.load(Ordering::Relaxed),
        }
    }
}

#[must_use = "a dropped guard records the call as failed"]
#[derive(Debug)]
pub struct CallGuard<'a> {
    tracker: &'a StatusTracker,
    succeeded: bool,
}

impl CallGuard<'_> {
    pub fn succeed(mut self) {
        self.succeeded = true;
    }

    pub fn fail(self) {}
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.tracker.in_progress.fetch_sub(1, Ordering::Relaxed);
        let outcome = if self.succeeded {
            &self.tracker.succeeded
        } else {
            &self.tracker.failed
        };
        outcome.fetch_add(1, Ordering::Relaxed);
    }
}
