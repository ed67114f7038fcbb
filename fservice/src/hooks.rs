//! Lifecycle hooks for service calls.

use std::time::Duration;

use crate::ServiceError;

pub trait ServiceHooks: Send + Sync {
    fn on_call_start(&self, _endpoint: &str, _required_tokens: u64) {}

    fn on_quota_wait(&self, _endpoint: &str, _waited: Duration) {}

    fn on_attempt_start(&self, _endpoint: &str, _attempt: u32) {}

    fn on_attempt_failure(&self, _endpoint: &str, _attempt: u32, _error: &ServiceError) {}

    fn on_call_success(&self, _endpoint: &str, _attempts: u32, _elapsed: Duration) {}

    fn on_call_failure(
        &self,
        _endpoint: &str,
        _attempts: u32,
        _elapsed: Duration,
        _error: &ServiceError,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopServiceHooks;

impl ServiceHooks for NoopServiceHooks {}
