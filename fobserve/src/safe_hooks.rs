//! Wrappers that keep a panicking hook from unwinding into the call path.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use fcall::{CallError, CallHooks};
use fservice::{ServiceError, ServiceHooks};
use ftooling::{ToolArguments, ToolError, ToolRuntimeHooks};
use serde_json::Value;

fn isolate(hook: impl FnOnce()) {
    let _ = catch_unwind(AssertUnwindSafe(hook));
}

pub struct SafeCallHooks<H> {
    inner: H,
}

impl<H> SafeCallHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> CallHooks for SafeCallHooks<H>
where
    H: CallHooks,
{
    fn on_attempt_start(&self, operation: &str, attempt: u32) {
        isolate(|| self.inner.on_attempt_start(operation, attempt));
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &CallError,
    ) {
        isolate(|| {
            self.inner
                .on_retry_scheduled(operation, attempt, delay, error)
        });
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        isolate(|| self.inner.on_success(operation, attempts));
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &CallError) {
        isolate(|| self.inner.on_failure(operation, attempts, error));
    }
}

pub struct SafeServiceHooks<H> {
    inner: H,
}

impl<H> SafeServiceHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ServiceHooks for SafeServiceHooks<H>
where
    H: ServiceHooks,
{
    fn on_call_start(&self, endpoint: &str, required_tokens: u64) {
        isolate(|| self.inner.on_call_start(endpoint, required_tokens));
    }

    fn on_quota_wait(&self, endpoint: &str, waited: Duration) {
        isolate(|| self.inner.on_quota_wait(endpoint, waited));
    }

    fn on_attempt_start(&self, endpoint: &str, attempt: u32) {
        isolate(|| self.inner.on_attempt_start(endpoint, attempt));
    }

    fn on_attempt_failure(&self, endpoint: &str, attempt: u32, error: &ServiceError) {
        isolate(|| self.inner.on_attempt_failure(endpoint, attempt, error));
    }

    fn on_call_success(&self, endpoint: &str, attempts: u32, elapsed: Duration) {
        isolate(|| self.inner.on_call_success(endpoint, attempts, elapsed));
    }

    fn on_call_failure(
        &self,
        endpoint: &str,
        attempts: u32,
        elapsed: Duration,
        error: &ServiceError,
    ) {
        isolate(|| {
            self.inner
                .on_call_failure(endpoint, attempts, elapsed, error)
        });
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_invocation_start(&self, tool_name: &str, arguments: &ToolArguments) {
        isolate(|| self.inner.on_invocation_start(tool_name, arguments));
    }

    fn on_invocation_success(&self, tool_name: &str, output: &Value, elapsed: Duration) {
        isolate(|| self.inner.on_invocation_success(tool_name, output, elapsed));
    }

    fn on_invocation_failure(&self, tool_name: &str, error: &ToolError, elapsed: Duration) {
        isolate(|| self.inner.on_invocation_failure(tool_name, error, elapsed));
    }
}
