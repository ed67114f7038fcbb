//! Tracing-based observability hooks for retried calls, service dispatch, and tool invocation.
//!
//! ```rust
//! use fobserve::TracingObservabilityHooks;
//! use fservice::ServiceHooks;
//!
//! fn accepts_service_hooks(_hooks: &dyn ServiceHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_service_hooks(&hooks);
//! ```

use std::time::Duration;

use fcall::{CallError, CallHooks};
use fservice::{ServiceError, ServiceHooks};
use ftooling::{ToolArguments, ToolError, ToolRuntimeHooks};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl CallHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, attempt: u32) {
        tracing::debug!(phase = "call", event = "attempt_start", operation, attempt);
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &CallError,
    ) {
        tracing::warn!(
            phase = "call",
            event = "retry_scheduled",
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.is_retryable(),
            error = %error
        );
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        tracing::info!(phase = "call", event = "success", operation, attempts);
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &CallError) {
        tracing::error!(
            phase = "call",
            event = "failure",
            operation,
            attempts,
            error_kind = ?error.kind,
            retryable = error.is_retryable(),
            error = %error
        );
    }
}

impl ServiceHooks for TracingObservabilityHooks {
    fn on_call_start(&self, endpoint: &str, required_tokens: u64) {
        tracing::info!(
            phase = "service",
            event = "call_start",
            endpoint,
            required_tokens
        );
    }

    fn on_quota_wait(&self, endpoint: &str, waited: Duration) {
        tracing::trace!(
            phase = "service",
            event = "quota_wait",
            endpoint,
            waited_ms = waited.as_millis() as u64
        );
    }

    fn on_attempt_start(&self, endpoint: &str, attempt: u32) {
        tracing::debug!(phase = "service", event = "attempt_start", endpoint, attempt);
    }

    fn on_attempt_failure(&self, endpoint: &str, attempt: u32, error: &ServiceError) {
        tracing::warn!(
            phase = "service",
            event = "attempt_failure",
            endpoint,
            attempt,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_call_success(&self, endpoint: &str, attempts: u32, elapsed: Duration) {
        tracing::info!(
            phase = "service",
            event = "call_success",
            endpoint,
            attempts,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_call_failure(
        &self,
        endpoint: &str,
        attempts: u32,
        elapsed: Duration,
        error: &ServiceError,
    ) {
        tracing::error!(
            phase = "service",
            event = "call_failure",
            endpoint,
            attempts,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_invocation_start(&self, tool_name: &str, arguments: &ToolArguments) {
        tracing::info!(
            phase = "tool",
            event = "invocation_start",
            tool_name,
            argument_count = arguments.len()
        );
    }

    fn on_invocation_success(&self, tool_name: &str, _output: &Value, elapsed: Duration) {
        tracing::info!(
            phase = "tool",
            event = "invocation_success",
            tool_name,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_invocation_failure(&self, tool_name: &str, error: &ToolError, elapsed: Duration) {
        tracing::error!(
            phase = "tool",
            event = "invocation_failure",
            tool_name,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}
