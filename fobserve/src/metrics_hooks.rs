//! Metrics-based observability hooks for retried calls, service dispatch, and tool invocation.
//!
//! ```rust
//! use fcall::CallHooks;
//! use fobserve::MetricsObservabilityHooks;
//!
//! fn accepts_call_hooks(_hooks: &dyn CallHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_call_hooks(&hooks);
//! ```

use std::time::Duration;

use fcall::{CallError, CallHooks};
use fservice::{ServiceError, ServiceHooks};
use ftooling::{ToolArguments, ToolError, ToolRuntimeHooks};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl CallHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, _attempt: u32) {
        metrics::counter!(
            "fdispatch_call_attempt_start_total",
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &CallError,
    ) {
        metrics::counter!(
            "fdispatch_call_retry_scheduled_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "fdispatch_call_retry_delay_seconds",
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        metrics::counter!(
            "fdispatch_call_success_total",
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "fdispatch_call_attempts_per_success",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &CallError) {
        metrics::counter!(
            "fdispatch_call_failure_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "fdispatch_call_attempts_per_failure",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }
}

impl ServiceHooks for MetricsObservabilityHooks {
    fn on_call_start(&self, endpoint: &str, required_tokens: u64) {
        metrics::counter!(
            "fdispatch_service_call_start_total",
            "endpoint" => endpoint.to_string()
        )
        .increment(1);
        metrics::counter!(
            "fdispatch_service_tokens_requested_total",
            "endpoint" => endpoint.to_string()
        )
        .increment(required_tokens);
    }

    fn on_quota_wait(&self, endpoint: &str, _waited: Duration) {
        metrics::counter!(
            "fdispatch_service_quota_wait_total",
            "endpoint" => endpoint.to_string()
        )
        .increment(1);
    }

    fn on_attempt_failure(&self, endpoint: &str, _attempt: u32, error: &ServiceError) {
        metrics::counter!(
            "fdispatch_service_attempt_failure_total",
            "endpoint" => endpoint.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_call_success(&self, endpoint: &str, attempts: u32, elapsed: Duration) {
        metrics::counter!(
            "fdispatch_service_call_success_total",
            "endpoint" => endpoint.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "fdispatch_service_attempts_per_success",
            "endpoint" => endpoint.to_string()
        )
        .record(attempts as f64);
        metrics::histogram!(
            "fdispatch_service_call_duration_seconds",
            "endpoint" => endpoint.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_call_failure(
        &self,
        endpoint: &str,
        _attempts: u32,
        elapsed: Duration,
        error: &ServiceError,
    ) {
        metrics::counter!(
            "fdispatch_service_call_failure_total",
            "endpoint" => endpoint.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "fdispatch_service_call_duration_seconds",
            "endpoint" => endpoint.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_invocation_start(&self, tool_name: &str, _arguments: &ToolArguments) {
        metrics::counter!(
            "fdispatch_tool_invocation_start_total",
            "tool_name" => tool_name.to_string()
        )
        .increment(1);
    }

    fn on_invocation_success(&self, tool_name: &str, _output: &Value, elapsed: Duration) {
        metrics::counter!(
            "fdispatch_tool_invocation_success_total",
            "tool_name" => tool_name.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "fdispatch_tool_invocation_duration_seconds",
            "tool_name" => tool_name.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_invocation_failure(&self, tool_name: &str, error: &ToolError, elapsed: Duration) {
        metrics::counter!(
            "fdispatch_tool_invocation_failure_total",
            "tool_name" => tool_name.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "fdispatch_tool_invocation_duration_seconds",
            "tool_name" => tool_name.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
