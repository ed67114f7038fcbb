//! Unified facade over the fdispatch workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the call, service, tooling, and observability crates and
//! provides wiring helpers and macros for common setup flows.

mod macros;

pub mod prelude;
pub mod runtime;
#[cfg(feature = "http")]
pub mod transport;
pub mod util;

pub use fcall;
pub use fcommon;
pub use fobserve;
pub use fservice;
pub use ftooling;

pub use fcall::{
    BatchStream, BlockingPool, CallError, CallErrorKind, CallFn, CallHooks, NoopCallHooks,
    RetryPolicy, TaskScope, TimedOptions, bcall, execute_with_retry, lcall, lcall_flat, lcall_settled, mcall,
    mcall_explode, pcall, rcall, rcall_observed, rcall_timed, tcall, tcall_timed,
};
pub use fcommon::{BoxFuture, Registry};
pub use fobserve::{
    MetricsObservabilityHooks, SafeCallHooks, SafeServiceHooks, SafeToolHooks,
    TracingObservabilityHooks,
};
#[cfg(feature = "http")]
pub use fservice::HttpTransport;
pub use fservice::{
    CostEstimator, Endpoint, EndpointConfig, EngineConfig, EngineOptions, Method,
    NoopServiceHooks, RateLimitConfig, RateLimiter, SecretString, Service, ServiceBuilder,
    ServiceConfig, ServiceError, ServiceErrorKind, ServiceHooks, StatusSnapshot, TokenCostModel,
    Transport, TransportRequest,
};
pub use ftooling::{
    CallDescriptor, ConflictPolicy, NoopToolRuntimeHooks, ToolArguments, ToolEntry, ToolError,
    ToolErrorKind, ToolHandler, ToolInvocation, ToolInvoker, ToolParser, ToolRegistry,
    ToolRuntimeHooks, parse_json_object, parse_json_value, required_i64, required_string,
};

pub use runtime::{
    DispatchRuntime, build_runtime, build_runtime_from_config, observed_invoker,
    observed_service_hooks, observed_tool_hooks,
};
#[cfg(feature = "http")]
pub use transport::{HttpTransportConfig, build_http_transport, http_service_builder};
pub use util::{arguments, credential_from_env, descriptors_from_value, parse_method};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{ToolArguments, TokenCostModel};

    #[test]
    fn fd_args_macro_builds_keyword_map() {
        let arguments = crate::fd_args! {
            "city" => "Oslo",
            "days" => 3,
        };

        assert_eq!(arguments.len(), 2);
        assert_eq!(arguments["city"], json!("Oslo"));
        assert_eq!(arguments["days"], json!(3));
        assert_eq!(crate::fd_args!(), ToolArguments::new());
    }

    #[test]
    fn fd_call_macro_builds_descriptor() {
        let descriptor = crate::fd_call!("weather", "city" => "Oslo");

        assert_eq!(descriptor.function, "weather");
        assert_eq!(descriptor.arguments["city"], json!("Oslo"));
        assert!(crate::fd_call!("now").arguments.is_empty());
    }

    #[test]
    fn fd_endpoints_macro_supports_cost_model_shorthand() {
        let endpoints = crate::fd_endpoints! {
            "chat/completions" => (500, 50_000, 60),
            "search" => (10, 10, 1, fixed 1),
        };

        assert_eq!(endpoints["chat/completions"].max_requests, 500);
        assert_eq!(
            endpoints["chat/completions"].token_cost_model,
            TokenCostModel::Approximate
        );
        assert_eq!(endpoints["search"].token_cost_model, TokenCostModel::Fixed(1));
    }
}
