//! Common imports for most fdispatch applications.

pub use crate::{
    DispatchRuntime, build_runtime, build_runtime_from_config, observed_invoker,
    observed_service_hooks, observed_tool_hooks,
};
pub use crate::{arguments, credential_from_env, descriptors_from_value, parse_method};
pub use crate::{fd_args, fd_call, fd_endpoints};
pub use crate::{
    BoxFuture, CallDescriptor, CallError, CallErrorKind, CallFn, ConflictPolicy, EndpointConfig,
    EngineOptions, Method, RateLimitConfig, RateLimiter, RetryPolicy, SecretString, Service,
    ServiceBuilder, ServiceConfig, ServiceError, ServiceErrorKind, StatusSnapshot,
    TimedOptions, TokenCostModel, ToolArguments, ToolError, ToolErrorKind, ToolInvocation,
    ToolInvoker, ToolRegistry, Transport, TransportRequest, bcall, lcall, mcall, pcall, rcall,
    tcall,
};
#[cfg(feature = "http")]
pub use crate::{HttpTransport, HttpTransportConfig, build_http_transport, http_service_builder};
