//! Runtime wiring helpers for a service plus tool invoker.

use std::sync::Arc;

use crate::{
    SafeServiceHooks, SafeToolHooks, SecretString, Service, ServiceBuilder, ServiceConfig,
    ServiceError, ServiceHooks, ToolInvoker, ToolRegistry, ToolRuntimeHooks,
    TracingObservabilityHooks, Transport,
};

#[derive(Debug, Clone)]
pub struct DispatchRuntime {
    pub service: Arc<Service>,
    pub tools: ToolInvoker,
}

impl DispatchRuntime {
    /// Stops every endpoint limiter.
    pub async fn shutdown(&self) {
        self.service.shutdown().await;
    }
}

pub fn observed_service_hooks() -> Arc<dyn ServiceHooks> {
    Arc::new(SafeServiceHooks::new(TracingObservabilityHooks))
}

pub fn observed_tool_hooks() -> Arc<dyn ToolRuntimeHooks> {
    Arc::new(SafeToolHooks::new(TracingObservabilityHooks))
}

pub fn observed_invoker(registry: ToolRegistry) -> ToolInvoker {
    ToolInvoker::new(Arc::new(registry)).with_hooks(observed_tool_hooks())
}

/// Builds the service with tracing hooks, starts every declared endpoint,
/// and pairs it with an invoker over `registry`.
pub async fn build_runtime(
    builder: ServiceBuilder,
    registry: ToolRegistry,
) -> Result<DispatchRuntime, ServiceError> {
    let service = builder.with_hooks(observed_service_hooks()).build()?;
    service.init_all_endpoints().await?;

    Ok(DispatchRuntime {
        service: Arc::new(service),
        tools: observed_invoker(registry),
    })
}

/// Like [`build_runtime`], reading the service from JSON configuration.
pub async fn build_runtime_from_config(
    config_json: &str,
    transport: Arc<dyn Transport>,
    credential: Option<SecretString>,
    registry: ToolRegistry,
) -> Result<DispatchRuntime, ServiceError> {
    let config = ServiceConfig::from_json_str(config_json)?;
    let mut builder = Service::builder(transport).with_config(config);
    if let Some(credential) = credential {
        builder = builder.with_credential(credential);
    }
    build_runtime(builder, registry).await
}
