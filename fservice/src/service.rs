//! Service facade: endpoint table, credential, transport, and call accounting.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use fservice::prelude::*;
//! use serde_json::{Value, json};
//!
//! #[derive(Debug)]
//! struct Echo;
//!
//! impl Transport for Echo {
//!     fn send<'a>(&'a self, request: &'a TransportRequest) -> BoxFuture<'a, Result<Value, ServiceError>> {
//!         Box::pin(async move { Ok(json!({"echo": request.payload.clone()})) })
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let service = Service::builder(Arc::new(Echo))
//!     .with_credential(SecretString::new("sk-test"))
//!     .with_endpoint("search", EndpointConfig::new(10, 1_000, 60))
//!     .build()
//!     .expect("service should build");
//!
//! service.init_endpoint("search").await.expect("declared endpoint");
//! let body = service
//!     .call(json!({"q": "rust"}), "search", Method::Post)
//!     .await
//!     .expect("call should succeed");
//!
//! assert_eq!(body["echo"]["q"], "rust");
//! assert_eq!(service.status().succeeded, 1);
//! service.shutdown().await;
//! # });
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use fcommon::Registry;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::engine::dispatch;
use crate::{
    CostEstimator, Endpoint, EndpointConfig, EngineOptions, Method, NoopServiceHooks,
    SecretString, ServiceConfig, ServiceError, ServiceHooks, StatusSnapshot, StatusTracker,
    Transport, TransportRequest, join_url,
};

pub struct ServiceBuilder {
    transport: Arc<dyn Transport>,
    credential: Option<SecretString>,
    base_url: String,
    endpoints: BTreeMap<String, EndpointConfig>,
    engine: EngineOptions,
    estimator: Option<Arc<dyn CostEstimator>>,
    hooks: Arc<dyn ServiceHooks>,
}

impl std::fmt::Debug for ServiceBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceBuilder")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential)
            .field("endpoints", &self.endpoints.keys().collect::<Vec<_>>())
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl ServiceBuilder {
    pub fn with_credential(mut self, credential: SecretString) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_endpoint(mut self, name: impl Into<String>, config: EndpointConfig) -> Self {
        self.endpoints.insert(name.into(), config);
        self
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        if !config.base_url.is_empty() {
            self.base_url = config.base_url;
        }
        self.engine = config.engine.options();
        self.endpoints.extend(config.endpoints);
        self
    }

    pub fn with_engine_options(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }

    /// Replaces the per-endpoint cost models for every call.
    pub fn with_cost_estimator(mut self, estimator: Arc<dyn CostEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ServiceHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> Result<Service, ServiceError> {
        if self.credential.as_ref().is_some_and(SecretString::is_empty) {
            return Err(ServiceError::configuration("credential must not be empty"));
        }

        let mut endpoints = Registry::new();
        for (name, config) in self.endpoints {
            config
                .validate()
                .map_err(|err| ServiceError::configuration(format!("endpoint {name}: {}", err.message)))?;
            endpoints.insert(name.clone(), Arc::new(Endpoint::new(name, config)));
        }

        Ok(Service {
            base_url: self.base_url,
            credential: self.credential.map(Arc::new),
            transport: self.transport,
            endpoints,
            engine: self.engine,
            estimator: self.estimator,
            hooks: self.hooks,
            tracker: StatusTracker::new(),
        })
    }
}

pub struct Service {
    base_url: String,
    credential: Option<Arc<SecretString>>,
    transport: Arc<dyn Transport>,
    endpoints: Registry<Arc<Endpoint>>,
    engine: EngineOptions,
    estimator: Option<Arc<dyn CostEstimator>>,
    hooks: Arc<dyn ServiceHooks>,
    tracker: StatusTracker,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential)
            .field("endpoints", &self.endpoints.names())
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl Service {
    pub fn builder(transport: Arc<dyn Transport>) -> ServiceBuilder {
        ServiceBuilder {
            transport,
            credential: None,
            base_url: String::new(),
            endpoints: BTreeMap::new(),
            engine: EngineOptions::default(),
            estimator: None,
            hooks: Arc::new(NoopServiceHooks),
        }
    }

    pub fn from_config(
        config: ServiceConfig,
        transport: Arc<dyn Transport>,
        credential: Option<SecretString>,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        let builder = Self::builder(transport).with_config(config);
        match credential {
            Some(credential) => builder.with_credential(credential).build(),
            None => builder.build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_names(&self) -> Vec<String> {
        self.endpoints.names()
    }

    pub fn endpoint(&self, name: &str) -> Option<Arc<Endpoint>> {
        self.endpoints.get(name).map(Arc::clone)
    }

    /// Starts the limiter of a declared endpoint. Repeated calls are no-ops.
    pub async fn init_endpoint(&self, name: &str) -> Result<(), ServiceError> {
        let endpoint = self.endpoints.get(name).ok_or_else(|| {
            ServiceError::configuration(format!("endpoint {name} is not available for this service"))
        })?;

        if !endpoint.is_initialized() {
            endpoint.init_rate_limiter().await?;
            debug!(endpoint = name, "endpoint initialized");
        }
        Ok(())
    }

    pub async fn init_all_endpoints(&self) -> Result<(), ServiceError> {
        for name in self.endpoints.names() {
            self.init_endpoint(&name).await?;
        }
        Ok(())
    }

    pub async fn call(
        &self,
        payload: Value,
        endpoint: &str,
        method: Method,
    ) -> Result<Value, ServiceError> {
        self.call_with_cost(payload, endpoint, method, None).await
    }

    /// Like [`Service::call`]; `required_tokens` skips cost estimation.
    pub async fn call_with_cost(
        &self,
        payload: Value,
        endpoint: &str,
        method: Method,
        required_tokens: Option<u64>,
    ) -> Result<Value, ServiceError> {
        let resolved = self
            .endpoints
            .get(endpoint)
            .filter(|resolved| resolved.is_initialized())
            .ok_or_else(|| ServiceError::not_initialized(endpoint))?;
        let limiter = resolved
            .limiter()
            .ok_or_else(|| ServiceError::not_initialized(endpoint))?;

        let required_tokens = match required_tokens {
            Some(tokens) => tokens,
            None => match &self.estimator {
                Some(estimator) => estimator.estimate(&payload, endpoint)?,
                None => resolved.estimate_cost(&payload)?,
            },
        };

        let mut request = TransportRequest::new(method, join_url(&self.base_url, endpoint), payload);
        if let Some(credential) = &self.credential {
            request = request.with_bearer(Arc::clone(credential));
        }

        let guard = self.tracker.begin();
        self.hooks.on_call_start(endpoint, required_tokens);
        let started = Instant::now();

        let outcome = dispatch(
            endpoint,
            &limiter,
            self.transport.as_ref(),
            &request,
            required_tokens,
            &self.engine,
            self.hooks.as_ref(),
        )
        .await;

        for failure in &outcome.failures {
            self.tracker.record_error(failure);
        }

        match outcome.result {
            Ok(body) => {
                guard.succeed();
                self.hooks
                    .on_call_success(endpoint, outcome.attempts, started.elapsed());
                Ok(body)
            }
            Err(error) => {
                if outcome.failures.is_empty() {
                    self.tracker.record_error(&error);
                }
                guard.fail();
                self.hooks
                    .on_call_failure(endpoint, outcome.attempts, started.elapsed(), &error);
                Err(error)
            }
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        self.tracker.snapshot()
    }

    /// Stops every started limiter.
    pub async fn shutdown(&self) {
        for endpoint in self.endpoints.values() {
            if let Some(limiter) = endpoint.limiter() {
                limiter.stop().await;
            }
        }
    }
}
