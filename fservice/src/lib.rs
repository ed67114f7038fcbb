//! Rate-limited dispatch of payloads to remote service endpoints.
//!
//! A [`Service`] owns a table of named [`Endpoint`]s, each guarded by its own
//! token-bucket [`RateLimiter`]. Calls wait locally for quota, then go through
//! a [`Transport`] with bounded attempts and rate-limit cooldowns.

mod config;
mod cost;
mod credentials;
mod endpoint;
pub mod engine;
mod error;
mod hooks;
mod limiter;
mod service;
mod status;
mod transport;

pub mod prelude {
    pub use crate::{
        CostEstimator, Endpoint, EndpointConfig, EngineOptions, Method, RateLimitConfig,
        RateLimiter, SecretString, Service, ServiceBuilder, ServiceConfig, ServiceError,
        ServiceErrorKind, ServiceHooks, StatusSnapshot, TokenCostModel, Transport,
        TransportRequest,
    };
    pub use fcommon::BoxFuture;
}

pub use config::{EngineConfig, ServiceConfig};
pub use cost::{CostEstimator, TokenCostModel};
pub use credentials::SecretString;
pub use endpoint::{Endpoint, EndpointConfig};
pub use engine::{Dispatch, EngineOptions, classify_response};
pub use error::{ServiceError, ServiceErrorKind};
pub use hooks::{NoopServiceHooks, ServiceHooks};
pub use limiter::{LimiterSnapshot, RateLimitConfig, RateLimiter};
pub use service::{Service, ServiceBuilder};
pub use status::{CallGuard, StatusSnapshot, StatusTracker};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{Method, Transport, TransportRequest, join_url};
