//! Named remote operations and their lazily started limiters.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::{CostEstimator, RateLimitConfig, RateLimiter, ServiceError, TokenCostModel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub max_requests: u64,
    pub max_tokens: u64,
    pub interval_seconds: u64,
    pub token_cost_model: TokenCostModel,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            max_requests: 1_000,
            max_tokens: 100_000,
            interval_seconds: 60,
            token_cost_model: TokenCostModel::Approximate,
        }
    }
}

impl EndpointConfig {
    pub fn new(max_requests: u64, max_tokens: u64, interval_seconds: u64) -> Self {
        Self {
            max_requests,
            max_tokens,
            interval_seconds,
            ..Self::default()
        }
    }

    pub fn with_token_cost_model(mut self, model: TokenCostModel) -> Self {
        self.token_cost_model = model;
        self
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig::new(
            self.max_requests,
            self.max_tokens,
            Duration::from_secs(self.interval_seconds),
        )
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.interval_seconds == 0 {
            return Err(ServiceError::configuration(
                "interval_seconds must be greater than zero",
            ));
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct Endpoint {
    name: String,
    config: EndpointConfig,
    limiter: OnceCell<Arc<RateLimiter>>,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, config: EndpointConfig) -> Self {
        Self {
            name: name.into(),
            config,
            limiter: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Starts the endpoint's limiter on first use; later calls return the
    /// same limiter.
    pub async fn init_rate_limiter(&self) -> Result<Arc<RateLimiter>, ServiceError> {
        self.limiter
            .get_or_try_init(|| async { RateLimiter::create(self.config.rate_limit()) })
            .await
            .cloned()
    }

    pub fn limiter(&self) -> Option<Arc<RateLimiter>> {
        self.limiter.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.limiter.initialized()
    }

    pub fn estimate_cost(&self, payload: &Value) -> Result<u64, ServiceError> {
        self.config.token_cost_model.estimate(payload, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: EndpointConfig =
            serde_json::from_str(r#"{"max_requests": 5}"#).expect("config should parse");

        assert_eq!(config.max_requests, 5);
        assert_eq!(config.max_tokens, 100_000);
        assert_eq!(config.interval_seconds, 60);
        assert_eq!(config.token_cost_model, TokenCostModel::Approximate);
    }

    #[test]
    fn zero_interval_fails_validation() {
        assert!(EndpointConfig::new(1, 1, 0).validate().is_err());
        assert!(EndpointConfig::new(1, 1, 1).validate().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn limiter_is_started_once() {
        let endpoint = Endpoint::new("embeddings", EndpointConfig::new(2, 10, 1));
        assert!(!endpoint.is_initialized());

        let first = endpoint.init_rate_limiter().await.expect("limiter");
        let second = endpoint.init_rate_limiter().await.expect("limiter");

        assert!(Arc::ptr_eq(&first, &second));
        assert!(endpoint.is_initialized());
    }
}
