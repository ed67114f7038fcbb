//! Serializable service configuration.
//!
//! ```rust
//! use fservice::{ServiceConfig, TokenCostModel};
//!
//! let config = ServiceConfig::from_json_str(
//!     r#"{
//!         "base_url": "https://api.example.com/v1",
//!         "endpoints": {
//!             "chat/completions": {"max_requests": 500},
//!             "search": {"token_cost_model": {"fixed": 1}}
//!         },
//!         "engine": {"max_wait_ms": 30000}
//!     }"#,
//! )
//! .expect("config should parse");
//!
//! assert_eq!(config.endpoints["chat/completions"].max_requests, 500);
//! assert_eq!(config.endpoints["search"].token_cost_model, TokenCostModel::Fixed(1));
//! assert_eq!(config.engine.options().max_attempts, 3);
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{EndpointConfig, EngineOptions, ServiceError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_attempts: u32,
    pub poll_interval_ms: u64,
    pub rate_limit_cooldown_ms: u64,
    pub max_wait_ms: Option<u64>,
    pub min_token_headroom: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let options = EngineOptions::default();
        Self {
            max_attempts: options.max_attempts,
            poll_interval_ms: options.poll_interval.as_millis() as u64,
            rate_limit_cooldown_ms: options.rate_limit_cooldown.as_millis() as u64,
            max_wait_ms: None,
            min_token_headroom: options.min_token_headroom,
        }
    }
}

impl EngineConfig {
    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            max_attempts: self.max_attempts.max(1),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            rate_limit_cooldown: Duration::from_millis(self.rate_limit_cooldown_ms),
            max_wait: self.max_wait_ms.map(Duration::from_millis),
            min_token_headroom: self.min_token_headroom,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub endpoints: BTreeMap<String, EndpointConfig>,
    pub engine: EngineConfig,
}

impl ServiceConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ServiceError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        for (name, endpoint) in &self.endpoints {
            if name.trim().is_empty() {
                return Err(ServiceError::configuration("endpoint name must not be empty"));
            }
            endpoint
                .validate()
                .map_err(|err| ServiceError::configuration(format!("endpoint {name}: {}", err.message)))?;
        }

        Ok(())
    }
}
