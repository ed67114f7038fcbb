//! HTTP transport construction for facade consumers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::{HttpTransport, SecretString, Service, ServiceBuilder, ServiceError, Transport};

#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(90),
            user_agent: None,
        }
    }
}

impl HttpTransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

pub fn build_http_transport(
    config: &HttpTransportConfig,
) -> Result<Arc<dyn Transport>, ServiceError> {
    let mut builder = Client::builder().timeout(config.timeout);
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }

    let client = builder
        .build()
        .map_err(|err| ServiceError::configuration(format!("http client: {err}")))?;
    Ok(Arc::new(HttpTransport::new(client)))
}

/// Starts a [`ServiceBuilder`] over HTTP with a bearer credential.
pub fn http_service_builder(
    base_url: impl Into<String>,
    api_key: impl Into<String>,
) -> Result<ServiceBuilder, ServiceError> {
    let api_key = api_key.into().trim().to_string();
    if api_key.is_empty() {
        return Err(ServiceError::configuration("API key must not be empty"));
    }

    let transport = build_http_transport(&HttpTransportConfig::default())?;
    Ok(Service::builder(transport)
        .with_base_url(base_url)
        .with_credential(SecretString::new(api_key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EndpointConfig, ServiceErrorKind};

    #[test]
    fn empty_api_key_is_rejected() {
        let error = http_service_builder("https://api.example.com", "  ")
            .expect_err("blank key");
        assert_eq!(error.kind, ServiceErrorKind::Configuration);
    }

    #[test]
    fn builder_carries_base_url_and_endpoints() {
        let service = http_service_builder("https://api.example.com/v1", "sk-test")
            .expect("builder")
            .with_endpoint("embeddings", EndpointConfig::default())
            .build()
            .expect("service");

        assert_eq!(service.base_url(), "https://api.example.com/v1");
        assert_eq!(service.endpoint_names(), vec!["embeddings".to_string()]);
    }

    #[test]
    fn transport_config_builders_apply() {
        let config = HttpTransportConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("fdispatch-test");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(build_http_transport(&config).is_ok());
    }
}
