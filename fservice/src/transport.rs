//! Transport seam and reqwest-based HTTP implementation.
//!
//! A transport returns the decoded JSON body of a response. Bodies that carry
//! a structured `error` object are returned as values so the engine can
//! classify them; only failures without a usable JSON body become errors.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use fcommon::BoxFuture;
use serde_json::Value;

use crate::{SecretString, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
    Head,
    Options,
    Patch,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Head => "head",
            Self::Options => "options",
            Self::Patch => "patch",
        }
    }

    pub fn sends_body(self) -> bool {
        !matches!(self, Self::Get | Self::Head)
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "delete" => Ok(Self::Delete),
            "head" => Ok(Self::Head),
            "options" => Ok(Self::Options),
            "patch" => Ok(Self::Patch),
            other => Err(ServiceError::configuration(format!(
                "invalid request method '{other}', expected one of get, post, delete, head, options, patch"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<Arc<SecretString>>,
    pub payload: Value,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>, payload: Value) -> Self {
        Self {
            method,
            url: url.into(),
            bearer: None,
            payload,
        }
    }

    pub fn with_bearer(mut self, bearer: Arc<SecretString>) -> Self {
        self.bearer = Some(bearer);
        self
    }
}

pub trait Transport: Send + Sync + std::fmt::Debug {
    fn send<'a>(&'a self, request: &'a TransportRequest)
    -> BoxFuture<'a, Result<Value, ServiceError>>;
}

/// Joins a base URL and an endpoint path with exactly one separator.
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    if base_url.is_empty() {
        return endpoint.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use reqwest::{Client, StatusCode};
    use serde_json::Value;

    use super::{Method, Transport, TransportRequest};
    use crate::ServiceError;
    use fcommon::BoxFuture;

    #[derive(Debug, Clone, Default)]
    pub struct HttpTransport {
        client: Client,
    }

    impl HttpTransport {
        pub fn new(client: Client) -> Self {
            Self { client }
        }

        fn reqwest_method(method: Method) -> reqwest::Method {
            match method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Delete => reqwest::Method::DELETE,
                Method::Head => reqwest::Method::HEAD,
                Method::Options => reqwest::Method::OPTIONS,
                Method::Patch => reqwest::Method::PATCH,
            }
        }

        fn status_error(status: StatusCode, body: &str) -> ServiceError {
            let message = if body.trim().is_empty() {
                format!("request failed with status {status}")
            } else {
                format!("request failed with status {status}: {}", body.trim())
            };

            match status {
                StatusCode::TOO_MANY_REQUESTS => ServiceError::rate_limited(message),
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                    ServiceError::timeout(message)
                }
                _ => ServiceError::transport(message),
            }
        }
    }

    impl Transport for HttpTransport {
        fn send<'a>(
            &'a self,
            request: &'a TransportRequest,
        ) -> BoxFuture<'a, Result<Value, ServiceError>> {
            Box::pin(async move {
                let mut builder = self
                    .client
                    .request(Self::reqwest_method(request.method), &request.url);

                if let Some(bearer) = &request.bearer {
                    builder = builder.bearer_auth(bearer.expose());
                }
                if request.method.sends_body() {
                    builder = builder.json(&request.payload);
                }

                let response = builder.send().await.map_err(|err| {
                    if err.is_timeout() {
                        ServiceError::timeout(err.to_string())
                    } else {
                        ServiceError::transport(err.to_string())
                    }
                })?;

                let status = response.status();
                let body = response
                    .text()
                    .await
                    .map_err(|err| ServiceError::transport(err.to_string()))?;

                match serde_json::from_str::<Value>(&body) {
                    Ok(value) if status.is_success() || value.get("error").is_some() => Ok(value),
                    Ok(_) => Err(Self::status_error(status, &body)),
                    Err(_) if status.is_success() && body.trim().is_empty() => Ok(Value::Null),
                    Err(err) if status.is_success() => Err(ServiceError::transport(format!(
                        "response body is not valid JSON: {err}"
                    ))),
                    Err(_) => Err(Self::status_error(status, &body)),
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parsing_accepts_known_verbs_case_insensitively() {
        assert_eq!("POST".parse::<Method>(), Ok(Method::Post));
        assert_eq!("patch".parse::<Method>(), Ok(Method::Patch));
        assert_eq!(" options ".parse::<Method>(), Ok(Method::Options));

        let error = "trace".parse::<Method>().expect_err("unsupported verb");
        assert_eq!(error.kind, crate::ServiceErrorKind::Configuration);
    }

    #[test]
    fn join_url_normalizes_separators() {
        assert_eq!(
            join_url("https://api.example.com/v1/", "/chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
        assert_eq!(join_url("", "embeddings"), "embeddings");
    }

    #[test]
    fn bearer_is_redacted_in_request_debug() {
        let request = TransportRequest::new(Method::Post, "https://example.com", Value::Null)
            .with_bearer(Arc::new(SecretString::new("sk-secret")));
        let rendered = format!("{request:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("sk-secret"));
    }
}
