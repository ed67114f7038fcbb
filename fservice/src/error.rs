//! Service dispatch error kinds and error value helpers.
//!
//! ```rust
//! use fservice::{ServiceError, ServiceErrorKind};
//!
//! let limited = ServiceError::rate_limited("Rate limit reached for requests");
//! assert!(limited.retryable);
//!
//! let missing = ServiceError::not_initialized("chat/completions");
//! assert_eq!(missing.kind, ServiceErrorKind::NotInitialized);
//! assert!(!missing.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    NotInitialized,
    Configuration,
    RateLimited,
    Api,
    Transport,
    Timeout,
    QuotaExhausted,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn not_initialized(endpoint: impl AsRef<str>) -> Self {
        Self::new(
            ServiceErrorKind::NotInitialized,
            format!("the endpoint {} has not been initialized", endpoint.as_ref()),
            false,
        )
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Configuration, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::RateLimited, message, true)
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Api, message, true)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Transport, message, true)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Timeout, message, true)
    }

    pub fn quota_exhausted(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::QuotaExhausted, message, false)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Other, message, false)
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ServiceError {}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        ServiceError::configuration(value.to_string())
    }
}
