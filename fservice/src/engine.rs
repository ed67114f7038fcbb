//! Rate-limited call engine: waits for quota, then attempts the transport.
//!
//! Local quota denial is recovered by polling and is never counted as an
//! attempt. Once permission is granted, each transport failure or structured
//! error body consumes one attempt; rate-limit signals additionally wait out
//! a cooldown before the next attempt.

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{error, trace, warn};

use crate::{RateLimiter, ServiceError, ServiceHooks, Transport, TransportRequest};

const RATE_LIMIT_MARKER: &str = "Rate limit";
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub max_attempts: u32,
    pub poll_interval: Duration,
    pub rate_limit_cooldown: Duration,
    /// Upper bound on quota polling; `None` polls until capacity frees up.
    pub max_wait: Option<Duration>,
    /// Tokens that must remain available before a permission request is made.
    pub min_token_headroom: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            poll_interval: Duration::from_secs(1),
            rate_limit_cooldown: Duration::from_secs(15),
            max_wait: None,
            min_token_headroom: 10,
        }
    }
}

impl EngineOptions {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_rate_limit_cooldown(mut self, cooldown: Duration) -> Self {
        self.rate_limit_cooldown = cooldown;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn with_min_token_headroom(mut self, tokens: u64) -> Self {
        self.min_token_headroom = tokens;
        self
    }
}

/// Outcome of one engine run, including every failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub result: Result<Value, ServiceError>,
    pub attempts: u32,
    pub failures: Vec<ServiceError>,
    pub waited: Duration,
}

impl Dispatch {
    fn rejected(error: ServiceError, waited: Duration) -> Self {
        Self {
            result: Err(error),
            attempts: 0,
            failures: Vec::new(),
            waited,
        }
    }
}

/// Returns the error carried by a structured `error` field, if any.
pub fn classify_response(body: &Value) -> Option<ServiceError> {
    let error = body.get("error")?;
    let message = match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => match fields.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => error.to_string(),
        },
        other => other.to_string(),
    };

    Some(if message.contains(RATE_LIMIT_MARKER) {
        ServiceError::rate_limited(message)
    } else {
        ServiceError::api(message)
    })
}

pub async fn dispatch(
    endpoint: &str,
    limiter: &RateLimiter,
    transport: &dyn Transport,
    request: &TransportRequest,
    required_tokens: u64,
    options: &EngineOptions,
    hooks: &dyn ServiceHooks,
) -> Dispatch {
    let waited = match wait_for_permission(endpoint, limiter, required_tokens, options, hooks).await
    {
        Ok(waited) => waited,
        Err((error, waited)) => return Dispatch::rejected(error, waited),
    };

    let max_attempts = options.max_attempts.max(1);
    let mut failures = Vec::new();

    for attempt in 1..=max_attempts {
        hooks.on_attempt_start(endpoint, attempt);

        let failure = match transport.send(request).await {
            Ok(body) => match classify_response(&body) {
                None => {
                    return Dispatch {
                        result: Ok(body),
                        attempts: attempt,
                        failures,
                        waited,
                    };
                }
                Some(error) => error,
            },
            Err(error) => error,
        };

        warn!(
            endpoint,
            attempt,
            error_kind = ?failure.kind,
            error = %failure.message,
            "service call attempt failed"
        );
        hooks.on_attempt_failure(endpoint, attempt, &failure);

        let cooldown = failure.kind == crate::ServiceErrorKind::RateLimited && attempt < max_attempts;
        failures.push(failure);
        if cooldown {
            tokio::time::sleep(options.rate_limit_cooldown).await;
        }
    }

    let last = failures
        .last()
        .cloned()
        .unwrap_or_else(|| ServiceError::other("service call made no attempts"));
    error!(
        endpoint,
        attempts = max_attempts,
        error_kind = ?last.kind,
        "service call failed after all attempts"
    );

    Dispatch {
        result: Err(last),
        attempts: max_attempts,
        failures,
        waited,
    }
}

async fn wait_for_permission(
    endpoint: &str,
    limiter: &RateLimiter,
    required_tokens: u64,
    options: &EngineOptions,
    hooks: &dyn ServiceHooks,
) -> Result<Duration, (ServiceError, Duration)> {
    let started = Instant::now();
    let poll_interval = options.poll_interval.max(MIN_POLL_INTERVAL);

    loop {
        let snapshot = limiter.snapshot().await;
        let headroom = options.min_token_headroom.min(snapshot.max_tokens).max(1);
        if snapshot.available_requests > 0
            && snapshot.available_tokens >= headroom
            && limiter.request_permission(required_tokens).await
        {
            return Ok(started.elapsed());
        }

        let waited = started.elapsed();
        if !limiter.is_running() {
            return Err((
                ServiceError::configuration(format!(
                    "rate limiter for endpoint {endpoint} has been stopped"
                )),
                waited,
            ));
        }

        if let Some(max_wait) = options.max_wait {
            if waited >= max_wait {
                return Err((
                    ServiceError::quota_exhausted(format!(
                        "no capacity on endpoint {endpoint} after waiting {} ms",
                        waited.as_millis()
                    )),
                    waited,
                ));
            }
        }

        trace!(
            endpoint,
            required_tokens,
            waited_ms = waited.as_millis() as u64,
            "waiting for rate limit capacity"
        );
        hooks.on_quota_wait(endpoint, waited);
        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ServiceErrorKind;

    #[test]
    fn structured_errors_are_classified_by_marker() {
        let limited = classify_response(&json!({"error": {"message": "Rate limit reached"}}))
            .expect("error present");
        assert_eq!(limited.kind, ServiceErrorKind::RateLimited);

        let api = classify_response(&json!({"error": {"message": "invalid model"}}))
            .expect("error present");
        assert_eq!(api.kind, ServiceErrorKind::Api);

        let bare = classify_response(&json!({"error": "boom"})).expect("error present");
        assert_eq!(bare.message, "boom");

        assert!(classify_response(&json!({"choices": []})).is_none());
    }

    #[test]
    fn defaults_match_documented_values() {
        let options = EngineOptions::default();
        assert_eq!(options.max_attempts, 3);
        assert_eq!(options.poll_interval, Duration::from_secs(1));
        assert_eq!(options.rate_limit_cooldown, Duration::from_secs(15));
        assert_eq!(options.max_wait, None);
    }
}
