//! Token cost estimation for outgoing payloads.
//!
//! ```rust
//! use fservice::{CostEstimator, TokenCostModel};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "messages": [{"role": "user", "content": "abcdefgh"}],
//!     "max_tokens": 10,
//! });
//!
//! let tokens = TokenCostModel::Approximate
//!     .estimate(&payload, "chat/completions")
//!     .expect("chat payload is well formed");
//! assert_eq!(tokens, 4 + 2 + 2 + 10);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ServiceError;

const CHARS_PER_TOKEN: usize = 4;
const MESSAGE_OVERHEAD: u64 = 4;
const REPLY_PRIMER: u64 = 2;
const DEFAULT_COMPLETION_TOKENS: u64 = 15;
const IMAGE_TOKENS: u64 = 85;
const IMAGE_BUFFER: u64 = 20;

pub trait CostEstimator: Send + Sync {
    fn estimate(&self, payload: &Value, endpoint: &str) -> Result<u64, ServiceError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCostModel {
    /// Prompt and completion estimate for chat, completion, and embedding
    /// payloads. Other endpoints fall back to [`TokenCostModel::PayloadSize`].
    #[default]
    Approximate,
    /// Serialized payload length in tokens.
    PayloadSize,
    /// Constant charge per request.
    Fixed(u64),
}

impl CostEstimator for TokenCostModel {
    fn estimate(&self, payload: &Value, endpoint: &str) -> Result<u64, ServiceError> {
        match self {
            Self::Approximate => approximate(payload, endpoint),
            Self::PayloadSize => Ok(payload_size(payload)),
            Self::Fixed(cost) => Ok(*cost),
        }
    }
}

fn text_tokens(text: &str) -> u64 {
    u64::try_from(text.chars().count().div_ceil(CHARS_PER_TOKEN)).unwrap_or(u64::MAX)
}

fn payload_size(payload: &Value) -> u64 {
    text_tokens(&payload.to_string())
}

fn approximate(payload: &Value, endpoint: &str) -> Result<u64, ServiceError> {
    let endpoint = endpoint.trim_matches('/');

    if endpoint.ends_with("completions") {
        let max_tokens = payload
            .get("max_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_COMPLETION_TOKENS);
        let choices = payload.get("n").and_then(Value::as_u64).unwrap_or(1);
        let completion_tokens = choices.saturating_mul(max_tokens);

        if endpoint.starts_with("chat/") {
            return Ok(chat_prompt_tokens(payload)?.saturating_add(completion_tokens));
        }

        return match payload.get("prompt") {
            Some(Value::String(prompt)) => Ok(text_tokens(prompt).saturating_add(completion_tokens)),
            Some(Value::Array(prompts)) => {
                let prompt_tokens = saturating_sum(
                    prompts
                        .iter()
                        .map(|prompt| prompt.as_str().map(text_tokens).unwrap_or(0)),
                );
                let batch = u64::try_from(prompts.len()).unwrap_or(u64::MAX);
                Ok(prompt_tokens.saturating_add(completion_tokens.saturating_mul(batch)))
            }
            _ => Err(ServiceError::configuration(
                "completion payload requires a string or list \"prompt\" field",
            )),
        };
    }

    if endpoint == "embeddings" {
        return match payload.get("input") {
            Some(Value::String(input)) => Ok(text_tokens(input)),
            Some(Value::Array(inputs)) => Ok(saturating_sum(
                inputs
                    .iter()
                    .map(|input| input.as_str().map(text_tokens).unwrap_or(0)),
            )),
            _ => Err(ServiceError::configuration(
                "embedding payload requires a string or list \"input\" field",
            )),
        };
    }

    Ok(payload_size(payload))
}

fn chat_prompt_tokens(payload: &Value) -> Result<u64, ServiceError> {
    let messages = payload
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::configuration("chat payload requires a \"messages\" list"))?;

    let tokens = saturating_sum(messages.iter().map(|message| {
        let content = match message.get("content") {
            Some(Value::String(content)) => text_tokens(content),
            Some(Value::Array(parts)) => saturating_sum(parts.iter().map(content_part_tokens)),
            _ => 0,
        };
        MESSAGE_OVERHEAD.saturating_add(content)
    }));

    Ok(tokens.saturating_add(REPLY_PRIMER))
}

/// Charges from payload numbers clamp at `u64::MAX` instead of wrapping.
fn saturating_sum(tokens: impl Iterator<Item = u64>) -> u64 {
    tokens.fold(0, u64::saturating_add)
}

fn content_part_tokens(part: &Value) -> u64 {
    match part {
        Value::String(text) => text_tokens(text),
        Value::Object(fields) => {
            if let Some(text) = fields.get("text") {
                match text {
                    Value::String(text) => text_tokens(text),
                    other => text_tokens(&other.to_string()),
                }
            } else if fields.contains_key("image_url") {
                IMAGE_TOKENS + IMAGE_BUFFER
            } else {
                0
            }
        }
        other => text_tokens(&other.to_string()),
    }
}
