//! Call descriptors and invocation results.
//!
//! ```rust
//! use ftooling::CallDescriptor;
//! use serde_json::json;
//!
//! let call = CallDescriptor::parse(&json!({
//!     "recipient_name": "functions.weather",
//!     "parameters": {"city": "Oslo"}
//! }))
//! .expect("descriptor should parse");
//!
//! assert_eq!(call.function, "weather");
//! assert_eq!(call.arguments["city"], "Oslo");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ToolError, arguments_from_value};

const ACTION_PREFIX: &str = "action_";
const RECIPIENT_PREFIX: &str = "functions.";

/// A symbolic function call: tool name plus keyword arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallDescriptor {
    pub function: String,
    pub arguments: Map<String, Value>,
}

impl CallDescriptor {
    pub fn new(function: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            function: function.into(),
            arguments,
        }
    }

    /// Parses one of the recognized payload shapes:
    ///
    /// - `{"action": "action_<name>", "arguments": ...}`
    /// - `{"recipient_name": "functions.<name>", "parameters": {...}}`
    /// - `{"function" | "name": "<name>", "arguments": ...}`
    ///
    /// `arguments` may be an object or a JSON-encoded object string.
    pub fn parse(payload: &Value) -> Result<Self, ToolError> {
        let fields = payload
            .as_object()
            .ok_or_else(|| ToolError::parse(format!("call descriptor must be an object, got {payload}")))?;

        let (function, arguments) = if let Some(action) = fields.get("action") {
            let name = string_field(action, "action")?;
            (
                name.strip_prefix(ACTION_PREFIX).unwrap_or(name),
                fields.get("arguments"),
            )
        } else if let Some(recipient) = fields.get("recipient_name") {
            let name = string_field(recipient, "recipient_name")?;
            (
                name.strip_prefix(RECIPIENT_PREFIX).unwrap_or(name),
                fields.get("parameters"),
            )
        } else if let Some(function) = fields.get("function").or_else(|| fields.get("name")) {
            (string_field(function, "function")?, fields.get("arguments"))
        } else {
            return Err(ToolError::parse(
                "call descriptor needs one of 'action', 'recipient_name', 'function' or 'name'",
            ));
        };

        if function.trim().is_empty() {
            return Err(ToolError::parse("call descriptor names an empty function"));
        }

        let arguments = match arguments {
            Some(value) => arguments_from_value(value)
                .map_err(|err| ToolError::parse(err.message).with_tool_name(function))?,
            None => Map::new(),
        };

        Ok(Self::new(function, arguments))
    }
}

fn string_field<'a>(value: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    value
        .as_str()
        .ok_or_else(|| ToolError::parse(format!("'{field}' must be a string")))
}

/// One completed batch entry: the descriptor and the tool's output.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub descriptor: CallDescriptor,
    pub output: Value,
}

impl ToolInvocation {
    pub fn new(descriptor: CallDescriptor, output: Value) -> Self {
        Self { descriptor, output }
    }

    pub fn function(&self) -> &str {
        &self.descriptor.function
    }
}
