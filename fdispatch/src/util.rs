//! Small convenience conversions for common inputs.

use serde_json::Value;

use crate::{
    CallDescriptor, Method, SecretString, ServiceError, ToolArguments, ToolError,
};

/// Keyword arguments from an object or a JSON-encoded object string.
pub fn arguments(value: &Value) -> Result<ToolArguments, ToolError> {
    ftooling::arguments_from_value(value)
}

/// Parses one descriptor or an array of them.
pub fn descriptors_from_value(value: &Value) -> Result<Vec<CallDescriptor>, ToolError> {
    match value {
        Value::Array(items) => items.iter().map(CallDescriptor::parse).collect(),
        other => CallDescriptor::parse(other).map(|descriptor| vec![descriptor]),
    }
}

pub fn parse_method(value: &str) -> Result<Method, ServiceError> {
    value.parse()
}

pub fn credential_from_env(name: &str) -> Result<SecretString, ServiceError> {
    SecretString::from_env(name)
}
