//! Tool invocation errors and classifications.

use std::error::Error;
use std::fmt::{Display, Formatter};

use fcall::{CallError, CallErrorKind};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    NotFound,
    InvalidArguments,
    Execution,
    Parse,
    Conflict,
    Timeout,
    Other,
}

impl ToolErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidArguments => "invalid_arguments",
            Self::Execution => "execution",
            Self::Parse => "parse",
            Self::Conflict => "conflict",
            Self::Timeout => "timeout",
            Self::Other => "other",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::NotFound,
            Self::InvalidArguments,
            Self::Execution,
            Self::Parse,
            Self::Conflict,
            Self::Timeout,
            Self::Other,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub retryable: bool,
    pub tool_name: Option<String>,
    /// Arguments rendered as compact JSON.
    pub arguments: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            tool_name: None,
            arguments: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message, false)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message, false)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message, true)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Parse, message, false)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Conflict, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, message, true)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Other, message, false)
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_arguments(mut self, arguments: &Map<String, Value>) -> Self {
        self.arguments = Some(Value::Object(arguments.clone()).to_string());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            ToolErrorKind::InvalidArguments
                | ToolErrorKind::NotFound
                | ToolErrorKind::Parse
                | ToolErrorKind::Conflict
        )
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.tool_name, &self.arguments) {
            (Some(tool_name), Some(arguments)) => write!(
                f,
                "{:?} [tool={}, arguments={}]: {}",
                self.kind, tool_name, arguments, self.message
            ),
            (Some(tool_name), None) => {
                write!(f, "{:?} [tool={}]: {}", self.kind, tool_name, self.message)
            }
            _ => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ToolError {}

impl From<CallError> for ToolError {
    fn from(error: CallError) -> Self {
        if error.kind != CallErrorKind::RetriesExhausted {
            if let Some(kind) = error.origin.and_then(ToolErrorKind::from_name) {
                let retryable = matches!(kind, ToolErrorKind::Execution | ToolErrorKind::Timeout);
                return ToolError::new(kind, error.message, retryable);
            }
        }

        match error.kind {
            CallErrorKind::Timeout => ToolError::timeout(error.message),
            CallErrorKind::LengthMismatch | CallErrorKind::InvalidConfig => {
                ToolError::invalid_arguments(error.message)
            }
            CallErrorKind::Execution | CallErrorKind::RetriesExhausted | CallErrorKind::Join => {
                ToolError::execution(error.message)
            }
        }
    }
}

/// Lets tool handlers return `ToolError` through [`fcall::CallFn`].
///
/// User errors become non-retryable; the tool kind rides along as the
/// error origin and is restored on the way back.
impl From<ToolError> for CallError {
    fn from(error: ToolError) -> Self {
        let origin = error.kind.as_str();
        let converted = if error.kind == ToolErrorKind::Timeout {
            CallError::timeout(error.message)
        } else if error.is_user_error() {
            CallError::invalid_config(error.message)
        } else {
            CallError::execution(error.message)
        };
        converted.with_origin(origin)
    }
}
